use address_etl::resolver::{
    detect_country, resolve_match, resolve_province_full, AddressResolver, PostalCode,
    ProvinceCatalogue, ProvinceMatch, ProvinceRecord,
};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "resolve-cp")]
#[command(about = "Resolve postal codes or population names to province and city defaults")]
struct Args {
    /// Postal codes (28001, 1000-123) or population names (Alcalá de Henares)
    #[arg(required = true)]
    queries: Vec<String>,

    /// Province catalogue as a JSON array; defaults to the built-in Spanish provinces
    #[arg(long)]
    catalogue_file: Option<String>,

    /// Street, used to refine a population's postal code by neighborhood
    #[arg(long)]
    street: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let catalogue = match &args.catalogue_file {
        Some(path) => {
            let data = std::fs::read(path).with_context(|| format!("reading {}", path))?;
            let records: Vec<ProvinceRecord> = serde_json::from_slice(&data)
                .with_context(|| format!("{} is not a JSON province array", path))?;
            ProvinceCatalogue::new(records)
        }
        None => ProvinceCatalogue::spain(),
    };
    let resolver = AddressResolver::default();

    for query in &args.queries {
        if PostalCode::parse(query).is_some() {
            print_postal_code(query, &catalogue);
        } else {
            print_population(query, args.street.as_deref(), &resolver);
        }
        println!();
    }

    Ok(())
}

fn print_postal_code(query: &str, catalogue: &ProvinceCatalogue) {
    println!("🔎 {}", query);
    let country = detect_country(query);
    match country.iso_code() {
        Some(iso) => println!("  Country: {} ({})", country, iso),
        None => println!("  Country: {}", country),
    }

    match resolve_match(query) {
        Some(ProvinceMatch::Id(id)) => println!("  Province id: {}", id),
        Some(ProvinceMatch::Code(code)) => println!("  District code: {}", code),
        None => println!("  ❌ No province for this postal code"),
    }

    if let Some(record) = resolve_province_full(query, catalogue) {
        println!("  Catalogue: {} (id {})", record.name, record.id);
    }
}

fn print_population(query: &str, street: Option<&str>, resolver: &AddressResolver) {
    println!("🔎 {}", query);
    match resolver.lookup_city_defaults(query) {
        Some(city) => {
            println!("  City: {}", city.name);
            println!("  Province: {} (id {})", city.province, city.province_id);
            println!("  Default postal code: {}", city.postal_code);
            if let Some(cp) = street.and_then(|s| resolver.refine_by_neighborhood(s, query)) {
                println!("  Neighborhood postal code: {}", cp);
            }
        }
        None => println!("  ❌ Population not in the city table"),
    }
}
