use address_etl::reconcile::{ClientAddress, DiscrepancyKind, Outcome, ReconcilePolicy, Reconciler};
use address_etl::resolver::{
    comparison_key, detect_country, resolve_portuguese_province_code, resolve_province,
    resolve_spanish_province, try_resolve_province, AddressResolver, Country, PostalCode,
    ProvinceCatalogue, ProvinceId, ProvinceRecord, ResolutionError,
};
use anyhow::Result;

#[test]
fn test_spanish_prefix_ignores_trailing_digits() -> Result<()> {
    for prefix in 1..=52u32 {
        let expected = resolve_spanish_province(&format!("{:02}000", prefix));
        assert_eq!(expected, Some(ProvinceId(prefix)));
        for suffix in ["001", "123", "500", "999"] {
            let code = format!("{:02}{}", prefix, suffix);
            assert_eq!(resolve_spanish_province(&code), expected, "{}", code);
        }
    }
    Ok(())
}

#[test]
fn test_fixture_postal_codes() -> Result<()> {
    assert_eq!(resolve_spanish_province("30500"), Some(ProvinceId(30)));
    assert_eq!(resolve_spanish_province("28001"), Some(ProvinceId(28)));
    assert_eq!(resolve_spanish_province("00123"), None);
    assert_eq!(resolve_spanish_province("53001"), None);
    Ok(())
}

#[test]
fn test_wrong_lengths_are_unknown() -> Result<()> {
    for raw in ["", "1", "2800", "280011", "123456789", "abc", "28-00"] {
        assert_eq!(detect_country(raw), Country::Unknown, "{}", raw);
        assert_eq!(resolve_province(raw, None), None, "{}", raw);
        assert!(matches!(
            try_resolve_province(raw, None),
            Err(ResolutionError::MalformedPostalCode { .. })
        ));
    }
    Ok(())
}

#[test]
fn test_resolution_is_idempotent() -> Result<()> {
    let catalogue = ProvinceCatalogue::spain();
    for raw in ["30001", "1000-123", "99999", "nope"] {
        let first = resolve_province(raw, Some(&catalogue));
        let second = resolve_province(raw, Some(&catalogue));
        assert_eq!(first, second);
    }
    Ok(())
}

#[test]
fn test_portuguese_dispatch() -> Result<()> {
    assert_eq!(detect_country("1000-123"), Country::Portugal);
    assert_eq!(
        PostalCode::parse("1000123").map(|cp| cp.to_string()),
        Some("1000-123".to_string())
    );

    let lisboa = resolve_portuguese_province_code("1000999").unwrap();
    assert_eq!(lisboa.as_str(), "PT11");
    let braga = resolve_portuguese_province_code("4700-001").unwrap();
    assert_eq!(braga.as_str(), "PT03");

    // A Portuguese code needs a catalogue to become an id
    assert_eq!(resolve_province("1000-123", None), None);
    assert!(matches!(
        try_resolve_province("1000-123", None),
        Err(ResolutionError::MissingCatalogue { .. })
    ));

    let catalogue = ProvinceCatalogue::new(vec![ProvinceRecord {
        id: ProvinceId(111),
        code: Some("PT11".to_string()),
        name: "Lisboa".to_string(),
        country: Some("PT".to_string()),
    }]);
    assert_eq!(resolve_province("1000-123", Some(&catalogue)), Some(ProvinceId(111)));
    Ok(())
}

#[test]
fn test_postposed_article_matches_natural_order() -> Result<()> {
    assert_eq!(comparison_key("Ñora, La"), comparison_key("la ñora"));
    assert_eq!(comparison_key("  LA   ÑORA "), comparison_key("la ñora"));
    Ok(())
}

#[test]
fn test_longest_city_alias_wins() -> Result<()> {
    let resolver = AddressResolver::default();
    let city = resolver.lookup_city_defaults("Alcalá de Henares").unwrap();
    assert_eq!(city.province_id, ProvinceId(28));
    assert_eq!(city.postal_code.digits(), "28801");

    let refined = resolver
        .refine_by_neighborhood("C/ Mayor 3, Triana", "Sevilla")
        .unwrap();
    assert_eq!(refined.to_string(), "41010");
    Ok(())
}

#[test]
fn test_postal_code_wins_over_population() -> Result<()> {
    let resolver = AddressResolver::default();
    let catalogue = ProvinceCatalogue::spain();
    let reconciler = Reconciler::new(&resolver, Some(&catalogue), ReconcilePolicy::default());

    let result = reconciler.reconcile(&ClientAddress {
        postal_code: Some("30001".to_string()),
        population: Some("Madrid".to_string()),
        province_id: None,
        street: None,
    });

    assert_eq!(result.updates.province_id, Some(ProvinceId(30)));
    assert_eq!(result.updates.postal_code, None);
    assert_eq!(result.outcome, Outcome::Updated);
    assert!(result
        .discrepancies
        .iter()
        .any(|d| d.kind == DiscrepancyKind::PopulationProvinceMismatch));
    Ok(())
}
