//! Text normalization for case- and accent-insensitive comparisons.

/// Articles that CRM exports place after the name ("Ñora, La").
const POSTPOSED_ARTICLES: &[&str] = &[
    "la", "el", "los", "las", "l'", "es", "sa", "ses", "o", "a", "os", "as",
];

/// Lowercase, trim, collapse internal whitespace and strip diacritics.
///
/// Total: empty input yields an empty string.
pub fn normalize_text(s: &str) -> String {
    let folded: String = s
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key used by the city and neighborhood tables.
///
/// Builds on [`normalize_text`], moves a postposed article to the front and
/// replaces punctuation with spaces, so `"Ñora, La"` and `"la ñora"` compare equal.
pub fn comparison_key(s: &str) -> String {
    let text = normalize_text(s);

    let reordered = match text.rsplit_once(',') {
        Some((name, article)) if POSTPOSED_ARTICLES.contains(&article.trim()) => {
            format!("{} {}", article.trim(), name.trim())
        }
        _ => text,
    };

    reordered
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-word containment between two comparison keys.
pub(crate) fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    format!(" {} ", haystack).contains(&format!(" {} ", needle))
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ò' | 'ó' | 'ô' | 'ö' | 'õ' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        '·' => '.',
        other => other,
    }
}
