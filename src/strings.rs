//! String normalization for fuzzy comparisons of names, IBANs and
//! similar user-typed values.

#[derive(Debug, thiserror::Error)]
#[error("invalid language code: {0:?}")]
pub struct InvalidLanguageCode(pub String);

/// Compare two strings regardless of case, whitespace, umlauts,
/// apostrophes and accents.
pub fn eq_comparable(a: &str, b: &str) -> bool {
    comparable(a) == comparable(b)
}

/// Reduce a string to a comparison key: whitespace removed, umlauts and
/// accents transliterated, lowercased.
pub fn comparable(s: &str) -> String {
    let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    transliterate(&stripped).to_lowercase()
}

/// Transliterate umlauts to their two-letter ASCII forms (ä -> ae),
/// strip accents from common Latin letters and drop apostrophes and any
/// remaining non-ASCII characters. ASCII alphanumerics and whitespace
/// pass through; other ASCII punctuation is dropped.
pub fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() || c.is_whitespace() {
            out.push(c);
            continue;
        }
        if let Some(mapped) = map_latin(c) {
            out.push_str(mapped);
        }
        // everything else (apostrophes, punctuation, leftovers) is dropped
    }
    out
}

fn map_latin(c: char) -> Option<&'static str> {
    let mapped = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'á' | 'à' | 'â' | 'ã' | 'å' | 'ā' | 'ă' => "a",
        'Á' | 'À' | 'Â' | 'Ã' | 'Å' | 'Ā' => "A",
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ė' => "e",
        'É' | 'È' | 'Ê' | 'Ë' | 'Ē' => "E",
        'í' | 'ì' | 'î' | 'ï' | 'ī' => "i",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'ó' | 'ò' | 'ô' | 'õ' | 'ø' | 'ō' => "o",
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ø' => "O",
        'ú' | 'ù' | 'û' | 'ū' => "u",
        'Ú' | 'Ù' | 'Û' => "U",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'ñ' | 'ń' => "n",
        'Ñ' => "N",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        'š' | 'ś' => "s",
        'Š' | 'Ś' => "S",
        'ž' | 'ź' | 'ż' => "z",
        'Ž' | 'Ź' | 'Ż' => "Z",
        _ => return None,
    };
    Some(mapped)
}

/// Extract the lowercased primary language subtag from codes like
/// `"de"`, `"de_DE"` or `"de-DE"`.
pub fn normalize_language_code(code: &str) -> Result<String, InvalidLanguageCode> {
    let parts: Vec<&str> = code.split(['-', '_']).collect();
    let valid = match parts.as_slice() {
        [lang] => is_two_alpha(lang),
        [lang, region] => is_two_alpha(lang) && is_two_alpha(region),
        _ => false,
    };
    if !valid {
        return Err(InvalidLanguageCode(code.to_owned()));
    }
    Ok(parts[0].to_lowercase())
}

fn is_two_alpha(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_alphabetic())
}
