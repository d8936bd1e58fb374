//! Make/model clean-up so camera segments stay short and stable across firmware spellings.

/// Make used when a file carries none.
pub const UNKNOWN_MAKE: &str = "Unknown";

/// First word of the make, title-cased, with a few vendor spellings fixed up.
///
/// `HTC Corporation` becomes `HTC`, `LG Electronics` becomes `LG`, and `Research In Motion` is
/// dropped entirely. A missing make yields `Unknown`.
pub fn normalize_make(raw: Option<&str>) -> String {
    let Some(first) = raw.and_then(|m| m.split_whitespace().next()) else {
        return UNKNOWN_MAKE.to_string();
    };
    let make = title_case(&first.to_lowercase());
    match make.as_str() {
        "Htc" => "HTC".to_string(),
        "Lg" => "LG".to_string(),
        "Research" => String::new(),
        _ => make,
    }
}

/// Model with the make removed; multi-word models are collapsed into CamelCase.
pub fn normalize_model(make: &str, raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let mut model = raw.to_string();
    if !make.is_empty() && !model.is_empty() {
        model = model.replace(make, "");
        model = model.replace(&make.to_uppercase(), "");
        model = model.trim().to_string();
    }
    if model.contains(char::is_whitespace) {
        model = model
            .split_whitespace()
            .map(|w| title_case(&w.to_lowercase()))
            .collect();
    }
    model
}

/// Upper-case every letter that starts a word; digits and letters continue a word.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_start = true;
    for c in s.chars() {
        if at_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_start = !c.is_alphanumeric() && c != '_';
    }
    out
}
