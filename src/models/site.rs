use serde::{Deserialize, Serialize};

/// A physical location grouping one or more plants over time. All plants
/// under one site share the same municipality label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub key: String,
    pub label: String,
    pub municipality: String,
    /// Plant ids ordered by commission date.
    pub plant_ids: Vec<usize>,
}

/// Collapse internal whitespace and trim, keeping the original casing for
/// display purposes.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract a parenthesized location suffix from a display name, e.g.
/// "Block A (Gelsenkirchen)" -> "Gelsenkirchen".
pub fn parenthesized_suffix(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if !trimmed.ends_with(')') {
        return None;
    }
    let open = trimmed.rfind('(')?;
    let inner = trimmed[open + 1..trimmed.len() - 1].trim();
    if inner.is_empty() {
        None
    } else {
        Some(normalize_label(inner))
    }
}

/// Derive the grouping key for a plant record. Site identity is matched by
/// normalized string equality, not geographic distance; this is a deliberate
/// simplification carried over from the source data, which has no coordinates.
///
/// Fallback chain: explicit municipality, then a parenthesized suffix of the
/// display name, then the normalized name itself.
pub fn site_key(name: &str, municipality: &str) -> String {
    let municipality = normalize_label(municipality);
    if !municipality.is_empty() {
        return municipality;
    }
    if let Some(suffix) = parenthesized_suffix(name) {
        return suffix;
    }
    normalize_label(name)
}
