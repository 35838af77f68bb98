//! Keyword tagging of search results.
//!
//! Points the user at results likely to mention a fact they are looking for.
//! Nothing is extracted; the user still reads the snippet.

use minescout_shared::SearchResult;

/// Kind of information a result appears to mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoHint {
    Location,
    Coordinates,
    Commodity,
    Drilling,
    ResourceData,
    DevelopmentStage,
}

impl InfoHint {
    pub fn label(self) -> &'static str {
        match self {
            Self::Location => "Location info",
            Self::Coordinates => "Coordinates",
            Self::Commodity => "Commodity info",
            Self::Drilling => "Drilling info",
            Self::ResourceData => "Resource data",
            Self::DevelopmentStage => "Development stage",
        }
    }
}

impl std::fmt::Display for InfoHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const KEYWORDS: &[(InfoHint, &[&str])] = &[
    (
        InfoHint::Location,
        &["location", "western australia", "wa", "perth", "state"],
    ),
    (
        InfoHint::Coordinates,
        &["latitude", "longitude", "coordinates", "gps"],
    ),
    (
        InfoHint::Commodity,
        &["gold", "copper", "iron", "lithium", "commodity"],
    ),
    (InfoHint::Drilling, &["drilling", "diamond", "rc", "metres"]),
    (
        InfoHint::ResourceData,
        &["resource", "moz", "mt", "grade", "tonnage"],
    ),
    (
        InfoHint::DevelopmentStage,
        &["pfs", "dfs", "feasibility", "scoping", "exploration"],
    ),
];

/// Hints for one result, in a fixed order. Keywords match whole words only,
/// so "wa" does not fire on "was".
pub fn hints_for(result: &SearchResult) -> Vec<InfoHint> {
    let text = normalize(&format!("{} {}", result.title, result.snippet));
    KEYWORDS
        .iter()
        .filter(|(_, words)| words.iter().any(|w| text.contains(&format!(" {w} "))))
        .map(|(hint, _)| *hint)
        .collect()
}

/// Lowercase, collapse everything but letters and digits to single spaces,
/// and pad both ends so every word is space-delimited.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for c in text.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if !out.ends_with(' ') {
        out.push(' ');
    }
    out
}
