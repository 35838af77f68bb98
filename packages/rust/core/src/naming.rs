//! Splitting a free-text project label into company and project names.
//!
//! The heuristic is inherently ambiguous. It aims for a reasonable default the
//! user can override, never for correctness, and it never fails.

use minescout_shared::ProjectIdentity;
use tracing::debug;

/// Explicit separators, checked in this order.
const SEPARATORS: &[&str] = &[" - ", " – ", " — ", " | ", " / ", " \\ "];

/// Words that usually start the project part of a label.
const PROJECT_KEYWORDS: &[&str] = &[
    "project",
    "mine",
    "deposit",
    "prospect",
    "operation",
    "hill",
    "pit",
    "field",
];

/// Fragments that mark a trailing word as a place or project name.
const TRAILING_KEYWORDS: &[&str] = &["hill", "creek", "mine", "pit", "deposit", "prospect"];

/// The raw label as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLabel(String);

impl ProjectLabel {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Best-effort split into (company, project).
    pub fn parse(&self) -> ProjectIdentity {
        parse_label(&self.0)
    }
}

impl std::fmt::Display for ProjectLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split `label` into a company and a project name.
///
/// In priority order:
/// 1. the first separator from [`SEPARATORS`] present in the label;
/// 2. a single word is used for both fields;
/// 3. the first project keyword that is not the first word;
/// 4. a trailing one or two words containing a place/project fragment;
/// 5. otherwise the word list is cut in half.
pub fn parse_label(label: &str) -> ProjectIdentity {
    if let Some(identity) = split_on_separator(label) {
        debug!(?identity, "label split on separator");
        return identity;
    }

    let words: Vec<&str> = label.split_whitespace().collect();
    if words.len() < 2 {
        let whole = label.trim();
        return ProjectIdentity::new(whole, whole);
    }

    let identity = split_on_keyword(&words)
        .or_else(|| split_trailing_place(&words))
        .unwrap_or_else(|| split_at(&words, words.len() / 2));

    debug!(?identity, "label split heuristically");
    identity
}

fn split_on_separator(label: &str) -> Option<ProjectIdentity> {
    SEPARATORS.iter().find_map(|sep| {
        label
            .split_once(sep)
            .map(|(company, project)| ProjectIdentity::new(company.trim(), project.trim()))
    })
}

fn split_on_keyword(words: &[&str]) -> Option<ProjectIdentity> {
    words
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, word)| {
            PROJECT_KEYWORDS
                .iter()
                .any(|kw| word.eq_ignore_ascii_case(kw))
        })
        .map(|(i, _)| split_at(words, i))
}

fn split_trailing_place(words: &[&str]) -> Option<ProjectIdentity> {
    let n = words.len();

    if contains_place_fragment(words[n - 1]) {
        return Some(split_at(words, n - 1));
    }

    if n >= 3 && contains_place_fragment(&words[n - 2..].join(" ")) {
        return Some(split_at(words, n - 2));
    }

    None
}

fn contains_place_fragment(text: &str) -> bool {
    let lower = text.to_lowercase();
    TRAILING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

fn split_at(words: &[&str], i: usize) -> ProjectIdentity {
    ProjectIdentity::new(words[..i].join(" "), words[i..].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(label: &str) -> (String, String) {
        let id = parse_label(label);
        (id.company, id.project)
    }

    fn pair(company: &str, project: &str) -> (String, String) {
        (company.to_string(), project.to_string())
    }

    #[test]
    fn splits_on_hyphen_separator() {
        assert_eq!(
            parsed("Saturn Metals - Apollo Hill"),
            pair("Saturn Metals", "Apollo Hill")
        );
    }

    #[test]
    fn splits_on_dashes_pipes_and_slashes() {
        assert_eq!(parsed("Evolution Mining – Cowal"), pair("Evolution Mining", "Cowal"));
        assert_eq!(parsed("Newmont — Boddington"), pair("Newmont", "Boddington"));
        assert_eq!(parsed("Rio Tinto | Pilbara Iron"), pair("Rio Tinto", "Pilbara Iron"));
        assert_eq!(parsed("IGO / Nova Bollinger"), pair("IGO", "Nova Bollinger"));
        assert_eq!(parsed("Capricorn \\ Karlawinda"), pair("Capricorn", "Karlawinda"));
    }

    #[test]
    fn separator_list_order_wins_over_position() {
        // " / " appears first in the text, but " - " is earlier in the list.
        assert_eq!(parsed("A / B - C D"), pair("A / B", "C D"));
    }

    #[test]
    fn splits_only_on_first_occurrence_and_trims() {
        assert_eq!(
            parsed("  Ramelius  -  Mt Magnet - Stage 2 "),
            pair("Ramelius", "Mt Magnet - Stage 2")
        );
    }

    #[test]
    fn single_word_is_both_company_and_project() {
        assert_eq!(parsed("Cadia"), pair("Cadia", "Cadia"));
        assert_eq!(parsed("  Telfer "), pair("Telfer", "Telfer"));
    }

    #[test]
    fn keyword_free_label_splits_at_midpoint() {
        assert_eq!(parsed("BHP Olympic Dam"), pair("BHP", "Olympic Dam"));
        assert_eq!(parsed("Newcrest Cadia"), pair("Newcrest", "Cadia"));
        assert_eq!(
            parsed("Northern Star Resources Jundee"),
            pair("Northern Star", "Resources Jundee")
        );
    }

    #[test]
    fn project_keyword_starts_project() {
        assert_eq!(
            parsed("Acme Gold Project Alpha"),
            pair("Acme Gold", "Project Alpha")
        );
        assert_eq!(parsed("De Grey MINE Hemi"), pair("De Grey", "MINE Hemi"));
    }

    #[test]
    fn first_keyword_wins_even_if_it_leaves_a_short_project() {
        let id = parse_label("Saturn Metals Apollo Hill");
        assert_eq!(id, ProjectIdentity::new("Saturn Metals Apollo", "Hill"));
        // This is exactly the case the misparse warning exists for.
        assert!(id.looks_misparsed());
    }

    #[test]
    fn leading_keyword_is_not_a_split_point() {
        assert_eq!(
            parsed("Project Alpha Resources"),
            pair("Project", "Alpha Resources")
        );
    }

    #[test]
    fn trailing_place_word_becomes_project() {
        assert_eq!(
            parsed("Gold Road Gruyere Creek"),
            pair("Gold Road Gruyere", "Creek")
        );
        assert_eq!(parsed("Minerals Redhill"), pair("Minerals", "Redhill"));
    }

    #[test]
    fn trailing_two_words_become_project() {
        assert_eq!(parsed("Acme Hillside Gold"), pair("Acme", "Hillside Gold"));
    }

    #[test]
    fn parse_is_total() {
        for label in ["", "   ", "-", " - ", "a b c d e f g"] {
            let _ = parse_label(label);
        }
        assert_eq!(parsed(""), pair("", ""));
    }

    #[test]
    fn label_wrapper_delegates() {
        let label = ProjectLabel::new("BHP Olympic Dam");
        assert_eq!(label.parse(), ProjectIdentity::new("BHP", "Olympic Dam"));
        assert_eq!(label.to_string(), "BHP Olympic Dam");
    }
}
