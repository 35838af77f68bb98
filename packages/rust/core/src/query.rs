//! Deterministic per-step search queries.
//!
//! The same step and names always produce byte-identical queries, so re-running
//! a step without touching the identity repeats the exact same request.

use minescout_shared::ProjectIdentity;

use crate::steps::StepId;

/// Build the query for `step`, quoting both names as exact phrases.
pub fn build_query(step: StepId, company: &str, project: &str) -> String {
    let company = phrase(company);
    let project = phrase(project);
    let terms = match step {
        StepId::Location => r#"location "Western Australia" OR "WA" OR "Queensland" OR "NSW" state"#,
        StepId::Coordinates => "coordinates latitude longitude GPS mining location",
        StepId::Commodity => "gold copper iron ore lithium mineral commodity type",
        StepId::Drilling => "diamond drilling completed reverse circulation RC drilling program",
        StepId::Stage => "exploration scoping study PFS DFS feasibility development stage",
        StepId::Resources => "resource estimate tonnage grade ounces Mt Moz JORC mineral resource",
        StepId::Competency => r#"ore competency UCS BWI "bond work index" hardness strength crushing"#,
        StepId::Process => r#"process flowsheet HPGR "high pressure grinding" comminution processing"#,
    };
    format!(r#""{company}" "{project}" {terms}"#)
}

/// Queries for every step, in pipeline order.
pub fn queries_for(identity: &ProjectIdentity) -> Vec<(StepId, String)> {
    StepId::ALL
        .into_iter()
        .map(|step| (step, build_query(step, &identity.company, &identity.project)))
        .collect()
}

/// A name as it appears inside a quoted phrase. Embedded quotes would end the
/// phrase early, so they are dropped.
fn phrase(name: &str) -> String {
    name.trim().replace('"', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_query_matches_template() {
        assert_eq!(
            build_query(StepId::Location, "Saturn Metals", "Apollo Hill"),
            r#""Saturn Metals" "Apollo Hill" location "Western Australia" OR "WA" OR "Queensland" OR "NSW" state"#
        );
    }

    #[test]
    fn resource_query_matches_template() {
        assert_eq!(
            build_query(StepId::Resources, "BHP", "Olympic Dam"),
            r#""BHP" "Olympic Dam" resource estimate tonnage grade ounces Mt Moz JORC mineral resource"#
        );
    }

    #[test]
    fn queries_are_deterministic() {
        for step in StepId::ALL {
            let a = build_query(step, "Newcrest", "Cadia East");
            let b = build_query(step, "Newcrest", "Cadia East");
            assert_eq!(a.as_bytes(), b.as_bytes());
        }
    }

    #[test]
    fn every_step_has_a_distinct_query() {
        let identity = ProjectIdentity::new("Newcrest", "Cadia East");
        let mut queries: Vec<String> = queries_for(&identity).into_iter().map(|(_, q)| q).collect();
        assert_eq!(queries.len(), StepId::COUNT);
        queries.sort();
        queries.dedup();
        assert_eq!(queries.len(), StepId::COUNT);
    }

    #[test]
    fn embedded_quotes_do_not_break_phrases() {
        let q = build_query(StepId::Commodity, r#"The "Big" Miner"#, " Alpha ");
        assert!(q.starts_with(r#""The Big Miner" "Alpha" "#));
    }
}
