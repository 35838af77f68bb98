//! One-row CSV research report.
//!
//! Columns: `Company`, `Project`, `ResearchDate`, then for every step in
//! pipeline order `{slug}_query`, `{slug}_resultsSummary` and `{slug}_note`.
//! Steps that have not run leave their cells empty, so partial sessions export
//! fine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use minescout_shared::{MineScoutError, Result, SearchOutcome};
use tracing::info;

use crate::pipeline::PipelineState;
use crate::steps::StepId;

/// Results folded into each summary cell.
const SUMMARY_RESULTS: usize = 3;

/// Snippet characters kept per summarized result.
const SUMMARY_SNIPPET_CHARS: usize = 100;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// A flattened research session, ready to serialize.
#[derive(Debug, Clone)]
pub struct ResearchReport {
    company: String,
    project: String,
    created: NaiveDateTime,
    columns: Vec<(String, String)>,
}

impl ResearchReport {
    /// Column names in output order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Value of one column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Header line plus the single data row.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.columns.iter().map(|(name, _)| name))
            .and_then(|()| writer.write_record(self.columns.iter().map(|(_, value)| value)))
            .map_err(|e| MineScoutError::Export(e.to_string()))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| MineScoutError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| MineScoutError::Export(e.to_string()))
    }

    /// `{company}_{project}_research_report_{YYYYmmdd_HHMMSS}.csv`.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_research_report_{}.csv",
            file_safe(&self.company),
            file_safe(&self.project),
            self.created.format(FILE_STAMP_FORMAT)
        )
    }
}

/// Flatten `state` into a report stamped with `now`.
pub fn build_report(state: &PipelineState, now: NaiveDateTime) -> ResearchReport {
    let identity = state.identity();
    let mut columns = vec![
        ("Company".to_string(), identity.company.clone()),
        ("Project".to_string(), identity.project.clone()),
        ("ResearchDate".to_string(), now.format(DATE_FORMAT).to_string()),
    ];

    for step in StepId::ALL {
        let record = state.record(step);
        let slug = step.slug();
        columns.push((
            format!("{slug}_query"),
            record.map(|r| r.query.clone()).unwrap_or_default(),
        ));
        columns.push((
            format!("{slug}_resultsSummary"),
            record.map(|r| results_summary(&r.outcome)).unwrap_or_default(),
        ));
        columns.push((
            format!("{slug}_note"),
            record.and_then(|r| r.note.clone()).unwrap_or_default(),
        ));
    }

    ResearchReport {
        company: identity.company.clone(),
        project: identity.project.clone(),
        created: now,
        columns,
    }
}

/// `title: snippet...` for the top results, joined with ` | `.
/// Empty for failed searches.
pub fn results_summary(outcome: &SearchOutcome) -> String {
    outcome
        .results()
        .iter()
        .take(SUMMARY_RESULTS)
        .map(|r| {
            let snippet: String = r.snippet.chars().take(SUMMARY_SNIPPET_CHARS).collect();
            format!("{}: {snippet}...", r.title)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Write the report into `dir` (created if needed) and return the file path.
pub fn write_report(report: &ResearchReport, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| MineScoutError::io(dir, e))?;
    let path = dir.join(report.file_name());
    std::fs::write(&path, report.to_csv()?).map_err(|e| MineScoutError::io(&path, e))?;
    info!(?path, "wrote research report");
    Ok(path)
}

/// Read CSV text back into one column→value map per data row.
pub fn parse_csv(text: &str) -> Result<Vec<BTreeMap<String, String>>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| MineScoutError::Export(e.to_string()))?
        .clone();

    reader
        .records()
        .map(|row| -> Result<BTreeMap<String, String>> {
            let row = row.map_err(|e| MineScoutError::Export(e.to_string()))?;
            Ok(headers
                .iter()
                .zip(row.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect())
        })
        .collect()
}

/// Replace characters that are unsafe in file names.
fn file_safe(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() || c.is_control() => '_',
            c => c,
        })
        .collect()
}
