//! Terminal rendering of identities, provider status and step records.

use minescout_core::{PipelineState, StepRecord, hints_for};
use minescout_search::ProviderStatus;
use minescout_shared::{ProjectIdentity, SearchOutcome};

pub(crate) fn print_identity(identity: &ProjectIdentity) {
    println!("Company: {}", identity.company);
    println!("Project: {}", identity.project);
    if identity.looks_misparsed() {
        print_misparse_warning();
    }
}

fn print_misparse_warning() {
    println!(
        "  warning: the names may have been split incorrectly; \
         pass --company/--project to correct them"
    );
}

pub(crate) fn print_provider_statuses(statuses: &[ProviderStatus]) {
    println!("Search providers (tried in this order):");
    for status in statuses {
        let state = if status.configured {
            "configured"
        } else {
            "missing key"
        };
        println!("  {:<8} {:<12} env: {}", status.name, state, status.api_key_env);
    }
    if statuses.iter().all(|s| !s.configured) {
        println!("  No provider has an API key; every search will fail until one is set.");
    }
}

pub(crate) fn print_record(record: &StepRecord) {
    println!();
    println!("{}", record.step);
    println!("  Query: {}", record.query);

    match &record.outcome {
        SearchOutcome::Ok { results, .. } if results.is_empty() => {
            println!("  No results found.");
        }
        SearchOutcome::Ok { results, .. } => {
            for (i, result) in results.iter().enumerate() {
                println!("  {}. {}", i + 1, result.title);
                println!("     {}", result.link);
                if !result.snippet.is_empty() {
                    println!("     {}", result.snippet);
                }
                let hints = hints_for(result);
                if !hints.is_empty() {
                    let labels: Vec<&str> = hints.iter().map(|h| h.label()).collect();
                    println!("     [{}]", labels.join(", "));
                }
            }
        }
        SearchOutcome::Err { failure, .. } => {
            println!("  Search failed: {failure}");
            if failure.needs_credentials() {
                println!("  Set a provider API key (see `minescout providers`) and re-run the step.");
            }
        }
    }

    match &record.note {
        Some(note) => println!("  Note: {note}"),
        None => println!(
            "  {} - (e.g. {})",
            record.step.note_label(),
            record.step.note_example()
        ),
    }
}

pub(crate) fn print_progress(state: &PipelineState) {
    let (done, total) = state.progress();
    println!();
    println!("Progress: {done}/{total} steps completed");
    let pending = state.pending();
    if !pending.is_empty() {
        let names: Vec<&str> = pending.iter().map(|s| s.slug()).collect();
        println!("Pending: {}", names.join(", "));
    }
}
