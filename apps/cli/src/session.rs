//! Interactive research session.
//!
//! Reads one command per line from stdin and drives a single
//! [`PipelineState`] until the user quits.

use std::io::Write;
use std::path::PathBuf;

use color_eyre::eyre::Result;
use minescout_core::{PipelineState, StepId};
use minescout_search::provider_statuses;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::commands::{CliProgress, Runtime, export_state};
use crate::output;

const HELP: &str = "\
Commands:
  run <step|all>        run one step (number or name) or every step
  note <step> <text>    record what you found for a step
  company <name>        correct the company name
  project <name>        correct the project name
  show [step]           show results for one step or all completed steps
  status                show progress and providers
  export [dir]          write the CSV report (asks before exporting a partial session)
  clear                 forget all results, keep the names
  help                  show this help
  quit                  leave the session";

/// One parsed session command.
#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Run(Vec<StepId>),
    Note(StepId, String),
    Company(String),
    Project(String),
    Show(Option<StepId>),
    Status,
    Export(Option<PathBuf>),
    Clear,
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map(|(v, r)| (v, r.trim()))
        .unwrap_or((line, ""));

    let step = |s: &str| s.parse::<StepId>().map_err(|e| e.to_string());

    match verb.to_lowercase().as_str() {
        "run" if rest.eq_ignore_ascii_case("all") || rest.is_empty() => {
            Ok(SessionCommand::Run(StepId::ALL.to_vec()))
        }
        "run" => rest
            .split_whitespace()
            .map(step)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(SessionCommand::Run),
        "note" => {
            let (which, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: note <step> <text>".to_string())?;
            Ok(SessionCommand::Note(step(which)?, text.trim().to_string()))
        }
        "company" | "project" if rest.is_empty() => Err(format!("usage: {verb} <name>")),
        "company" => Ok(SessionCommand::Company(rest.to_string())),
        "project" => Ok(SessionCommand::Project(rest.to_string())),
        "show" if rest.is_empty() => Ok(SessionCommand::Show(None)),
        "show" => Ok(SessionCommand::Show(Some(step(rest)?))),
        "status" => Ok(SessionCommand::Status),
        "export" if rest.is_empty() => Ok(SessionCommand::Export(None)),
        "export" => Ok(SessionCommand::Export(Some(PathBuf::from(rest)))),
        "clear" => Ok(SessionCommand::Clear),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command '{other}', type 'help'")),
    }
}

fn prompt(state: &PipelineState) {
    let (done, total) = state.progress();
    print!("[{done}/{total}] minescout> ");
    // A failed flush only delays the prompt.
    let _ = std::io::stdout().flush();
}

/// Run the session loop until `quit` or end of input.
pub(crate) async fn run(runtime: Runtime, mut state: PipelineState) -> Result<()> {
    output::print_identity(state.identity());
    if runtime.credentials.is_empty() {
        output::print_provider_statuses(&provider_statuses(&runtime.config, &runtime.credentials));
    }
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut confirm_partial = false;

    loop {
        prompt(&state);
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        debug!(?command, "session command");

        // A partial export must be confirmed by repeating it immediately.
        let partial_ok = confirm_partial && matches!(command, SessionCommand::Export(_));
        confirm_partial = false;

        match command {
            SessionCommand::Run(steps) => {
                let progress = CliProgress::new(steps.len());
                runtime.pipeline.run_steps(&mut state, &steps, &progress).await;
                progress.finish();
                for step in steps {
                    if let Some(record) = state.record(step) {
                        output::print_record(record);
                    }
                }
            }
            SessionCommand::Note(step, text) => {
                if state.save_note(step, text) {
                    println!("Saved note for {}.", step.title());
                } else {
                    println!("Run step '{}' before recording a note.", step.slug());
                }
            }
            SessionCommand::Company(name) => {
                state.set_company(name);
                output::print_identity(state.identity());
            }
            SessionCommand::Project(name) => {
                state.set_project(name);
                output::print_identity(state.identity());
            }
            SessionCommand::Show(Some(step)) => match state.record(step) {
                Some(record) => output::print_record(record),
                None => println!("Step '{}' has not run yet.", step.slug()),
            },
            SessionCommand::Show(None) => {
                for record in state.records() {
                    output::print_record(record);
                }
            }
            SessionCommand::Status => {
                output::print_identity(state.identity());
                output::print_provider_statuses(&provider_statuses(
                    &runtime.config,
                    &runtime.credentials,
                ));
                output::print_progress(&state);
            }
            SessionCommand::Export(dir) => {
                let dir = dir.unwrap_or_else(|| PathBuf::from(&runtime.config.defaults.export_dir));
                if !state.is_complete() && !partial_ok {
                    let (done, total) = state.progress();
                    println!(
                        "Only {done}/{total} steps have run. Repeat 'export' to write a partial report."
                    );
                    confirm_partial = true;
                    continue;
                }
                match export_state(&state, &dir, true) {
                    Ok(path) => println!("Report written to {}", path.display()),
                    Err(e) => {
                        warn!(error = %e, "export failed");
                        println!("Export failed: {e}");
                    }
                }
            }
            SessionCommand::Clear => {
                state.clear();
                println!("Results cleared.");
            }
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Quit => break,
        }
    }

    Ok(())
}
