//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use minescout_core::{
    PipelineState, ProjectLabel, ResearchPipeline, StepId, StepProgress, StepRecord,
    build_report, queries_for, write_report,
};
use minescout_search::{SearchOrchestrator, provider_statuses};
use minescout_shared::{AppConfig, ProjectIdentity, ProviderCredentials, init_config, load_config};
use tracing::info;

use crate::output;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// MineScout: guided web research for mining projects.
#[derive(Parser)]
#[command(
    name = "minescout",
    version,
    about = "Run targeted web searches about a mining project and capture the facts into a report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Company/project label plus optional manual corrections.
#[derive(clap::Args)]
pub(crate) struct IdentityArgs {
    /// Project label, e.g. "Saturn Metals - Apollo Hill" or "BHP Olympic Dam".
    label: String,

    /// Use this company name instead of the parsed one.
    #[arg(long)]
    company: Option<String>,

    /// Use this project name instead of the parsed one.
    #[arg(long)]
    project: Option<String>,
}

impl IdentityArgs {
    /// Parse the label, then apply any manual overrides verbatim.
    fn resolve(&self) -> ProjectIdentity {
        let mut identity = ProjectLabel::new(self.label.as_str()).parse();
        if let Some(company) = &self.company {
            identity.company = company.clone();
        }
        if let Some(project) = &self.project {
            identity.project = project.clone();
        }
        identity
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show how a label splits into company and project.
    Parse {
        /// Project label to parse.
        label: String,
    },

    /// Print the search query for every step without running it.
    Queries {
        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Show which search providers have credentials.
    Providers,

    /// Run research steps and print the results.
    Research {
        #[command(flatten)]
        identity: IdentityArgs,

        /// Step(s) to run, by number or name. Defaults to all.
        #[arg(short, long = "step")]
        steps: Vec<String>,

        /// Record a finding, as `<step>=<text>` (repeatable).
        #[arg(short, long = "note")]
        notes: Vec<String>,

        /// Write the CSV report into this directory.
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Allow exporting when not every step has run.
        #[arg(long)]
        partial: bool,

        /// Print the session as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive research session.
    Session {
        #[command(flatten)]
        identity: IdentityArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "minescout=warn",
        1 => "minescout=info",
        2 => "minescout=debug",
        _ => "minescout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Parse { label } => cmd_parse(&label),
        Command::Queries { identity } => cmd_queries(&identity),
        Command::Providers => cmd_providers(),
        Command::Research {
            identity,
            steps,
            notes,
            export,
            partial,
            json,
        } => {
            cmd_research(&identity, &steps, &notes, export.as_deref(), partial, json).await
        }
        Command::Session { identity } => cmd_session(&identity).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Config, credentials and a ready pipeline.
pub(crate) struct Runtime {
    pub config: AppConfig,
    pub credentials: ProviderCredentials,
    pub pipeline: ResearchPipeline,
}

impl Runtime {
    fn load() -> Result<Self> {
        let config = load_config()?;
        let credentials = ProviderCredentials::from_env(&config);
        let orchestrator = SearchOrchestrator::from_config(&config, &credentials)?;
        let pipeline = ResearchPipeline::new(orchestrator, config.defaults.concurrency as usize);
        Ok(Self {
            config,
            credentials,
            pipeline,
        })
    }
}

fn cmd_parse(label: &str) -> Result<()> {
    let identity = ProjectLabel::new(label).parse();
    output::print_identity(&identity);
    Ok(())
}

fn cmd_queries(args: &IdentityArgs) -> Result<()> {
    let identity = args.resolve();
    output::print_identity(&identity);
    println!();
    for (step, query) in queries_for(&identity) {
        println!("  {step}");
        println!("    {query}");
    }
    Ok(())
}

fn cmd_providers() -> Result<()> {
    let config = load_config()?;
    let credentials = ProviderCredentials::from_env(&config);
    output::print_provider_statuses(&provider_statuses(&config, &credentials));
    Ok(())
}

async fn cmd_research(
    args: &IdentityArgs,
    steps: &[String],
    notes: &[String],
    export: Option<&Path>,
    partial: bool,
    json: bool,
) -> Result<()> {
    let runtime = Runtime::load()?;

    let steps = if steps.is_empty() {
        StepId::ALL.to_vec()
    } else {
        steps
            .iter()
            .map(|s| s.parse::<StepId>())
            .collect::<std::result::Result<Vec<_>, _>>()?
    };
    let notes = notes
        .iter()
        .map(|n| parse_note_arg(n))
        .collect::<Result<Vec<_>>>()?;

    let identity = args.resolve();
    if !json {
        output::print_identity(&identity);
    }
    if runtime.credentials.is_empty() {
        output::print_provider_statuses(&provider_statuses(&runtime.config, &runtime.credentials));
    }

    let mut state = PipelineState::new(identity);
    info!(
        company = %state.identity().company,
        project = %state.identity().project,
        steps = steps.len(),
        "starting research"
    );

    let progress = CliProgress::new(steps.len());
    runtime.pipeline.run_steps(&mut state, &steps, &progress).await;
    progress.finish();

    for (step, note) in notes {
        if !state.save_note(step, note) {
            eprintln!("note for step '{}' ignored: the step did not run", step.slug());
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        for record in state.records() {
            output::print_record(record);
        }
        output::print_progress(&state);
    }

    if let Some(dir) = export {
        let path = export_state(&state, dir, partial)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

async fn cmd_session(args: &IdentityArgs) -> Result<()> {
    let runtime = Runtime::load()?;
    let state = PipelineState::new(args.resolve());
    crate::session::run(runtime, state).await
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Parse a `<step>=<text>` note argument.
pub(crate) fn parse_note_arg(arg: &str) -> Result<(StepId, String)> {
    let (step, text) = arg
        .split_once('=')
        .ok_or_else(|| eyre!("note '{arg}' must look like <step>=<text>"))?;
    Ok((step.parse()?, text.trim().to_string()))
}

/// Write the report for `state` into `dir`.
///
/// Refuses an incomplete session unless `partial` is set.
pub(crate) fn export_state(state: &PipelineState, dir: &Path, partial: bool) -> Result<PathBuf> {
    if !state.is_complete() && !partial {
        let (done, total) = state.progress();
        return Err(eyre!(
            "research is incomplete ({done}/{total} steps); run every step before exporting"
        ));
    }
    let report = build_report(state, chrono::Local::now().naive_local());
    Ok(write_report(&report, dir)?)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
pub(crate) struct CliProgress {
    spinner: ProgressBar,
    total: usize,
    done: AtomicUsize,
}

impl CliProgress {
    pub(crate) fn new(total: usize) -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self {
            spinner,
            total,
            done: AtomicUsize::new(0),
        }
    }

    pub(crate) fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl StepProgress for CliProgress {
    fn step_started(&self, step: StepId, _query: &str) {
        self.spinner
            .set_message(format!("Researching {}...", step.title().to_lowercase()));
    }

    fn step_finished(&self, record: &StepRecord) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let mark = if record.outcome.is_ok() { "done" } else { "failed" };
        self.spinner.set_message(format!(
            "[{done}/{}] {} {mark}",
            self.total,
            record.step.title()
        ));
    }
}
