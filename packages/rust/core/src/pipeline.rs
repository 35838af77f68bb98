//! The eight-step research pipeline and its session-scoped state.
//!
//! [`PipelineState`] is a plain value owned by the caller and threaded through
//! every call; there is no global store. [`ResearchPipeline`] turns a step into
//! a query, runs it through the [`SearchOrchestrator`] and records the outcome.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use minescout_search::SearchOrchestrator;
use minescout_shared::{ProjectIdentity, SearchOutcome};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

use crate::naming::ProjectLabel;
use crate::query::build_query;
use crate::steps::StepId;

// ---------------------------------------------------------------------------
// StepRecord
// ---------------------------------------------------------------------------

/// What one run of a step produced, plus the fact the user recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: StepId,
    pub query: String,
    pub outcome: SearchOutcome,
    /// Free-text fact the user extracted from the results.
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// Everything one research session knows.
///
/// A step counts as completed as soon as it has been attempted, whether the
/// search succeeded or not, so `completed` always equals the keys of `records`.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    identity: ProjectIdentity,
    records: BTreeMap<StepId, StepRecord>,
    completed: BTreeSet<StepId>,
}

impl PipelineState {
    pub fn new(identity: ProjectIdentity) -> Self {
        Self {
            identity,
            records: BTreeMap::new(),
            completed: BTreeSet::new(),
        }
    }

    /// Start a session from a raw label, using the parsed identity.
    pub fn from_label(label: &ProjectLabel) -> Self {
        Self::new(label.parse())
    }

    pub fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    /// Overwrite the identity with user-corrected names.
    ///
    /// Edited names are authoritative: they are not re-parsed, and records from
    /// earlier runs are kept as they are.
    pub fn set_identity(&mut self, company: impl Into<String>, project: impl Into<String>) {
        self.identity = ProjectIdentity::new(company, project);
    }

    pub fn set_company(&mut self, company: impl Into<String>) {
        self.identity.company = company.into();
    }

    pub fn set_project(&mut self, project: impl Into<String>) {
        self.identity.project = project.into();
    }

    pub fn record(&self, step: StepId) -> Option<&StepRecord> {
        self.records.get(&step)
    }

    /// Records in pipeline order.
    pub fn records(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.values()
    }

    pub fn completed(&self) -> &BTreeSet<StepId> {
        &self.completed
    }

    /// `(completed, total)` step counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.completed.len(), StepId::COUNT)
    }

    pub fn is_complete(&self) -> bool {
        self.completed.len() == StepId::COUNT
    }

    /// Steps that have not been attempted yet, in pipeline order.
    pub fn pending(&self) -> Vec<StepId> {
        StepId::ALL
            .into_iter()
            .filter(|step| !self.completed.contains(step))
            .collect()
    }

    /// Store the outcome of a step, replacing any earlier run of it.
    ///
    /// A note saved against the earlier run is discarded with it.
    pub fn insert(&mut self, step: StepId, query: String, outcome: SearchOutcome) -> &StepRecord {
        self.completed.insert(step);
        self.records.insert(
            step,
            StepRecord {
                step,
                query,
                outcome,
                note: None,
            },
        );
        &self.records[&step]
    }

    /// Attach the user's extracted fact to a step that has run.
    ///
    /// Saving against a step that has not run yet is a silent no-op; the return
    /// value tells the caller whether anything was stored.
    pub fn save_note(&mut self, step: StepId, note: impl Into<String>) -> bool {
        match self.records.get_mut(&step) {
            Some(record) => {
                record.note = Some(note.into());
                true
            }
            None => false,
        }
    }

    /// Drop all records and completion marks, keeping the identity.
    pub fn clear(&mut self) {
        self.records.clear();
        self.completed.clear();
    }
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting step status.
pub trait StepProgress: Send + Sync {
    /// Called when a step's search is dispatched.
    fn step_started(&self, step: StepId, query: &str);
    /// Called once the step's record has been stored.
    fn step_finished(&self, record: &StepRecord);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl StepProgress for SilentProgress {
    fn step_started(&self, _step: StepId, _query: &str) {}
    fn step_finished(&self, _record: &StepRecord) {}
}

// ---------------------------------------------------------------------------
// ResearchPipeline
// ---------------------------------------------------------------------------

/// Dispatches steps: identity → query → orchestrated search → record.
pub struct ResearchPipeline {
    orchestrator: Arc<SearchOrchestrator>,
    concurrency: usize,
}

impl ResearchPipeline {
    /// `concurrency` caps how many steps search at once; zero is treated as one.
    pub fn new(orchestrator: SearchOrchestrator, concurrency: usize) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            concurrency: concurrency.max(1),
        }
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    /// Run a single step and store its record, overwriting any earlier run.
    #[instrument(skip_all, fields(step = step.slug()))]
    pub async fn run_step<'s>(&self, state: &'s mut PipelineState, step: StepId) -> &'s StepRecord {
        let identity = state.identity();
        let query = build_query(step, &identity.company, &identity.project);
        let outcome = self.orchestrator.run(&query).await;
        info!(ok = outcome.is_ok(), results = outcome.results().len(), "step finished");
        state.insert(step, query, outcome)
    }

    /// Run several steps, up to `concurrency` at a time.
    ///
    /// Searches run on separate tasks; their outcomes are written into `state`
    /// one at a time, by this call only, as they arrive. Duplicated steps run once.
    #[instrument(skip_all, fields(steps = steps.len(), concurrency = self.concurrency))]
    pub async fn run_steps(
        &self,
        state: &mut PipelineState,
        steps: &[StepId],
        progress: &dyn StepProgress,
    ) {
        let unique: BTreeSet<StepId> = steps.iter().copied().collect();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for step in unique {
            let identity = state.identity();
            let query = build_query(step, &identity.company, &identity.project);
            progress.step_started(step, &query);

            let orchestrator = Arc::clone(&self.orchestrator);
            let sem = Arc::clone(&semaphore);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquiring only waits.
                let _permit = sem.acquire_owned().await.ok();
                let outcome = orchestrator.run(&query).await;
                (step, query, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((step, query, outcome)) => {
                    info!(step = step.slug(), ok = outcome.is_ok(), "step finished");
                    let record = state.insert(step, query, outcome);
                    progress.step_finished(record);
                }
                Err(e) => error!(error = %e, "research step task failed"),
            }
        }

        let (done, total) = state.progress();
        info!(done, total, "research steps finished");
    }

    /// Run every step.
    pub async fn run_all(&self, state: &mut PipelineState, progress: &dyn StepProgress) {
        self.run_steps(state, &StepId::ALL, progress).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use minescout_search::SearchProvider;
    use minescout_shared::{SearchFailure, SearchResult};

    use super::*;

    /// Succeeds with one result echoing the query, and tracks concurrency.
    struct EchoProvider {
        calls: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        delay: Duration,
    }

    #[async_trait]
    impl SearchProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn search(&self, query: &str, _timeout: Duration) -> SearchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            SearchOutcome::ok(
                query,
                vec![SearchResult {
                    title: "hit".into(),
                    link: "https://example.com".into(),
                    snippet: query.into(),
                }],
            )
        }
    }

    /// Fails for queries containing any of the given markers.
    struct PickyProvider {
        fail_on: Vec<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchProvider for PickyProvider {
        fn name(&self) -> &'static str {
            "picky"
        }

        async fn search(&self, query: &str, _timeout: Duration) -> SearchOutcome {
            self.seen.lock().unwrap().push(query.to_string());
            if self.fail_on.iter().any(|m| query.contains(m)) {
                SearchOutcome::err(
                    query,
                    SearchFailure::Http {
                        provider: "picky",
                        status: 502,
                    },
                )
            } else {
                SearchOutcome::ok(query, vec![])
            }
        }
    }

    struct Counters {
        calls: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    fn echo_pipeline(concurrency: usize, delay: Duration) -> (ResearchPipeline, Counters) {
        let calls = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let provider = EchoProvider {
            calls: calls.clone(),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: peak.clone(),
            delay,
        };
        let orchestrator = SearchOrchestrator::new(vec![Box::new(provider)], Duration::from_secs(5));
        (
            ResearchPipeline::new(orchestrator, concurrency),
            Counters { calls, peak },
        )
    }

    fn state() -> PipelineState {
        PipelineState::from_label(&ProjectLabel::new("Saturn Metals - Apollo Hill"))
    }

    /// Records a log line per callback.
    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl StepProgress for RecordingProgress {
        fn step_started(&self, step: StepId, _query: &str) {
            self.events.lock().unwrap().push(format!("start {}", step.slug()));
        }

        fn step_finished(&self, record: &StepRecord) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {}", record.step.slug()));
        }
    }

    #[tokio::test]
    async fn run_step_records_query_and_outcome() {
        let (pipeline, _) = echo_pipeline(1, Duration::ZERO);
        let mut state = state();

        let record = pipeline.run_step(&mut state, StepId::Commodity).await.clone();

        assert_eq!(record.step, StepId::Commodity);
        assert!(record.query.starts_with(r#""Saturn Metals" "Apollo Hill" "#));
        assert_eq!(record.outcome.query(), record.query);
        assert!(record.outcome.is_ok());
        assert_eq!(record.note, None);
        assert!(state.completed().contains(&StepId::Commodity));
        assert_eq!(state.progress(), (1, 8));
    }

    #[tokio::test]
    async fn rerunning_a_step_overwrites_its_record() {
        let (pipeline, counters) = echo_pipeline(1, Duration::ZERO);
        let mut state = state();

        pipeline.run_step(&mut state, StepId::Drilling).await;
        assert!(state.save_note(StepId::Drilling, "50 holes"));
        pipeline.run_step(&mut state, StepId::Drilling).await;

        assert_eq!(counters.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.records().count(), 1);
        assert_eq!(state.completed().len(), 1);
        // Last run wins, including dropping the old note.
        assert_eq!(state.record(StepId::Drilling).unwrap().note, None);
    }

    #[tokio::test]
    async fn failed_search_still_counts_as_completed() {
        let provider = PickyProvider {
            fail_on: vec!["coordinates"],
            seen: Mutex::new(vec![]),
        };
        let orchestrator = SearchOrchestrator::new(vec![Box::new(provider)], Duration::from_secs(5));
        let pipeline = ResearchPipeline::new(orchestrator, 2);
        let mut state = state();

        let record = pipeline.run_step(&mut state, StepId::Coordinates).await;

        assert!(!record.outcome.is_ok());
        assert_eq!(
            record.outcome.reason().as_deref(),
            Some("no working search provider configured")
        );
        assert!(state.completed().contains(&StepId::Coordinates));
    }

    #[tokio::test]
    async fn without_providers_every_step_completes_with_an_error() {
        let pipeline = ResearchPipeline::new(
            SearchOrchestrator::new(vec![], Duration::from_secs(1)),
            4,
        );
        let mut state = state();

        pipeline.run_all(&mut state, &SilentProgress).await;

        assert!(state.is_complete());
        assert!(state.records().all(|r| {
            r.outcome
                .failure()
                .is_some_and(SearchFailure::needs_credentials)
        }));
    }

    #[tokio::test]
    async fn run_all_completes_every_step_within_concurrency_limit() {
        let (pipeline, counters) = echo_pipeline(3, Duration::from_millis(20));
        let mut state = state();
        let progress = RecordingProgress::default();

        pipeline.run_all(&mut state, &progress).await;

        assert!(state.is_complete());
        assert_eq!(counters.calls.load(Ordering::SeqCst), 8);
        assert!(counters.peak.load(Ordering::SeqCst) <= 3);
        let steps: Vec<StepId> = state.records().map(|r| r.step).collect();
        assert_eq!(steps, StepId::ALL.to_vec());

        let events = progress.events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| e.starts_with("start")).count(), 8);
        assert_eq!(events.iter().filter(|e| e.starts_with("done")).count(), 8);
    }

    #[tokio::test]
    async fn run_steps_deduplicates() {
        let (pipeline, counters) = echo_pipeline(2, Duration::ZERO);
        let mut state = state();

        pipeline
            .run_steps(
                &mut state,
                &[StepId::Stage, StepId::Stage, StepId::Process],
                &SilentProgress,
            )
            .await;

        assert_eq!(counters.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.completed().len(), 2);
        assert_eq!(state.pending().len(), 6);
    }

    #[test]
    fn is_complete_for_any_insertion_order() {
        let mut orders = vec![StepId::ALL.to_vec()];
        let mut reversed = StepId::ALL.to_vec();
        reversed.reverse();
        orders.push(reversed);
        orders.push(vec![
            StepId::Stage,
            StepId::Location,
            StepId::Process,
            StepId::Coordinates,
            StepId::Competency,
            StepId::Commodity,
            StepId::Resources,
            StepId::Drilling,
        ]);

        for order in orders {
            let mut state = state();
            for (i, step) in order.iter().enumerate() {
                assert!(!state.is_complete());
                state.insert(*step, format!("q{i}"), SearchOutcome::ok(format!("q{i}"), vec![]));
            }
            assert!(state.is_complete());
            assert_eq!(state.completed().len(), StepId::COUNT);
        }
    }

    #[test]
    fn saving_a_note_before_running_is_a_no_op() {
        let mut state = state();
        assert!(!state.save_note(StepId::Resources, "2 Moz"));
        assert!(state.record(StepId::Resources).is_none());
        assert!(state.completed().is_empty());
    }

    #[test]
    fn note_is_attached_to_existing_record() {
        let mut state = state();
        state.insert(StepId::Resources, "q".into(), SearchOutcome::ok("q", vec![]));
        assert!(state.save_note(StepId::Resources, "118.7Mt @ 0.53g/t Au"));
        assert_eq!(
            state.record(StepId::Resources).unwrap().note.as_deref(),
            Some("118.7Mt @ 0.53g/t Au")
        );
    }

    #[test]
    fn clear_keeps_identity() {
        let mut state = state();
        state.insert(StepId::Location, "q".into(), SearchOutcome::ok("q", vec![]));
        state.set_project("Apollo Hill Gold Project");

        state.clear();

        assert_eq!(state.records().count(), 0);
        assert!(state.completed().is_empty());
        assert_eq!(state.identity().company, "Saturn Metals");
        assert_eq!(state.identity().project, "Apollo Hill Gold Project");
    }

    #[tokio::test]
    async fn edited_identity_drives_later_queries() {
        let provider = PickyProvider {
            fail_on: vec![],
            seen: Mutex::new(vec![]),
        };
        let orchestrator = SearchOrchestrator::new(vec![Box::new(provider)], Duration::from_secs(5));
        let pipeline = ResearchPipeline::new(orchestrator, 1);
        let mut state = PipelineState::from_label(&ProjectLabel::new("Saturn Metals Apollo Hill"));

        state.set_identity("Saturn Metals", "Apollo Hill");
        let record = pipeline.run_step(&mut state, StepId::Location).await;

        assert!(record.query.starts_with(r#""Saturn Metals" "Apollo Hill" location"#));
    }
}
