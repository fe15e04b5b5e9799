//! Analysis orchestrator.
//!
//! Drives one request at a time per session through
//! `Idle -> Pending -> {Completed, Failed} -> Idle`:
//!
//! ```text
//! start_analysis(measurement)
//!        │ validate, reject if in flight
//!        ▼
//!   pending record ──► current, in_flight = true
//!        │
//!        ▼  AnalysisProvider::perform_full_analysis (only await point)
//!   ┌────┴─────────────┐
//!   │ Ok(reply)        │ Err(e)
//!   ▼                  ▼
//! parse_sections     failed record ──► current, error
//! completed record ──► current, history front
//!        │                  │
//!        └──── in_flight = false
//! ```
//!
//! Nothing here retries or times out. A provider that never resolves leaves
//! the session in flight. Each request runs on its own tokio task, so a
//! caller that stops awaiting does not cancel it. If the task is dropped or
//! panics before the provider resolves, the request settles as failed.

use std::sync::Arc;

use abg_insights_llm::{
    make_conditions_prompt, make_full_analysis_prompt, make_interpretation_prompt,
    make_treatment_prompt, parse_sections, BloodGasValues, GenerationError, TextGenerator,
    CONDITIONS_HEADING, INTERPRETATION_HEADING, TREATMENT_HEADING,
};
use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::CoreConfig;
use crate::models::{AnalysisRecord, Measurement};
use crate::session::{Session, SessionSnapshot};

/// Requests the orchestrator refuses before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid ABG values. Please check your inputs.")]
    InvalidMeasurement,

    #[error("An analysis is already in progress")]
    AlreadyInFlight,

    #[error("No async runtime available to run the analysis")]
    NoRuntime,
}

/// The AI collaborator: turns a measurement into one reply with three
/// labeled sections.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn perform_full_analysis(&self, measurement: &Measurement) -> anyhow::Result<String>;
}

/// [`AnalysisProvider`] backed by any [`TextGenerator`].
pub struct GeneratorProvider<G> {
    generator: G,
}

impl<G: TextGenerator> GeneratorProvider<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl<G: TextGenerator> AnalysisProvider for GeneratorProvider<G> {
    async fn perform_full_analysis(&self, measurement: &Measurement) -> anyhow::Result<String> {
        let prompt = make_full_analysis_prompt(&BloodGasValues::from(measurement));
        let reply = self
            .generator
            .generate(&prompt)
            .await
            .context("Failed to perform full analysis")?;

        if reply.trim().is_empty() {
            return Err(GenerationError::EmptyResponse).context("Failed to perform full analysis");
        }
        Ok(reply)
    }
}

/// [`AnalysisProvider`] that asks for each section in its own call.
///
/// The interpretation feeds the conditions prompt, and both feed the
/// treatment prompt. The answers are joined under the usual headings.
pub struct StagedProvider<G> {
    generator: G,
}

impl<G: TextGenerator> StagedProvider<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    async fn ask(&self, prompt: String, stage: &'static str) -> anyhow::Result<String> {
        let reply = self.generator.generate(&prompt).await.context(stage)?;
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(GenerationError::EmptyResponse).context(stage);
        }
        Ok(reply.to_string())
    }
}

#[async_trait]
impl<G: TextGenerator> AnalysisProvider for StagedProvider<G> {
    async fn perform_full_analysis(&self, measurement: &Measurement) -> anyhow::Result<String> {
        let values = BloodGasValues::from(measurement);

        let interpretation = self
            .ask(make_interpretation_prompt(&values), "Failed to interpret ABG")
            .await?;
        let conditions = self
            .ask(
                make_conditions_prompt(&values, &interpretation),
                "Failed to suggest conditions",
            )
            .await?;
        let treatment = self
            .ask(
                make_treatment_prompt(&values, &interpretation, &conditions),
                "Failed to recommend treatments",
            )
            .await?;

        Ok(format!(
            "## {}\n{}\n\n## {}\n{}\n\n## {}\n{}",
            INTERPRETATION_HEADING,
            interpretation,
            CONDITIONS_HEADING,
            conditions,
            TREATMENT_HEADING,
            treatment
        ))
    }
}

/// Serializes all mutation of one [`Session`].
#[derive(Clone)]
pub struct Orchestrator {
    session: Session,
    provider: Arc<dyn AnalysisProvider>,
    failure_message: Arc<str>,
}

impl Orchestrator {
    pub fn new(session: Session, provider: Arc<dyn AnalysisProvider>) -> Self {
        Self::with_config(session, provider, &CoreConfig::default())
    }

    pub fn with_config(
        session: Session,
        provider: Arc<dyn AnalysisProvider>,
        config: &CoreConfig,
    ) -> Self {
        Self {
            session,
            provider,
            failure_message: Arc::from(config.failure_message.as_str()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Run one analysis to completion.
    ///
    /// Rejections are returned as `Err` and stored as the session error. A
    /// provider failure is not an `Err`: the returned record is `Failed`.
    ///
    /// On a tokio runtime the request runs on its own task, and dropping
    /// this future leaves it running. Elsewhere it is driven inline.
    pub async fn start_analysis(
        &self,
        measurement: Measurement,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let Ok(runtime) = Handle::try_current() else {
            let pending = self.begin(measurement)?;
            return Ok(self.drive(pending).await);
        };

        let pending = self.begin(measurement)?;
        let fallback = pending.clone();
        let this = self.clone();
        match runtime.spawn(async move { this.drive(pending).await }).await {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::error!(analysis_id = %fallback.id, error = %e, "Analysis task died");
                Ok(fallback.fail(self.failure_message.to_string()))
            }
        }
    }

    /// Accept or reject now, then drive the request on the tokio runtime.
    ///
    /// Dropping the handle does not cancel the request; its outcome is
    /// still applied to the session. Outside a runtime the request is
    /// rejected with [`AnalysisError::NoRuntime`].
    pub fn spawn_analysis(
        &self,
        measurement: Measurement,
    ) -> Result<JoinHandle<AnalysisRecord>, AnalysisError> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                let error = AnalysisError::NoRuntime;
                tracing::warn!("Rejected analysis: not on a tokio runtime");
                self.session.with(|state| state.error = Some(error.to_string()));
                return Err(error);
            }
        };

        let pending = self.begin(measurement)?;
        let this = self.clone();
        Ok(runtime.spawn(async move { this.drive(pending).await }))
    }

    fn begin(&self, measurement: Measurement) -> Result<AnalysisRecord, AnalysisError> {
        self.session.with(|state| {
            if !measurement.is_valid() {
                let error = AnalysisError::InvalidMeasurement;
                tracing::warn!(
                    fields = ?measurement.out_of_range_fields(),
                    "Rejected analysis: values out of range"
                );
                state.error = Some(error.to_string());
                return Err(error);
            }
            if state.in_flight {
                let error = AnalysisError::AlreadyInFlight;
                tracing::warn!("Rejected analysis: another request is in flight");
                state.error = Some(error.to_string());
                return Err(error);
            }

            let pending = AnalysisRecord::pending(measurement);
            tracing::info!(analysis_id = %pending.id, "Analysis started");
            state.current = Some(pending.clone());
            state.in_flight = true;
            state.error = None;
            Ok(pending)
        })
    }

    async fn drive(&self, pending: AnalysisRecord) -> AnalysisRecord {
        let measurement = pending.measurement;
        let guard = PendingGuard {
            orchestrator: self,
            pending: Some(pending.clone()),
        };
        let outcome = self.provider.perform_full_analysis(&measurement).await;
        guard.disarm();

        match outcome {
            Ok(reply) => {
                let sections = parse_sections(&reply);
                let complete = sections.is_complete();
                let record = pending.complete(sections);

                self.session.with(|state| {
                    state.current = Some(record.clone());
                    state.history.prepend(record.clone());
                    state.in_flight = false;
                    tracing::info!(
                        analysis_id = %record.id,
                        history_len = state.history.len(),
                        all_sections = complete,
                        "Analysis completed"
                    );
                });
                record
            }
            Err(e) => {
                let reason = self.failure_reason(&e);
                let record = pending.fail(reason.clone());

                self.settle_failure(&record);
                tracing::warn!(analysis_id = %record.id, error = %reason, "Analysis failed");
                record
            }
        }
    }

    fn settle_failure(&self, record: &AnalysisRecord) {
        self.session.with(|state| {
            state.current = Some(record.clone());
            state.error = record.failure_reason().map(str::to_string);
            state.in_flight = false;
        });
    }

    fn failure_reason(&self, error: &anyhow::Error) -> String {
        let message = format!("{:#}", error);
        if message.trim().is_empty() {
            self.failure_message.to_string()
        } else {
            message
        }
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    pub fn clear_current(&self) {
        self.session.with(|state| state.clear_current());
    }

    pub fn clear_error(&self) {
        self.session.with(|state| state.clear_error());
    }

    /// Make a history record current. Unknown IDs leave current unchanged.
    pub fn load_from_history(&self, id: &str) -> bool {
        let found = self.session.with(|state| state.load_from_history(id));
        if !found {
            tracing::debug!(analysis_id = id, "History lookup missed");
        }
        found
    }

    /// Delete a history record. Returns whether anything was removed.
    pub fn delete_from_history(&self, id: &str) -> bool {
        self.session
            .with(|state| state.delete_from_history(id))
            .is_some()
    }

    pub fn clear_history(&self) {
        self.session.with(|state| state.clear_history());
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn current(&self) -> Option<AnalysisRecord> {
        self.session.with(|state| state.current.clone())
    }

    pub fn history(&self) -> Vec<AnalysisRecord> {
        self.session.with(|state| state.history.to_vec())
    }

    pub fn is_loading(&self) -> bool {
        self.session.with(|state| state.in_flight)
    }

    pub fn error(&self) -> Option<String> {
        self.session.with(|state| state.error.clone())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn export_history_json(&self) -> Result<String, serde_json::Error> {
        self.session.export_history_json()
    }
}

/// Settles a request whose provider call is dropped before it resolves,
/// by cancellation or by a panic unwinding through it.
struct PendingGuard<'a> {
    orchestrator: &'a Orchestrator,
    pending: Option<AnalysisRecord>,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.pending = None;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            let record = pending.fail(self.orchestrator.failure_message.to_string());
            tracing::warn!(
                analysis_id = %record.id,
                "Analysis dropped before the provider resolved"
            );
            self.orchestrator.settle_failure(&record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_FAILURE_MESSAGE;
    use abg_insights_llm::{MockGenerator, CONDITIONS_FALLBACK, TREATMENT_FALLBACK};
    use tokio::sync::oneshot;

    const REPLY: &str = "## INTERPRETATION\nRespiratory acidosis\n## SUGGESTED CONDITIONS\nCOPD\n## TREATMENT RECOMMENDATIONS\nNIV";

    fn valid() -> Measurement {
        Measurement::new(7.25, 60.0, 24.0, 70.0, -2.0)
    }

    fn orchestrator_with(generator: MockGenerator) -> Orchestrator {
        Orchestrator::new(
            Session::new(),
            Arc::new(GeneratorProvider::new(generator)),
        )
    }

    /// Provider that waits for the test to release it.
    struct GatedProvider {
        gate: tokio::sync::Mutex<Option<oneshot::Receiver<anyhow::Result<String>>>>,
    }

    impl GatedProvider {
        fn new() -> (Self, oneshot::Sender<anyhow::Result<String>>) {
            let (tx, rx) = oneshot::channel();
            (
                Self {
                    gate: tokio::sync::Mutex::new(Some(rx)),
                },
                tx,
            )
        }
    }

    #[async_trait]
    impl AnalysisProvider for GatedProvider {
        async fn perform_full_analysis(&self, _: &Measurement) -> anyhow::Result<String> {
            let rx = self.gate.lock().await.take();
            match rx {
                Some(rx) => rx.await.unwrap_or_else(|_| Err(anyhow::anyhow!("gate dropped"))),
                None => Err(anyhow::anyhow!("gate already used")),
            }
        }
    }

    #[tokio::test]
    async fn test_success_completes_and_prepends() {
        let orchestrator = orchestrator_with(MockGenerator::with_reply(REPLY));

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        assert!(record.is_completed());
        assert_eq!(record.interpretation, "Respiratory acidosis");
        assert_eq!(record.suggested_conditions, "COPD");
        assert_eq!(record.treatment_recommendations, "NIV");

        let snapshot = orchestrator.snapshot();
        assert_eq!(snapshot.current, Some(record.clone()));
        assert_eq!(snapshot.history, vec![record]);
        assert!(!snapshot.is_loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_prompt_carries_measurement() {
        let generator = Arc::new(MockGenerator::with_reply(REPLY));
        let orchestrator = Orchestrator::new(
            Session::new(),
            Arc::new(GeneratorProvider::new(generator.clone())),
        );

        orchestrator.start_analysis(valid()).await.unwrap();

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- pH: 7.25"));
        assert!(prompts[0].contains("## SUGGESTED CONDITIONS"));
    }

    #[tokio::test]
    async fn test_partial_reply_uses_fallbacks() {
        let orchestrator =
            orchestrator_with(MockGenerator::with_reply("## INTERPRETATION\nNormal"));

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        assert!(record.is_completed());
        assert_eq!(record.interpretation, "Normal");
        assert_eq!(record.suggested_conditions, CONDITIONS_FALLBACK);
        assert_eq!(record.treatment_recommendations, TREATMENT_FALLBACK);
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_not_in_history() {
        let orchestrator = orchestrator_with(MockGenerator::with_failure(
            GenerationError::Provider("quota exceeded".into()),
        ));

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        let reason = record.failure_reason().unwrap();
        assert!(reason.contains("Failed to perform full analysis"));
        assert!(reason.contains("quota exceeded"));
        assert!(record.interpretation.is_empty());

        assert_eq!(orchestrator.current(), Some(record.clone()));
        assert_eq!(orchestrator.error().as_deref(), Some(reason));
        assert!(orchestrator.history().is_empty());
        assert!(!orchestrator.is_loading());
    }

    #[tokio::test]
    async fn test_blank_reply_fails() {
        let orchestrator = orchestrator_with(MockGenerator::with_reply("   \n"));

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        assert!(record.failure_reason().unwrap().contains("No response generated"));
        assert!(orchestrator.history().is_empty());
    }

    #[tokio::test]
    async fn test_empty_error_uses_configured_fallback() {
        struct Silent;

        #[async_trait]
        impl AnalysisProvider for Silent {
            async fn perform_full_analysis(&self, _: &Measurement) -> anyhow::Result<String> {
                Err(anyhow::anyhow!(""))
            }
        }

        let config = CoreConfig {
            failure_message: "Try again later".into(),
            ..CoreConfig::default()
        };
        let orchestrator = Orchestrator::with_config(Session::new(), Arc::new(Silent), &config);

        let record = orchestrator.start_analysis(valid()).await.unwrap();
        assert_eq!(record.failure_reason(), Some("Try again later"));
    }

    #[tokio::test]
    async fn test_invalid_measurement_rejected() {
        let generator = Arc::new(MockGenerator::with_reply(REPLY));
        let orchestrator = Orchestrator::new(
            Session::new(),
            Arc::new(GeneratorProvider::new(generator.clone())),
        );
        let invalid = Measurement { ph: 6.79, ..valid() };

        let result = orchestrator.start_analysis(invalid).await;

        assert_eq!(result, Err(AnalysisError::InvalidMeasurement));
        let snapshot = orchestrator.snapshot();
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Invalid ABG values. Please check your inputs.")
        );
        assert!(snapshot.current.is_none());
        assert!(!snapshot.is_loading);
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_second_request_rejected_while_in_flight() {
        let (provider, release) = GatedProvider::new();
        let orchestrator = Orchestrator::new(Session::new(), Arc::new(provider));

        let handle = orchestrator.spawn_analysis(valid()).unwrap();
        let pending = orchestrator.current().unwrap();
        assert!(pending.is_in_flight());
        assert!(orchestrator.is_loading());

        let second = orchestrator.start_analysis(valid()).await;
        assert_eq!(second, Err(AnalysisError::AlreadyInFlight));
        assert_eq!(orchestrator.current(), Some(pending.clone()));
        assert!(orchestrator.history().is_empty());
        assert_eq!(
            orchestrator.error().as_deref(),
            Some("An analysis is already in progress")
        );

        release.send(Ok(REPLY.to_string())).unwrap();
        let record = handle.await.unwrap();

        assert_eq!(record.id, pending.id);
        assert!(record.is_completed());
        assert!(!orchestrator.is_loading());
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_other_operations_available_while_in_flight() {
        let (provider, release) = GatedProvider::new();
        let orchestrator = Orchestrator::new(Session::new(), Arc::new(provider));

        let handle = orchestrator.spawn_analysis(valid()).unwrap();

        orchestrator.clear_current();
        orchestrator.clear_error();
        orchestrator.clear_history();
        assert!(!orchestrator.load_from_history("missing"));
        assert!(!orchestrator.delete_from_history("missing"));
        assert!(orchestrator.current().is_none());
        assert!(orchestrator.is_loading());

        // Late completion still lands after the caller cleared current.
        release.send(Ok(REPLY.to_string())).unwrap();
        let record = handle.await.unwrap();

        assert_eq!(orchestrator.current(), Some(record.clone()));
        assert_eq!(orchestrator.history(), vec![record]);
        assert!(!orchestrator.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_handle_still_applies() {
        let (provider, release) = GatedProvider::new();
        let orchestrator = Orchestrator::new(Session::new(), Arc::new(provider));

        drop(orchestrator.spawn_analysis(valid()).unwrap());
        release.send(Ok(REPLY.to_string())).unwrap();

        for _ in 0..100 {
            if !orchestrator.is_loading() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!orchestrator.is_loading());
        assert_eq!(orchestrator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_start_still_applies() {
        let (provider, release) = GatedProvider::new();
        let orchestrator = Orchestrator::new(Session::new(), Arc::new(provider));

        tokio::select! {
            biased;
            _ = orchestrator.start_analysis(valid()) => panic!("provider is gated"),
            _ = async {} => {}
        }
        assert!(orchestrator.is_loading());

        release.send(Ok(REPLY.to_string())).unwrap();
        for _ in 0..100 {
            if !orchestrator.is_loading() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(!orchestrator.is_loading());
        let record = orchestrator.current().unwrap();
        assert!(record.is_completed());
        assert_eq!(orchestrator.history(), vec![record]);

        // Not locked out: the gate is spent, so this one fails normally.
        let next = orchestrator.start_analysis(valid()).await.unwrap();
        assert!(next.failure_reason().unwrap().contains("gate already used"));
    }

    #[tokio::test]
    async fn test_dropped_drive_settles_as_failed() {
        let (provider, _release) = GatedProvider::new();
        let orchestrator = Orchestrator::new(Session::new(), Arc::new(provider));
        let pending = orchestrator.begin(valid()).unwrap();

        tokio::select! {
            biased;
            _ = orchestrator.drive(pending.clone()) => panic!("provider is gated"),
            _ = async {} => {}
        }

        assert!(!orchestrator.is_loading());
        let current = orchestrator.current().unwrap();
        assert_eq!(current.id, pending.id);
        assert_eq!(current.failure_reason(), Some(DEFAULT_FAILURE_MESSAGE));
        assert_eq!(orchestrator.error().as_deref(), Some(DEFAULT_FAILURE_MESSAGE));
        assert!(orchestrator.history().is_empty());
    }

    #[tokio::test]
    async fn test_provider_panic_settles_as_failed() {
        struct Panicking;

        #[async_trait]
        impl AnalysisProvider for Panicking {
            async fn perform_full_analysis(&self, _: &Measurement) -> anyhow::Result<String> {
                panic!("provider bug")
            }
        }

        let orchestrator = Orchestrator::new(Session::new(), Arc::new(Panicking));

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        assert_eq!(record.failure_reason(), Some(DEFAULT_FAILURE_MESSAGE));
        assert_eq!(orchestrator.current(), Some(record));
        assert!(!orchestrator.is_loading());
        assert!(orchestrator.history().is_empty());
    }

    #[test]
    fn test_spawn_outside_runtime_rejected() {
        let orchestrator = orchestrator_with(MockGenerator::with_reply(REPLY));

        let result = orchestrator.spawn_analysis(valid());

        assert!(matches!(result, Err(AnalysisError::NoRuntime)));
        let snapshot = orchestrator.snapshot();
        assert!(snapshot.current.is_none());
        assert!(!snapshot.is_loading);
        assert_eq!(
            snapshot.error.as_deref(),
            Some("No async runtime available to run the analysis")
        );
    }

    #[tokio::test]
    async fn test_staged_provider_feeds_answers_forward() {
        let generator = Arc::new(MockGenerator::with_reply("Respiratory acidosis\n"));
        generator.push_reply("COPD exacerbation");
        generator.push_reply("Controlled oxygen");
        let orchestrator = Orchestrator::new(
            Session::new(),
            Arc::new(StagedProvider::new(generator.clone())),
        );

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        assert_eq!(record.interpretation, "Respiratory acidosis");
        assert_eq!(record.suggested_conditions, "COPD exacerbation");
        assert_eq!(record.treatment_recommendations, "Controlled oxygen");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[1].contains("Interpretation: Respiratory acidosis"));
        assert!(prompts[2].contains("Suggested Conditions: COPD exacerbation"));
    }

    #[tokio::test]
    async fn test_staged_provider_stops_at_failed_stage() {
        let generator = Arc::new(MockGenerator::with_reply("Metabolic acidosis"));
        generator.push_reply("  ");
        let orchestrator = Orchestrator::new(
            Session::new(),
            Arc::new(StagedProvider::new(generator.clone())),
        );

        let record = orchestrator.start_analysis(valid()).await.unwrap();

        let reason = record.failure_reason().unwrap();
        assert!(reason.contains("Failed to suggest conditions"));
        assert!(reason.contains("No response generated"));
        assert_eq!(generator.prompts().len(), 2);
        assert!(orchestrator.history().is_empty());
    }

    #[tokio::test]
    async fn test_resubmit_after_failure() {
        let generator = MockGenerator::with_failure(GenerationError::Unavailable("offline".into()));
        generator.push_reply(REPLY);
        let orchestrator = orchestrator_with(generator);

        let failed = orchestrator.start_analysis(valid()).await.unwrap();
        assert!(failed.failure_reason().is_some());

        let completed = orchestrator.start_analysis(valid()).await.unwrap();
        assert!(completed.is_completed());
        assert_ne!(completed.id, failed.id);
        assert!(orchestrator.error().is_none());
        assert_eq!(orchestrator.history(), vec![completed]);
    }

    #[tokio::test]
    async fn test_history_operations() {
        let generator = MockGenerator::with_reply(REPLY);
        generator.push_reply(REPLY);
        let orchestrator = orchestrator_with(generator);

        let first = orchestrator.start_analysis(valid()).await.unwrap();
        let second = orchestrator.start_analysis(valid()).await.unwrap();
        assert_eq!(orchestrator.history(), vec![second.clone(), first.clone()]);

        assert!(orchestrator.load_from_history(&first.id));
        assert_eq!(orchestrator.current().map(|r| r.id), Some(first.id.clone()));

        assert!(orchestrator.delete_from_history(&first.id));
        assert!(orchestrator.current().is_none());
        assert_eq!(orchestrator.history(), vec![second]);

        orchestrator.clear_history();
        assert!(orchestrator.history().is_empty());
    }
}
