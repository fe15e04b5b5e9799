//! ABG Insights Core Library
//!
//! Session engine for arterial blood gas (ABG) analysis: validates
//! measurements, drives one AI analysis at a time, splits the reply into
//! sections, and keeps an in-memory history.
//!
//! # Architecture
//!
//! ```text
//! Measurement ──► validate ──► Orchestrator ──► AnalysisProvider (AI)
//!                                   │                   │ raw reply
//!                                   │                   ▼
//!                                   │            parse_sections
//!                                   ▼                   │
//!                       Session { current, history, in_flight, error }
//! ```
//!
//! # Core Principle
//!
//! **Nothing raises to the caller.** Rejections and AI failures are recorded
//! on the session (and on the record, for failures).
//!
//! # Modules
//!
//! - [`models`]: Measurement, AnalysisRecord, rule-based assessment
//! - [`history`]: Most-recent-first history of completed analyses
//! - [`session`]: Session state and its shared handle
//! - [`orchestrator`]: Analysis lifecycle and session operations
//! - [`config`]: Runtime configuration
//! - [`logging`]: `tracing` subscriber bootstrap

pub mod config;
pub mod history;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod session;

// Re-export commonly used types
pub use abg_insights_llm::{parse_sections, AnalysisSections};
pub use config::CoreConfig;
pub use history::AnalysisHistory;
pub use models::{
    assess, validate, AcidBaseStatus, AnalysisRecord, AnalysisStatus, Assessment,
    CompensationStatus, Measurement, OxygenationStatus,
};
pub use orchestrator::{
    AnalysisError, AnalysisProvider, GeneratorProvider, Orchestrator, StagedProvider,
};
pub use session::{Session, SessionSnapshot, SessionState};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use abg_insights_llm::{GenerationError, GenerationResult, TextGenerator};
use async_trait::async_trait;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum AbgInsightsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<AnalysisError> for AbgInsightsError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::InvalidMeasurement => AbgInsightsError::InvalidInput(e.to_string()),
            AnalysisError::AlreadyInFlight => AbgInsightsError::Busy(e.to_string()),
            AnalysisError::NoRuntime => AbgInsightsError::ProviderError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AbgInsightsError {
    fn from(e: serde_json::Error) -> Self {
        AbgInsightsError::SerializationError(e.to_string())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for AbgInsightsError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        AbgInsightsError::ProviderError(e.reason)
    }
}

// =========================================================================
// Foreign Reply Generator
// =========================================================================

/// Provider transport implemented by the host app.
///
/// Called off the async runtime on a blocking thread, so it may block.
#[uniffi::export(with_foreign)]
pub trait ReplyGenerator: Send + Sync {
    fn generate(&self, prompt: String) -> Result<String, AbgInsightsError>;
}

/// Bridges a host [`ReplyGenerator`] to [`TextGenerator`].
struct ForeignGenerator {
    inner: Arc<dyn ReplyGenerator>,
}

#[async_trait]
impl TextGenerator for ForeignGenerator {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let inner = Arc::clone(&self.inner);
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || inner.generate(prompt))
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?
            .map_err(|e| match e {
                AbgInsightsError::ProviderError(message) => GenerationError::Provider(message),
                other => GenerationError::Provider(other.to_string()),
            })
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Create a session whose analyses go through the host's generator.
#[uniffi::export]
pub fn create_session(generator: Arc<dyn ReplyGenerator>) -> Arc<AbgInsightsCore> {
    let provider = GeneratorProvider::new(ForeignGenerator { inner: generator });
    AbgInsightsCore::build(Arc::new(provider), &CoreConfig::from_env())
}

/// Create a session that asks for interpretation, conditions and treatment
/// in three separate generator calls.
#[uniffi::export]
pub fn create_staged_session(generator: Arc<dyn ReplyGenerator>) -> Arc<AbgInsightsCore> {
    let provider = StagedProvider::new(ForeignGenerator { inner: generator });
    AbgInsightsCore::build(Arc::new(provider), &CoreConfig::from_env())
}

/// Install the `tracing` subscriber using environment configuration.
#[uniffi::export]
pub fn init_logging_from_env() -> bool {
    logging::init_logging(&CoreConfig::from_env())
}

#[uniffi::export]
pub fn validate_measurement(measurement: FfiMeasurement) -> bool {
    validate(&measurement.into())
}

#[uniffi::export]
pub fn assess_measurement(measurement: FfiMeasurement) -> FfiAssessment {
    assess(&measurement.into()).into()
}

#[uniffi::export]
pub fn parse_analysis_sections(text: String) -> FfiAnalysisSections {
    parse_sections(&text).into()
}

// =========================================================================
// Main API Object
// =========================================================================

/// One analysis session for FFI callers.
#[derive(uniffi::Object)]
pub struct AbgInsightsCore {
    orchestrator: Orchestrator,
}

impl AbgInsightsCore {
    fn build(provider: Arc<dyn AnalysisProvider>, config: &CoreConfig) -> Arc<Self> {
        Arc::new(Self {
            orchestrator: Orchestrator::with_config(Session::new(), provider, config),
        })
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl AbgInsightsCore {
    /// Run one analysis. A provider failure returns a record with `error` set.
    ///
    /// Cancelling the foreign call does not cancel the analysis; its outcome
    /// still lands in the session.
    pub async fn start_analysis(
        &self,
        measurement: FfiMeasurement,
    ) -> Result<FfiAnalysisRecord, AbgInsightsError> {
        let record = self.orchestrator.start_analysis(measurement.into()).await?;
        Ok(record.into())
    }
}

#[uniffi::export]
impl AbgInsightsCore {
    #[uniffi::constructor]
    pub fn new(generator: Arc<dyn ReplyGenerator>) -> Arc<Self> {
        let provider = GeneratorProvider::new(ForeignGenerator { inner: generator });
        Self::build(Arc::new(provider), &CoreConfig::default())
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    pub fn clear_current(&self) {
        self.orchestrator.clear_current();
    }

    pub fn clear_error(&self) {
        self.orchestrator.clear_error();
    }

    pub fn load_from_history(&self, analysis_id: String) -> bool {
        self.orchestrator.load_from_history(&analysis_id)
    }

    pub fn delete_from_history(&self, analysis_id: String) -> bool {
        self.orchestrator.delete_from_history(&analysis_id)
    }

    pub fn clear_history(&self) {
        self.orchestrator.clear_history();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn current(&self) -> Option<FfiAnalysisRecord> {
        self.orchestrator.current().map(|r| r.into())
    }

    /// History, most recent first.
    pub fn history(&self) -> Vec<FfiAnalysisRecord> {
        self.orchestrator
            .history()
            .into_iter()
            .map(|r| r.into())
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.orchestrator.error()
    }

    pub fn snapshot(&self) -> FfiSessionSnapshot {
        self.orchestrator.snapshot().into()
    }

    /// Export history as JSON for host-side persistence.
    pub fn export_history_json(&self) -> Result<String, AbgInsightsError> {
        Ok(self.orchestrator.export_history_json()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe measurement.
#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiMeasurement {
    pub ph: f64,
    pub pco2: f64,
    pub hco3: f64,
    pub pao2: f64,
    pub base_excess: f64,
}

impl From<FfiMeasurement> for Measurement {
    fn from(m: FfiMeasurement) -> Self {
        Measurement::new(m.ph, m.pco2, m.hco3, m.pao2, m.base_excess)
    }
}

impl From<Measurement> for FfiMeasurement {
    fn from(m: Measurement) -> Self {
        Self {
            ph: m.ph,
            pco2: m.pco2,
            hco3: m.hco3,
            pao2: m.pao2,
            base_excess: m.base_excess,
        }
    }
}

/// FFI-safe analysis record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalysisRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub measurement: FfiMeasurement,
    pub interpretation: String,
    pub suggested_conditions: String,
    pub treatment_recommendations: String,
    pub created_at: String,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl From<AnalysisRecord> for FfiAnalysisRecord {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            is_loading: record.is_in_flight(),
            error: record.failure_reason().map(str::to_string),
            id: record.id,
            user_id: record.user_id,
            measurement: record.measurement.into(),
            interpretation: record.interpretation,
            suggested_conditions: record.suggested_conditions,
            treatment_recommendations: record.treatment_recommendations,
            created_at: record.created_at,
        }
    }
}

/// FFI-safe parsed sections.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnalysisSections {
    pub interpretation: String,
    pub suggested_conditions: String,
    pub treatment_recommendations: String,
}

impl From<AnalysisSections> for FfiAnalysisSections {
    fn from(sections: AnalysisSections) -> Self {
        Self {
            interpretation: sections.interpretation,
            suggested_conditions: sections.suggested_conditions,
            treatment_recommendations: sections.treatment_recommendations,
        }
    }
}

/// FFI-safe assessment; statuses are variant names.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssessment {
    pub acid_base: String,
    pub compensation: String,
    pub oxygenation: String,
}

impl From<Assessment> for FfiAssessment {
    fn from(a: Assessment) -> Self {
        Self {
            acid_base: format!("{:?}", a.acid_base),
            compensation: format!("{:?}", a.compensation),
            oxygenation: format!("{:?}", a.oxygenation),
        }
    }
}

/// FFI-safe session snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSessionSnapshot {
    pub current: Option<FfiAnalysisRecord>,
    pub history: Vec<FfiAnalysisRecord>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl From<SessionSnapshot> for FfiSessionSnapshot {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            current: snapshot.current.map(|r| r.into()),
            history: snapshot.history.into_iter().map(|r| r.into()).collect(),
            is_loading: snapshot.is_loading,
            error: snapshot.error,
        }
    }
}
