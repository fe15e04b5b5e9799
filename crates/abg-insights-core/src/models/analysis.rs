//! Analysis records and their lifecycle.

use abg_insights_llm::AnalysisSections;
use serde::{Deserialize, Serialize};

use super::measurement::Measurement;

/// Lifecycle state of an analysis record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AnalysisStatus {
    /// Request accepted, awaiting the AI reply
    Pending,
    /// Reply received and split into sections
    Completed,
    /// AI call failed
    Failed { reason: String },
}

/// One analysis attempt: input, status, and interpreted text.
///
/// Created pending, then transitions exactly once to completed or failed.
/// The transitions consume the pending record, so a finished record is
/// never rewritten in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    /// Unique analysis ID, assigned at creation
    pub id: String,
    /// Owning user, unset until an identity system exists
    pub user_id: Option<String>,
    /// Input the analysis was computed from
    pub measurement: Measurement,
    pub interpretation: String,
    pub suggested_conditions: String,
    pub treatment_recommendations: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    pub status: AnalysisStatus,
}

impl AnalysisRecord {
    /// Create a pending record with empty text fields.
    pub fn pending(measurement: Measurement) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            measurement,
            interpretation: String::new(),
            suggested_conditions: String::new(),
            treatment_recommendations: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            status: AnalysisStatus::Pending,
        }
    }

    /// Pending -> Completed, keeping the same ID.
    pub(crate) fn complete(self, sections: AnalysisSections) -> Self {
        debug_assert!(self.is_in_flight(), "only pending records complete");
        Self {
            interpretation: sections.interpretation,
            suggested_conditions: sections.suggested_conditions,
            treatment_recommendations: sections.treatment_recommendations,
            status: AnalysisStatus::Completed,
            ..self
        }
    }

    /// Pending -> Failed. Text fields keep whatever they held.
    pub(crate) fn fail(self, reason: String) -> Self {
        debug_assert!(self.is_in_flight(), "only pending records fail");
        Self {
            status: AnalysisStatus::Failed { reason },
            ..self
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.status, AnalysisStatus::Pending)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, AnalysisStatus::Completed)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            AnalysisStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}
