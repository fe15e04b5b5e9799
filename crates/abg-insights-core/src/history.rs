//! Session history of completed analyses.
//!
//! Most recent first. IDs are unique: prepending a record whose ID is already
//! present replaces the older entry.

use std::collections::VecDeque;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::AnalysisRecord;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct AnalysisHistory {
    records: VecDeque<AnalysisRecord>,
}

impl AnalysisHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records ordered newest first. A repeated ID keeps only
    /// its newest entry.
    pub fn from_records(records: Vec<AnalysisRecord>) -> Self {
        let mut history = Self::new();
        for record in records.into_iter().rev() {
            history.prepend(record);
        }
        history
    }

    /// Insert at the front.
    pub fn prepend(&mut self, record: AnalysisRecord) {
        self.records.retain(|r| r.id != record.id);
        self.records.push_front(record);
    }

    pub fn get(&self, id: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Remove a record by ID. Absent IDs are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<AnalysisRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        self.records.remove(index)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisRecord> {
        self.records.iter()
    }

    /// The `n` most recent records.
    pub fn latest(&self, n: usize) -> Vec<AnalysisRecord> {
        self.records.iter().take(n).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<AnalysisRecord> {
        self.records.iter().cloned().collect()
    }

    /// Export as a JSON array, newest first.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}

impl<'de> Deserialize<'de> for AnalysisHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<AnalysisRecord>::deserialize(deserializer).map(Self::from_records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;

    fn record() -> AnalysisRecord {
        AnalysisRecord::pending(Measurement::new(7.40, 40.0, 24.0, 95.0, 0.0))
    }

    #[test]
    fn test_prepend_most_recent_first() {
        let mut history = AnalysisHistory::new();
        let first = record();
        let second = record();
        history.prepend(first.clone());
        history.prepend(second.clone());

        let ids: Vec<_> = history.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_prepend_same_id_replaces() {
        let mut history = AnalysisHistory::new();
        let original = record();
        history.prepend(original.clone());
        history.prepend(record());

        let mut updated = original.clone();
        updated.interpretation = "revised".into();
        history.prepend(updated);

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(1)[0].interpretation, "revised");
    }

    #[test]
    fn test_remove() {
        let mut history = AnalysisHistory::new();
        let a = record();
        let b = record();
        history.prepend(a.clone());
        history.prepend(b.clone());

        assert_eq!(history.remove(&a.id).map(|r| r.id), Some(a.id.clone()));
        assert!(history.get(&a.id).is_none());
        assert!(history.get(&b.id).is_some());

        // Idempotent
        assert!(history.remove(&a.id).is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_latest_and_clear() {
        let mut history = AnalysisHistory::new();
        for _ in 0..5 {
            history.prepend(record());
        }
        assert_eq!(history.latest(3).len(), 3);
        assert_eq!(history.latest(10).len(), 5);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_to_json_is_array() {
        let mut history = AnalysisHistory::new();
        let r = record();
        history.prepend(r.clone());

        let json = history.to_json().unwrap();
        let parsed: Vec<AnalysisRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![r]);
    }

    #[test]
    fn test_deserialize_keeps_unique_ids() {
        let newer = record();
        let mut older = newer.clone();
        older.interpretation = "stale".into();
        let other = record();

        let json = serde_json::to_string(&vec![newer.clone(), other.clone(), older]).unwrap();
        let history: AnalysisHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(history.to_vec(), vec![newer, other]);
    }

    #[test]
    fn test_from_records_preserves_order() {
        let a = record();
        let b = record();
        let history = AnalysisHistory::from_records(vec![a.clone(), b.clone()]);

        assert_eq!(history.latest(2), vec![a, b]);
    }
}
