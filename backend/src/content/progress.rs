//! Learning progress summary

use crate::db::ProgressRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Aggregated view of a learner's quiz submissions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Every submission, newest first
    pub attempts: Vec<ProgressRecord>,
    /// Distinct lessons passed at least once
    pub lessons_completed: usize,
    /// Lessons in the catalog
    pub total_lessons: usize,
    /// `lessons_completed` as a rounded percentage of `total_lessons`
    pub progress_percent: u32,
    /// Best score per lesson id
    pub best_scores: BTreeMap<String, i64>,
}

impl ProgressSummary {
    /// Summarize submissions (expected newest first) against a catalog size
    pub fn from_records(attempts: Vec<ProgressRecord>, total_lessons: usize) -> Self {
        let completed: BTreeSet<&str> = attempts
            .iter()
            .filter(|a| a.passed)
            .map(|a| a.lesson_id.as_str())
            .collect();
        let lessons_completed = completed.len();

        let mut best_scores: BTreeMap<String, i64> = BTreeMap::new();
        for attempt in &attempts {
            best_scores
                .entry(attempt.lesson_id.clone())
                .and_modify(|best| *best = (*best).max(attempt.score))
                .or_insert(attempt.score);
        }

        let progress_percent = if total_lessons == 0 {
            0
        } else {
            (100.0 * lessons_completed as f64 / total_lessons as f64).round() as u32
        };

        Self {
            attempts,
            lessons_completed,
            total_lessons,
            progress_percent,
            best_scores,
        }
    }
}
