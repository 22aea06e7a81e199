//! Practice progress and attempt history
//!
//! Two records track learning state: a chronological attempt history and
//! per-task aggregates derived from it. Both are rewritten wholesale on
//! every submission, matching the rest of the store.

use std::collections::HashMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::bank::model::TaskType;

use super::{KeyValueStore, StoreError, keys, load_record, save_record};

/// Why a speaking attempt ended without a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptFailure {
    NoSpeech,
    Silence,
}

/// One scored submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub question_id: String,
    pub task: TaskType,
    pub points: u32,
    pub max: u32,
    /// Unix timestamp of the submission
    pub taken_at: i64,
    /// Reaction time for reflex speaking tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_ms: Option<u64>,
    /// Terminal failure for speaking tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<AttemptFailure>,
}

impl AttemptRecord {
    pub fn new(question_id: impl Into<String>, task: TaskType, points: u32, max: u32) -> Self {
        Self {
            question_id: question_id.into(),
            task,
            points,
            max,
            taken_at: unix_now(),
            reaction_ms: None,
            failure: None,
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}

/// Oldest entries are dropped past this point
const MAX_HISTORY: usize = 1000;

/// Chronological attempt history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub attempts: Vec<AttemptRecord>,
}

impl History {
    pub fn record(&mut self, attempt: AttemptRecord) {
        if self.attempts.len() >= MAX_HISTORY {
            self.attempts.remove(0);
        }
        self.attempts.push(attempt);
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}

/// Aggregate stats for one task type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub attempts: u32,
    pub total_points: u32,
    pub total_max: u32,
    pub best_points: u32,
    pub last_taken_at: i64,
}

impl TaskStats {
    /// Lifetime accuracy in percent
    pub fn accuracy(&self) -> Option<u8> {
        if self.total_max == 0 {
            return None;
        }
        Some(((self.total_points * 100) / self.total_max).min(100) as u8)
    }
}

/// Per-task practice progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub tasks: HashMap<TaskType, TaskStats>,
}

impl Progress {
    /// Fold one attempt into the aggregates
    pub fn record(&mut self, attempt: &AttemptRecord) {
        let stats = self.tasks.entry(attempt.task).or_default();
        stats.attempts += 1;
        stats.total_points += attempt.points;
        stats.total_max += attempt.max;
        stats.best_points = stats.best_points.max(attempt.points);
        stats.last_taken_at = attempt.taken_at;
    }

    pub fn stats(&self, task: TaskType) -> Option<&TaskStats> {
        self.tasks.get(&task)
    }

    /// Task types with accuracy under 60%, weakest first
    pub fn weak_tasks(&self) -> Vec<(TaskType, u8)> {
        let mut weak: Vec<(TaskType, u8)> = self
            .tasks
            .iter()
            .filter_map(|(task, stats)| {
                stats.accuracy().filter(|&acc| acc < 60).map(|acc| (*task, acc))
            })
            .collect();
        weak.sort_by_key(|(_, acc)| *acc);
        weak
    }
}

/// Load history and progress, defaulting to empty records
pub fn load(store: &dyn KeyValueStore) -> Result<(History, Progress), StoreError> {
    let history = load_record(store, keys::HISTORY)?.unwrap_or_default();
    let progress = load_record(store, keys::PROGRESS)?.unwrap_or_default();
    Ok((history, progress))
}

/// Append an attempt to both records and persist them
pub fn record_attempt(
    store: &mut dyn KeyValueStore,
    history: &mut History,
    progress: &mut Progress,
    attempt: AttemptRecord,
) -> Result<(), StoreError> {
    progress.record(&attempt);
    history.record(attempt);
    save_record(store, keys::HISTORY, history)?;
    save_record(store, keys::PROGRESS, progress)?;
    Ok(())
}

/// Clear both records
pub fn reset(store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(keys::HISTORY)?;
    store.remove(keys::PROGRESS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn record_attempt_updates_both_records() {
        let mut store = MemoryStore::new();
        let mut history = History::default();
        let mut progress = Progress::default();

        record_attempt(
            &mut store,
            &mut history,
            &mut progress,
            AttemptRecord::new("q1", TaskType::Dictation, 4, 5),
        )
        .unwrap();

        assert_eq!(history.len(), 1);
        let stats = progress.stats(TaskType::Dictation).unwrap();
        assert_eq!(stats.attempts, 1);
        assert_eq!(stats.accuracy(), Some(80));

        let (reloaded_history, reloaded_progress) = load(&store).unwrap();
        assert_eq!(reloaded_history, history);
        assert_eq!(reloaded_progress, progress);
    }

    #[test]
    fn accuracy_is_none_without_attempts() {
        assert_eq!(TaskStats::default().accuracy(), None);
    }

    #[test]
    fn weak_tasks_sorts_lowest_first() {
        let mut progress = Progress::default();
        progress.record(&AttemptRecord::new("q1", TaskType::Reorder, 1, 4));
        progress.record(&AttemptRecord::new("q2", TaskType::FillBlanks, 2, 4));
        progress.record(&AttemptRecord::new("q3", TaskType::ChoiceSingle, 1, 1));

        let weak = progress.weak_tasks();
        assert_eq!(weak.len(), 2);
        assert_eq!(weak[0].0, TaskType::Reorder);
    }

    #[test]
    fn history_is_capped() {
        let mut history = History::default();
        for i in 0..(MAX_HISTORY + 5) {
            history.record(AttemptRecord::new(format!("q{i}"), TaskType::Dictation, 1, 1));
        }
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.attempts[0].question_id, "q5");
    }

    #[test]
    fn reset_clears_persisted_records() {
        let mut store = MemoryStore::new();
        let mut history = History::default();
        let mut progress = Progress::default();
        record_attempt(
            &mut store,
            &mut history,
            &mut progress,
            AttemptRecord::new("q1", TaskType::Dictation, 1, 5),
        )
        .unwrap();

        reset(&mut store).unwrap();
        let (h, p) = load(&store).unwrap();
        assert!(h.is_empty());
        assert!(p.tasks.is_empty());
    }
}
