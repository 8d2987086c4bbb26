//! Bookkeeping of dispatched tasks for the status endpoint.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::task::TaskState;

const MAX_FINISHED: usize = 100;
const RECENT_SHOWN: usize = 20;

/// A task that has been submitted and not yet finished.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveTask {
    pub id: String,
    pub operation: String,
    pub state: TaskState,
    pub submitted_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}

/// A task that reached `Completed` or `Failed`.
#[derive(Debug, Clone, Serialize)]
pub struct FinishedTask {
    pub id: String,
    pub operation: String,
    pub state: TaskState,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub error_message: Option<String>,
}

/// Snapshot returned by [`TaskLedger::status`].
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatus {
    pub active: Vec<ActiveTask>,
    pub recent: Vec<FinishedTask>,
    pub total_finished: usize,
}

/// Active tasks plus the most recent finished ones.
pub struct TaskLedger {
    active: Mutex<HashMap<String, ActiveTask>>,
    finished: Mutex<VecDeque<FinishedTask>>,
    max_finished: usize,
}

impl Default for TaskLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskLedger {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            finished: Mutex::new(VecDeque::new()),
            max_finished: MAX_FINISHED,
        }
    }

    pub async fn submit(&self, id: &str, operation: &str) {
        let task = ActiveTask {
            id: id.to_string(),
            operation: operation.to_string(),
            state: TaskState::Submitted,
            submitted_at: Utc::now(),
            started_at: None,
        };
        self.active.lock().await.insert(id.to_string(), task);
    }

    pub async fn mark_running(&self, id: &str) {
        if let Some(task) = self.active.lock().await.get_mut(id) {
            task.state = TaskState::Running;
            task.started_at = Some(Utc::now());
        }
    }

    /// Move a task to the finished list. Unknown ids are ignored.
    pub async fn finish(&self, id: &str, error_message: Option<String>) {
        let Some(task) = self.active.lock().await.remove(id) else {
            return;
        };

        let finished_at = Utc::now();
        let duration_ms = (finished_at - task.submitted_at)
            .num_milliseconds()
            .max(0) as u64;
        let state = if error_message.is_some() {
            TaskState::Failed
        } else {
            TaskState::Completed
        };

        let mut finished = self.finished.lock().await;
        finished.push_front(FinishedTask {
            id: task.id,
            operation: task.operation,
            state,
            submitted_at: task.submitted_at,
            finished_at,
            duration_ms,
            error_message,
        });

        while finished.len() > self.max_finished {
            finished.pop_back();
        }
    }

    pub async fn status(&self) -> LedgerStatus {
        let active = self.active.lock().await;
        let finished = self.finished.lock().await;

        LedgerStatus {
            active: active.values().cloned().collect(),
            recent: finished.iter().take(RECENT_SHOWN).cloned().collect(),
            total_finished: finished.len(),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}
