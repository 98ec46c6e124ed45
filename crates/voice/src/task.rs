//! Task list persisted as a JSON array.
//!
//! The whole file is rewritten on every change.

use chrono::NaiveDateTime;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default task file, relative to the working directory.
pub const DEFAULT_TASKS_FILE: &str = "tasks.json";

/// A noted task, optionally with a reminder time (local, no offset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remind_at: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub notified: bool,
}

impl Task {
    pub fn new(description: impl Into<String>, remind_at: Option<NaiveDateTime>) -> Self {
        Self {
            description: description.into(),
            remind_at,
            notified: false,
        }
    }

    /// A reminder is due when its time has passed and it has not fired yet.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        !self.notified && self.remind_at.is_some_and(|at| at <= now)
    }
}

/// In-memory task list backed by a JSON file.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Load tasks from `path`; a missing file is an empty list.
    pub fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let tasks = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                AppError::Task(format!("Failed to read task file {:?}: {}", path, e))
            })?;
            serde_json::from_str(&content).map_err(|e| {
                AppError::Task(format!("Failed to parse task file {:?}: {}", path, e))
            })?
        } else {
            Vec::new()
        };

        tracing::debug!("Loaded {} tasks from {:?}", tasks.len(), path);
        Ok(Self { path, tasks })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Write the full list back to disk.
    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.tasks)?;
        std::fs::write(&self.path, content).map_err(|e| {
            AppError::Task(format!("Failed to write task file {:?}: {}", self.path, e))
        })?;

        Ok(())
    }

    /// Append a task and persist the list.
    pub fn add(&mut self, task: Task) -> AppResult<()> {
        tracing::info!("Adding task: {}", task.description);
        self.tasks.push(task);
        self.save()
    }

    /// Index and description of every reminder that is due and not yet announced.
    pub fn due(&self, now: NaiveDateTime) -> Vec<(usize, String)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_due(now))
            .map(|(slot, task)| (slot, task.description.clone()))
            .collect()
    }

    /// Flag the task at `slot` as announced. Does not save.
    pub fn mark_notified(&mut self, slot: usize) {
        if let Some(task) = self.tasks.get_mut(slot) {
            task.notified = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = TaskStore::load(temp.path().join("tasks.json")).unwrap();
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_add_persists_and_reloads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        let mut store = TaskStore::load(&path).unwrap();
        store.add(Task::new("buy milk", None)).unwrap();
        store.add(Task::new("call mom", Some(at(9, 30)))).unwrap();

        let reloaded = TaskStore::load(&path).unwrap();
        assert_eq!(reloaded.tasks(), store.tasks());
    }

    #[test]
    fn test_file_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        let mut store = TaskStore::load(&path).unwrap();
        store.add(Task::new("buy milk", None)).unwrap();
        store.add(Task::new("stretch", Some(at(9, 30)))).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"description": "buy milk"},
                {"description": "stretch", "remind_at": "2024-05-01T09:30:00"}
            ])
        );
    }

    #[test]
    fn test_reads_fractional_seconds() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        std::fs::write(
            &path,
            r#"[{"description": "water plants", "remind_at": "2024-05-01T09:30:00.123456", "notified": true}]"#,
        )
        .unwrap();

        let store = TaskStore::load(&path).unwrap();
        assert_eq!(store.tasks().len(), 1);
        assert!(store.tasks()[0].notified);
    }

    #[test]
    fn test_invalid_file_is_task_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(TaskStore::load(&path), Err(AppError::Task(_))));
    }

    #[test]
    fn test_due_until_marked() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::load(temp.path().join("tasks.json")).unwrap();
        store.add(Task::new("early", Some(at(9, 0)))).unwrap();
        store.add(Task::new("late", Some(at(18, 0)))).unwrap();
        store.add(Task::new("no reminder", None)).unwrap();

        assert_eq!(store.due(at(12, 0)), vec![(0, "early".to_string())]);
        // Listing alone does not change anything
        assert_eq!(store.due(at(12, 0)), vec![(0, "early".to_string())]);

        store.mark_notified(0);
        assert!(store.due(at(12, 0)).is_empty());
        assert_eq!(store.due(at(18, 0)), vec![(1, "late".to_string())]);
    }
}
