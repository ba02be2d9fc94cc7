//! Session task list

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::KeyValueStore;

pub const TASKS_KEY: &str = "pomodoro_tasks";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

/// Tasks the user is working through during focus sessions
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    items: Vec<TaskItem>,
}

impl TaskList {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let items = match store.get(TASKS_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable task list: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        Self { items }
    }

    pub fn items(&self) -> &[TaskItem] {
        &self.items
    }

    /// Add a task; blank text is ignored
    pub fn add(&mut self, text: &str, store: &dyn KeyValueStore) -> Option<TaskItem> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.items.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let item = TaskItem {
            id,
            text: text.to_string(),
            completed: false,
        };
        self.items.push(item.clone());
        self.save(store);
        Some(item)
    }

    pub fn toggle(&mut self, id: u64, store: &dyn KeyValueStore) -> Option<TaskItem> {
        let item = self.items.iter_mut().find(|t| t.id == id)?;
        item.completed = !item.completed;
        let item = item.clone();
        self.save(store);
        Some(item)
    }

    pub fn delete(&mut self, id: u64, store: &dyn KeyValueStore) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.save(store);
        }
        removed
    }

    pub fn outstanding(&self) -> Vec<String> {
        self.items.iter().filter(|t| !t.completed).map(|t| t.text.clone()).collect()
    }

    pub fn completed(&self) -> Vec<String> {
        self.items.iter().filter(|t| t.completed).map(|t| t.text.clone()).collect()
    }

    fn save(&self, store: &dyn KeyValueStore) {
        let result = serde_json::to_string(&self.items)
            .map_err(|e| e.to_string())
            .and_then(|json| store.set(TASKS_KEY, &json));
        if let Err(e) = result {
            warn!("Failed to save task list: {}", e);
        }
    }
}
