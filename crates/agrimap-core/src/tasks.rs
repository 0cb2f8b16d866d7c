//! Per-farm resource tasks (irrigation, fertilization, pest control) that
//! can be marked done and undone.

use serde::{Deserialize, Serialize};

use crate::generate::{Clock, IdGenerator};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Irrigation,
    Fertilization,
    PestControl,
}

/// Declared most urgent first, so the derived `Ord` sorts `High` ahead.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, schemars::JsonSchema)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTask {
    pub id: String,
    pub farm_id: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    /// Free text, e.g. "Today, 6:00 AM".
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl ResourceTask {
    /// Mark done, or back to pending if already done.
    pub fn toggle(&mut self, clock: &dyn Clock) {
        self.completed = !self.completed;
        self.completed_at = self.completed.then(|| clock.now());
    }
}

/// Fields a caller supplies for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub kind: TaskKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub estimated_time: String,
}

pub fn new_task(farm_id: &str, spec: NewTask, ids: &mut dyn IdGenerator) -> Result<ResourceTask> {
    let title = spec.title.trim();
    if title.is_empty() {
        return Err(Error::Validation("task title must not be blank".into()));
    }
    Ok(ResourceTask {
        id: ids.next_id(),
        farm_id: farm_id.to_string(),
        kind: spec.kind,
        title: title.to_string(),
        description: spec.description.trim().to_string(),
        priority: spec.priority,
        due_date: spec.due_date,
        estimated_time: spec.estimated_time,
        completed: false,
        completed_at: None,
    })
}

/// Pending tasks before completed ones, most urgent first within each group.
/// Ties keep insertion order.
pub fn agenda(tasks: &[ResourceTask]) -> Vec<&ResourceTask> {
    let mut out: Vec<&ResourceTask> = tasks.iter().collect();
    out.sort_by_key(|t| (t.completed, t.priority));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{FixedClock, SequentialIds};

    fn spec(title: &str, priority: Priority) -> NewTask {
        NewTask {
            kind: TaskKind::Irrigation,
            title: title.into(),
            description: String::new(),
            priority,
            due_date: "Today".into(),
            estimated_time: "1 hour".into(),
        }
    }

    #[test]
    fn toggle_sets_and_clears_completion_time() {
        let mut ids = SequentialIds::new("task");
        let clock = FixedClock("2024-06-01T06:00:00+00:00".into());
        let mut task = new_task("farm-1", spec("Morning irrigation", Priority::High), &mut ids).unwrap();
        assert_eq!(task.id, "task-1");
        assert!(!task.completed);

        task.toggle(&clock);
        assert!(task.completed);
        assert_eq!(task.completed_at.as_deref(), Some("2024-06-01T06:00:00+00:00"));

        task.toggle(&clock);
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut ids = SequentialIds::new("task");
        assert!(matches!(
            new_task("farm-1", spec(" ", Priority::Low), &mut ids),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn agenda_puts_pending_and_urgent_first() {
        let mut ids = SequentialIds::new("task");
        let clock = FixedClock(String::new());
        let mut tasks: Vec<ResourceTask> = [
            ("evening", Priority::Medium),
            ("aphids", Priority::High),
            ("npk", Priority::Medium),
            ("morning", Priority::High),
        ]
        .into_iter()
        .map(|(t, p)| new_task("farm-1", spec(t, p), &mut ids).unwrap())
        .collect();
        tasks[1].toggle(&clock);

        let order: Vec<&str> = agenda(&tasks).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(order, vec!["morning", "evening", "npk", "aphids"]);
    }

    #[test]
    fn kind_uses_type_key() {
        let mut ids = SequentialIds::new("task");
        let mut t = new_task("farm-1", spec("Spray", Priority::High), &mut ids).unwrap();
        t.kind = TaskKind::PestControl;
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "pest-control");
        assert_eq!(json["priority"], "High");
        assert_eq!(json["farmId"], "farm-1");
    }
}
