use crate::filter::{Filter, Searchable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Open,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("estado de tarea desconocido: {0}")]
pub struct UnknownTaskState(pub String);

impl FromStr for TaskState {
    type Err = UnknownTaskState;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "open" => Ok(TaskState::Open),
            "done" => Ok(TaskState::Done),
            other => Err(UnknownTaskState(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assignee_name: Option<String>,
}

impl Task {
    pub fn state(&self) -> TaskState {
        if self.done {
            TaskState::Done
        } else {
            TaskState::Open
        }
    }

    pub fn accepted_by(&self, state: &Filter<TaskState>) -> bool {
        state.accepts(&self.state())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.done && self.due_date.is_some_and(|due| due < today)
    }
}

impl Searchable for Task {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.assignee_name.as_deref());
        fields
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, message = "Ingresá un título"))]
    pub title: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}
