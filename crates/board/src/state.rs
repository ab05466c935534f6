//! Client-side mirror of the server's task collection.
//!
//! All mutations go through [`tasks_reducer`], a pure function of the previous
//! collection and one [`TaskAction`]. [`TaskStore`] owns the current value.

use chrono::{DateTime, Utc};
use db::models::task::{Task, TaskStatus};
use uuid::Uuid;

/// Fields to merge into the task with `id`; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn status(id: Uuid, status: TaskStatus) -> Self {
        Self {
            id,
            status: Some(status),
            ..Default::default()
        }
    }

    fn apply(self, task: Task) -> Task {
        Task {
            title: self.title.unwrap_or(task.title),
            description: self.description.unwrap_or(task.description),
            status: self.status.unwrap_or(task.status),
            updated_at: self.updated_at.unwrap_or(task.updated_at),
            ..task
        }
    }
}

/// A full record as a patch, used to reconcile with server responses.
impl From<Task> for TaskPatch {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: Some(task.title),
            description: Some(task.description),
            status: Some(task.status),
            updated_at: Some(task.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    SetTasks(Vec<Task>),
    AddTask(Task),
    UpdateTask(TaskPatch),
    DeleteTask { id: Uuid },
}

pub fn tasks_reducer(state: Vec<Task>, action: TaskAction) -> Vec<Task> {
    match action {
        TaskAction::SetTasks(tasks) => tasks,
        TaskAction::AddTask(task) => {
            let mut state = state;
            state.push(task);
            state
        }
        TaskAction::DeleteTask { id } => state.into_iter().filter(|task| task.id != id).collect(),
        TaskAction::UpdateTask(patch) => state
            .into_iter()
            .map(|task| {
                if task.id == patch.id {
                    patch.clone().apply(task)
                } else {
                    task
                }
            })
            .collect(),
    }
}

#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn dispatch(&mut self, action: TaskAction) {
        let state = std::mem::take(&mut self.tasks);
        self.tasks = tasks_reducer(state, action);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .collect()
    }
}
