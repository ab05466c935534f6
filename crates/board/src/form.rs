use db::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    api::{ApiClientError, TaskApi},
    state::{TaskAction, TaskPatch},
};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Title is required!")]
    MissingTitle,
    #[error("Failed to save task. Please try again.")]
    SaveFailed(#[source] ApiClientError),
    #[error("Form is already being submitted")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Task),
}

/// The network call a submitted form turns into.
#[derive(Debug, Clone)]
pub enum SubmitRequest {
    Create(CreateTask),
    Update { id: Uuid, payload: UpdateTask },
}

impl SubmitRequest {
    pub async fn send(&self, api: &dyn TaskApi) -> Result<Task, ApiClientError> {
        match self {
            SubmitRequest::Create(payload) => api.create_task(payload).await,
            SubmitRequest::Update { id, payload } => api.update_task(*id, payload).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    mode: FormMode,
    title: String,
    description: String,
    focus: FormField,
    error: Option<String>,
    submitting: bool,
}

impl TaskForm {
    pub fn create() -> Self {
        Self::with_mode(FormMode::Create, String::new(), String::new())
    }

    /// Pre-fills title and description from `task`.
    pub fn edit(task: &Task) -> Self {
        Self::with_mode(
            FormMode::Edit(task.clone()),
            task.title.clone(),
            task.description.clone().unwrap_or_default(),
        )
    }

    fn with_mode(mode: FormMode, title: String, description: String) -> Self {
        Self {
            mode,
            title,
            description,
            focus: FormField::Title,
            error: None,
            submitting: false,
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn heading(&self) -> &'static str {
        if self.is_edit_mode() {
            "Edit Task"
        } else {
            "Add a New Task"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.submitting, self.is_edit_mode()) {
            (true, _) => "Saving...",
            (false, true) => "Save Changes",
            (false, false) => "Add Task",
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.error = None;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        };
    }

    pub fn push_char(&mut self, c: char) {
        if self.submitting {
            return;
        }
        match self.focus {
            FormField::Title => {
                self.title.push(c);
                self.error = None;
            }
            FormField::Description => self.description.push(c),
        }
    }

    pub fn pop_char(&mut self) {
        if self.submitting {
            return;
        }
        match self.focus {
            FormField::Title => {
                self.title.pop();
                self.error = None;
            }
            FormField::Description => {
                self.description.pop();
            }
        }
    }

    /// Validates and locks the form. No request is built for a blank title.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, FormError> {
        if self.submitting {
            return Err(FormError::Busy);
        }
        if self.title.trim().is_empty() {
            let err = FormError::MissingTitle;
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.error = None;
        self.submitting = true;

        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());
        let request = match &self.mode {
            FormMode::Create => SubmitRequest::Create(CreateTask {
                title: self.title.trim().to_string(),
                description,
                status: Some(TaskStatus::Todo),
            }),
            FormMode::Edit(task) => SubmitRequest::Update {
                id: task.id,
                payload: UpdateTask::title_description(self.title.trim().to_string(), description),
            },
        };
        Ok(request)
    }

    /// Unlocks the form and turns the server's answer into a store action.
    pub fn finish_submit(
        &mut self,
        result: Result<Task, ApiClientError>,
    ) -> Result<TaskAction, FormError> {
        self.submitting = false;
        match result {
            Ok(task) if self.is_edit_mode() => Ok(TaskAction::UpdateTask(TaskPatch::from(task))),
            Ok(task) => Ok(TaskAction::AddTask(task)),
            Err(err) => {
                tracing::error!(error = %err, edit = self.is_edit_mode(), "Failed to save task");
                let err = FormError::SaveFailed(err);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn submit(&mut self, api: &dyn TaskApi) -> Result<TaskAction, FormError> {
        let request = self.begin_submit()?;
        let result = request.send(api).await;
        self.finish_submit(result)
    }
}
