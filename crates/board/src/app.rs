use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use db::models::task::{Task, TaskStatus};
use uuid::Uuid;

use crate::{
    api::TaskApi,
    board::{self, DragState, PendingMove},
    form::{SubmitRequest, TaskForm},
    state::{TaskAction, TaskStore},
};

/// Work a key press asks the event loop to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reload,
    Delete(Uuid),
    Drop { task_id: Uuid, destination: TaskStatus },
    SubmitForm,
    Quit,
}

pub struct App {
    api: Arc<dyn TaskApi>,
    store: TaskStore,
    selected_column: usize,
    selected_row: usize,
    drag: DragState,
    form: Option<TaskForm>,
    status_message: Option<String>,
}

impl App {
    pub fn new(api: Arc<dyn TaskApi>) -> Self {
        Self {
            api,
            store: TaskStore::default(),
            selected_column: 0,
            selected_row: 0,
            drag: DragState::default(),
            form: None,
            status_message: None,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn form(&self) -> Option<&TaskForm> {
        self.form.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn selected_column(&self) -> TaskStatus {
        TaskStatus::COLUMNS[self.selected_column]
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.store
            .by_status(self.selected_column())
            .get(self.selected_row)
            .copied()
    }

    fn select_task(&mut self, task_id: Uuid) {
        let Some(task) = self.store.get(task_id) else {
            self.clamp_selection();
            return;
        };
        let status = task.status;
        self.selected_column = status.column_index();
        self.selected_row = self
            .store
            .by_status(status)
            .iter()
            .position(|task| task.id == task_id)
            .unwrap_or(0);
    }

    fn clamp_selection(&mut self) {
        let len = self.store.by_status(self.selected_column()).len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }

    fn move_column(&mut self, delta: isize) {
        let last = TaskStatus::COLUMNS.len() as isize - 1;
        self.selected_column = (self.selected_column as isize + delta).clamp(0, last) as usize;
        self.clamp_selection();
    }

    fn move_row(&mut self, delta: isize) {
        let len = self.store.by_status(self.selected_column()).len() as isize;
        if len == 0 {
            self.selected_row = 0;
            return;
        }
        self.selected_row = (self.selected_row as isize + delta).clamp(0, len - 1) as usize;
    }

    pub async fn fetch_tasks(&mut self) {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Loaded tasks");
                self.store.dispatch(TaskAction::SetTasks(tasks));
                self.status_message = None;
                self.clamp_selection();
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch tasks");
                self.status_message = Some(format!("Failed to load tasks: {err}"));
            }
        }
    }

    /// Removes the task only after the server confirms.
    pub async fn delete_task(&mut self, task_id: Uuid) {
        match self.api.delete_task(task_id).await {
            Ok(()) => {
                tracing::info!(%task_id, "Deleted task");
                self.store.dispatch(TaskAction::DeleteTask { id: task_id });
                self.clamp_selection();
            }
            Err(err) => {
                tracing::error!(%task_id, error = %err, "Failed to delete task");
                self.status_message = Some(format!("Failed to delete task: {err}"));
            }
        }
    }

    pub fn begin_drop(&mut self, task_id: Uuid, destination: TaskStatus) -> Option<PendingMove> {
        let pending = board::begin_drop(&mut self.store, task_id, destination)?;
        self.select_task(task_id);
        Some(pending)
    }

    pub async fn finish_drop(&mut self, pending: PendingMove) {
        let task_id = pending.task_id();
        if let Err(err) = board::finish_drop(&mut self.store, self.api.as_ref(), pending).await {
            self.status_message = Some(format!("Failed to move task: {err}"));
        }
        self.select_task(task_id);
    }

    pub async fn drop_task(&mut self, task_id: Uuid, destination: TaskStatus) {
        if let Some(pending) = self.begin_drop(task_id, destination) {
            self.finish_drop(pending).await;
        }
    }

    pub fn open_create_form(&mut self) {
        self.form = Some(TaskForm::create());
    }

    pub fn open_edit_form(&mut self) {
        if let Some(form) = self.selected_task().map(TaskForm::edit) {
            self.form = Some(form);
        }
    }

    pub fn close_form(&mut self) {
        if self.form.as_ref().is_some_and(TaskForm::is_submitting) {
            return;
        }
        self.form = None;
    }

    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        self.form.as_mut()?.begin_submit().ok()
    }

    pub async fn finish_submit(&mut self, request: SubmitRequest) {
        let result = request.send(self.api.as_ref()).await;
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if let Ok(action) = form.finish_submit(result) {
            let task_id = match &action {
                TaskAction::AddTask(task) => Some(task.id),
                TaskAction::UpdateTask(patch) => Some(patch.id),
                _ => None,
            };
            self.store.dispatch(action);
            self.form = None;
            if let Some(task_id) = task_id {
                self.select_task(task_id);
            }
        }
    }

    pub async fn submit_form(&mut self) {
        if let Some(request) = self.begin_submit() {
            self.finish_submit(request).await;
        }
    }

    pub async fn run(&mut self, command: Command) {
        match command {
            Command::Reload => self.fetch_tasks().await,
            Command::Delete(task_id) => self.delete_task(task_id).await,
            Command::Drop {
                task_id,
                destination,
            } => self.drop_task(task_id, destination).await,
            Command::SubmitForm => self.submit_form().await,
            Command::Quit => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }
        if self.form.is_some() {
            return self.handle_form_key(key);
        }
        if self.drag.is_dragging() {
            return self.handle_drag_key(key);
        }

        self.status_message = None;
        match key.code {
            KeyCode::Char('q') => return Some(Command::Quit),
            KeyCode::Left | KeyCode::Char('h') => self.move_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_column(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_row(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_row(1),
            KeyCode::Char('n') => self.open_create_form(),
            KeyCode::Char('e') => self.open_edit_form(),
            KeyCode::Char('r') => return Some(Command::Reload),
            KeyCode::Char('d') => return self.selected_task().map(|task| Command::Delete(task.id)),
            KeyCode::Char(' ') => {
                if let Some(task) = self.selected_task().cloned() {
                    self.drag.grab(&task);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_drag_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.drag.move_target(-1),
            KeyCode::Right | KeyCode::Char('l') => self.drag.move_target(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let (task_id, destination) = self.drag.release()?;
                return Some(Command::Drop {
                    task_id,
                    destination,
                });
            }
            KeyCode::Esc => self.drag.cancel(),
            _ => {}
        }
        None
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => self.close_form(),
            KeyCode::Enter => return Some(Command::SubmitForm),
            KeyCode::Tab | KeyCode::BackTab => {
                if let Some(form) = self.form.as_mut() {
                    form.toggle_focus();
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.form.as_mut() {
                    form.pop_char();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.form.as_mut() {
                    form.push_char(c);
                }
            }
            _ => {}
        }
        None
    }
}
