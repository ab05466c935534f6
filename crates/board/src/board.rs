//! Column views and the grab/move/drop protocol.
//!
//! A drop is applied to the store first and confirmed with the server after;
//! [`PendingMove`] keeps the pre-drop record so a failed update can be undone.

use db::models::task::{Task, TaskStatus, UpdateTask};
use uuid::Uuid;

use crate::{
    api::{ApiClientError, TaskApi},
    state::{TaskAction, TaskPatch, TaskStore},
};

pub const EMPTY_COLUMN_TEXT: &str = "Drag tasks here or create a new one.";

#[derive(Debug)]
pub struct Column<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    pub fn title(&self) -> String {
        format!("{} ({})", self.status, self.tasks.len())
    }
}

/// The three status columns, left to right, in store order within each.
pub fn columns(store: &TaskStore) -> [Column<'_>; 3] {
    TaskStatus::COLUMNS.map(|status| Column {
        status,
        tasks: store.by_status(status),
    })
}

/// The card currently grabbed and the column it hovers over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    grabbed: Option<Uuid>,
    over: Option<TaskStatus>,
}

impl DragState {
    pub fn grab(&mut self, task: &Task) {
        self.grabbed = Some(task.id);
        self.over = Some(task.status);
    }

    pub fn grabbed(&self) -> Option<Uuid> {
        self.grabbed
    }

    pub fn over(&self) -> Option<TaskStatus> {
        self.over
    }

    pub fn is_dragging(&self) -> bool {
        self.grabbed.is_some()
    }

    /// Moves the drop target by `delta` columns, clamped to the board.
    pub fn move_target(&mut self, delta: isize) {
        let Some(over) = self.over else { return };
        let last = TaskStatus::COLUMNS.len() as isize - 1;
        let index = (over.column_index() as isize + delta).clamp(0, last) as usize;
        self.over = Some(TaskStatus::COLUMNS[index]);
    }

    /// Ends the gesture, returning the grabbed task and its drop column.
    pub fn release(&mut self) -> Option<(Uuid, TaskStatus)> {
        let dropped = self.grabbed.zip(self.over);
        self.cancel();
        dropped
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

/// An optimistic move awaiting server confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub snapshot: Task,
    pub destination: TaskStatus,
}

impl PendingMove {
    pub fn task_id(&self) -> Uuid {
        self.snapshot.id
    }
}

/// Applies the new status locally. Unknown ids and same-column drops are no-ops.
pub fn begin_drop(
    store: &mut TaskStore,
    task_id: Uuid,
    destination: TaskStatus,
) -> Option<PendingMove> {
    let snapshot = store.get(task_id)?.clone();
    if snapshot.status == destination {
        return None;
    }

    store.dispatch(TaskAction::UpdateTask(TaskPatch::status(
        task_id,
        destination,
    )));
    Some(PendingMove {
        snapshot,
        destination,
    })
}

/// Sends the status update for `pending`, rolling the store back if it fails.
pub async fn finish_drop(
    store: &mut TaskStore,
    api: &dyn TaskApi,
    pending: PendingMove,
) -> Result<Task, ApiClientError> {
    let task_id = pending.task_id();
    let payload = UpdateTask::status_only(pending.destination);

    match api.update_task(task_id, &payload).await {
        Ok(task) => {
            tracing::debug!(%task_id, status = %task.status, "Move confirmed");
            store.dispatch(TaskAction::UpdateTask(TaskPatch::from(task.clone())));
            Ok(task)
        }
        Err(err) => {
            tracing::warn!(
                %task_id,
                from = %pending.snapshot.status,
                to = %pending.destination,
                error = %err,
                "Failed to update task status, rolling back"
            );
            store.dispatch(TaskAction::UpdateTask(TaskPatch::from(pending.snapshot)));
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{api::fake::FakeTaskApi, state::tests::task};

    fn store_with(tasks: Vec<Task>) -> TaskStore {
        let mut store = TaskStore::default();
        store.dispatch(TaskAction::SetTasks(tasks));
        store
    }

    #[test]
    fn columns_partition_tasks_by_status() {
        let store = store_with(vec![
            task("a", TaskStatus::Todo),
            task("b", TaskStatus::Done),
            task("c", TaskStatus::Todo),
        ]);

        let [todo, in_progress, done] = columns(&store);

        assert_eq!(todo.title(), "To Do (2)");
        assert_eq!(in_progress.title(), "In Progress (0)");
        assert_eq!(done.tasks[0].title, "b");
    }

    #[test]
    fn drag_target_is_clamped_to_board() {
        let grabbed = task("a", TaskStatus::Todo);
        let mut drag = DragState::default();
        drag.grab(&grabbed);

        drag.move_target(-1);
        assert_eq!(drag.over(), Some(TaskStatus::Todo));
        drag.move_target(5);
        assert_eq!(drag.over(), Some(TaskStatus::Done));

        assert_eq!(drag.release(), Some((grabbed.id, TaskStatus::Done)));
        assert!(!drag.is_dragging());
        assert_eq!(drag.release(), None);
    }

    #[test]
    fn drop_on_same_column_or_unknown_task_is_a_no_op() {
        let a = task("a", TaskStatus::Todo);
        let mut store = store_with(vec![a.clone()]);

        assert!(begin_drop(&mut store, a.id, TaskStatus::Todo).is_none());
        assert!(begin_drop(&mut store, Uuid::new_v4(), TaskStatus::Done).is_none());
        assert_eq!(store.tasks(), &[a]);
    }

    #[tokio::test]
    async fn successful_drop_moves_only_dragged_task() {
        let a = task("a", TaskStatus::Todo);
        let b = task("b", TaskStatus::Todo);
        let api = FakeTaskApi::with_tasks(vec![a.clone(), b.clone()]);
        let mut store = store_with(vec![a.clone(), b.clone()]);

        let pending = begin_drop(&mut store, a.id, TaskStatus::InProgress).unwrap();
        assert_eq!(store.get(a.id).unwrap().status, TaskStatus::InProgress);

        finish_drop(&mut store, &api, pending).await.unwrap();

        assert_eq!(store.get(a.id).unwrap().status, TaskStatus::InProgress);
        assert_eq!(store.get(b.id).unwrap(), &b);
        assert_eq!(api.stored()[0].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn failed_update_rolls_back_without_duplicates() {
        let a = task("a", TaskStatus::Todo);
        let api = FakeTaskApi::with_tasks(vec![a.clone()]);
        api.fail_update.store(true, Ordering::SeqCst);
        let mut store = store_with(vec![a.clone()]);

        let pending = begin_drop(&mut store, a.id, TaskStatus::InProgress).unwrap();
        let result = finish_drop(&mut store, &api, pending).await;

        assert!(result.is_err());
        assert_eq!(store.tasks(), &[a]);
        let [todo, in_progress, _] = columns(&store);
        assert_eq!(todo.tasks.len(), 1);
        assert!(in_progress.tasks.is_empty());
    }
}
