use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use crate::types::TaskStatus;
use crate::entities::task;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Task not found")]
    TaskNotFound,
    #[error("Title is required")]
    EmptyTitle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl CreateTask {
    pub fn from_title_description(title: String, description: Option<String>) -> Self {
        Self {
            title,
            description,
            status: Some(TaskStatus::Todo),
        }
    }

    pub fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        Ok(())
    }
}

/// Partial update: omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    pub fn status_only(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn title_description(title: String, description: Option<String>) -> Self {
        Self {
            title: Some(title),
            // An empty string clears the description on the server.
            description: Some(description.unwrap_or_default()),
            status: None,
        }
    }

    /// Applies this update on top of `existing`, keeping id and timestamps.
    pub fn merge(self, existing: Task) -> Result<Task, TaskError> {
        let title = match self.title {
            Some(title) if title.trim().is_empty() => return Err(TaskError::EmptyTitle),
            Some(title) => title.trim().to_string(),
            None => existing.title,
        };
        let description = match self.description {
            Some(s) if s.trim().is_empty() => None, // Empty string = clear description
            Some(s) => Some(s),                     // Non-empty string = update description
            None => existing.description,           // Field omitted = keep existing
        };
        let status = self.status.unwrap_or(existing.status);

        Ok(Task {
            title,
            description,
            status,
            ..existing
        })
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.uuid,
            title: model.title,
            description: model.description,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl Task {
    /// All tasks, oldest first so newly created tasks land at the end of their column.
    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = task::Entity::find()
            .order_by_asc(task::Column::CreatedAt)
            .order_by_asc(task::Column::Id)
            .all(db)
            .await?;

        Ok(models.into_iter().map(Self::from).collect())
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;

        Ok(record.map(Self::from))
    }

    pub async fn create<C: ConnectionTrait>(
        db: &C,
        data: &CreateTask,
        task_id: Uuid,
    ) -> Result<Self, TaskError> {
        data.validate()?;

        let description = data
            .description
            .as_ref()
            .filter(|description| !description.trim().is_empty())
            .cloned();

        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(task_id),
            title: Set(data.title.trim().to_string()),
            description: Set(description),
            status: Set(data.status.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from(model))
    }

    /// Persists the mutable fields of an already merged task.
    pub async fn update<C: ConnectionTrait>(db: &C, merged: &Task) -> Result<Self, TaskError> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(merged.id))
            .one(db)
            .await?
            .ok_or(TaskError::TaskNotFound)?;

        let mut active: task::ActiveModel = record.into();
        active.title = Set(merged.title.clone());
        active.description = Set(merged.description.clone());
        active.status = Set(merged.status);
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Self::from(updated))
    }

    /// Returns the number of removed rows; zero when the task did not exist.
    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn create(db: &DatabaseConnection, title: &str) -> Task {
        Task::create(
            db,
            &CreateTask::from_title_description(title.to_string(), None),
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_defaults_status_to_todo() {
        let db = setup_db().await;
        let payload = CreateTask {
            title: "Design the new logo".to_string(),
            description: Some("SVG please".to_string()),
            status: None,
        };

        let id = Uuid::new_v4();
        let task = Task::create(&db, &payload, id).await.unwrap();

        assert_eq!(task.id, id);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.description.as_deref(), Some("SVG please"));
        assert_eq!(Task::find_by_id(&db, id).await.unwrap(), Some(task));
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let db = setup_db().await;
        let payload = CreateTask::from_title_description("   ".to_string(), None);

        let err = Task::create(&db, &payload, Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, TaskError::EmptyTitle));
        assert!(Task::find_all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_all_returns_tasks_in_creation_order() {
        let db = setup_db().await;
        let first = create(&db, "first").await;
        let second = create(&db, "second").await;

        let ids: Vec<Uuid> = Task::find_all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.id)
            .collect();

        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn editing_title_preserves_id_and_status() {
        let db = setup_db().await;
        let task = create(&db, "draft").await;
        let moved = UpdateTask::status_only(TaskStatus::InProgress)
            .merge(task.clone())
            .unwrap();
        let moved = Task::update(&db, &moved).await.unwrap();

        let edit = UpdateTask::title_description("final".to_string(), Some("notes".to_string()));
        let merged = edit.merge(moved.clone()).unwrap();
        let updated = Task::update(&db, &merged).await.unwrap();

        assert_eq!(updated.id, task.id);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.title, "final");
        assert_eq!(updated.description.as_deref(), Some("notes"));
        assert_eq!(updated.created_at, task.created_at);
    }

    #[test]
    fn merge_clears_description_on_empty_string() {
        let now = Utc::now();
        let existing = Task {
            id: Uuid::new_v4(),
            title: "title".to_string(),
            description: Some("old".to_string()),
            status: TaskStatus::Done,
            created_at: now,
            updated_at: now,
        };

        let cleared = UpdateTask {
            description: Some(String::new()),
            ..Default::default()
        }
        .merge(existing.clone())
        .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.title, "title");
        assert_eq!(cleared.status, TaskStatus::Done);

        let untouched = UpdateTask::default().merge(existing.clone()).unwrap();
        assert_eq!(untouched, existing);

        let err = UpdateTask {
            title: Some(" ".to_string()),
            ..Default::default()
        }
        .merge(existing)
        .unwrap_err();
        assert!(matches!(err, TaskError::EmptyTitle));
    }

    #[tokio::test]
    async fn update_of_missing_task_is_not_found() {
        let db = setup_db().await;
        let now = Utc::now();
        let ghost = Task {
            id: Uuid::new_v4(),
            title: "ghost".to_string(),
            description: None,
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
        };

        let err = Task::update(&db, &ghost).await.unwrap_err();
        assert!(matches!(err, TaskError::TaskNotFound));
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_task() {
        let db = setup_db().await;
        let keep = create(&db, "keep").await;
        let doomed = create(&db, "doomed").await;

        assert_eq!(Task::delete(&db, doomed.id).await.unwrap(), 1);
        assert_eq!(Task::delete(&db, doomed.id).await.unwrap(), 0);

        let remaining = Task::find_all(&db).await.unwrap();
        assert_eq!(remaining, vec![keep]);
    }
}
