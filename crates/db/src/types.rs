use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Board column a task sits in. Serialized with the column titles shown on the board.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "todo")]
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    Todo,
    #[sea_orm(string_value = "inprogress")]
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "done")]
    #[serde(rename = "Done")]
    #[strum(serialize = "Done")]
    Done,
}

impl TaskStatus {
    /// Columns in board order, left to right.
    pub const COLUMNS: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn column_index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }
}
