use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// Input structure for creating or fully replacing a task.
///
/// Only the shape is checked: a missing `title` or a `tags` value that is not a
/// list of strings fails deserialization. Any string is accepted as a title or tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,

    /// Free-form body. Stored as an empty string when omitted.
    #[serde(default)]
    pub contents: Option<String>,

    /// Tag names. Replaces the whole tag set on update.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn contents_or_empty(&self) -> &str {
        self.contents.as_deref().unwrap_or("")
    }

    /// Tag names with duplicates removed, first occurrence order kept.
    pub fn unique_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .filter(|tag| seen.insert(tag.as_str()))
            .cloned()
            .collect()
    }
}

/// A task as returned by the API, tags included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i32,
    /// Owning user. Only this user can see or change the task.
    pub creator_id: i32,
    pub title: String,
    pub contents: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// One row of the `tasks` table, before its tags are attached.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: i32,
    pub creator_id: i32,
    pub title: String,
    pub contents: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl TaskRow {
    pub fn with_tags(self, tags: Vec<String>) -> Task {
        Task {
            id: self.id,
            creator_id: self.creator_id,
            title: self.title,
            contents: self.contents,
            created_at: self.created_at,
            last_modified_at: self.last_modified_at,
            tags,
        }
    }
}

/// One row of the `tags` table.
#[derive(Debug, FromRow)]
pub struct TagRow {
    pub task_id: i32,
    pub name: String,
}
