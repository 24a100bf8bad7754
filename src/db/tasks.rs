use std::collections::HashMap;

use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use crate::{
    error::AppError,
    models::{NewTask, TagRow, Task, TaskRow},
};

/// Lists every task created by `owner_id`, oldest first.
pub async fn list_tasks(pool: &PgPool, owner_id: i32) -> Result<Vec<Task>, AppError> {
    let mut tx = pool.begin().await?;
    let rows = sqlx::query_as::<_, TaskRow>(
        "SELECT id, creator_id, title, contents, created_at, last_modified_at \
         FROM tasks WHERE creator_id = $1 ORDER BY id",
    )
    .bind(owner_id)
    .fetch_all(&mut *tx)
    .await?;
    let tasks = attach_tags(&mut *tx, rows).await?;
    tx.commit().await?;
    Ok(tasks)
}

/// Inserts a task and its tags, returning the new task id.
///
/// Not idempotent: submitting the same task twice creates two tasks.
pub async fn create_task(pool: &PgPool, owner_id: i32, task: &NewTask) -> Result<i32, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let task_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO tasks (creator_id, title, contents, created_at, last_modified_at) \
         VALUES ($1, $2, $3, $4, $4) RETURNING id",
    )
    .bind(owner_id)
    .bind(&task.title)
    .bind(task.contents_or_empty())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    insert_tags(&mut *tx, task_id, &task.unique_tags()).await?;
    tx.commit().await?;

    log::debug!("User {} created task {}", owner_id, task_id);
    Ok(task_id)
}

/// Looks a task up by id. Ownership is part of the predicate, so a task that
/// belongs to someone else is indistinguishable from one that does not exist.
pub async fn find_task(pool: &PgPool, owner_id: i32, task_id: i32) -> Result<Option<Task>, AppError> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, TaskRow>(
        "SELECT id, creator_id, title, contents, created_at, last_modified_at \
         FROM tasks WHERE id = $1 AND creator_id = $2",
    )
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;

    let task = match row {
        Some(row) => attach_tags(&mut *tx, vec![row]).await?.pop(),
        None => None,
    };
    tx.commit().await?;
    Ok(task)
}

/// Replaces title, contents and the whole tag set of a task.
///
/// Returns `false` if the task is absent or not owned by `owner_id`.
pub async fn replace_task(
    pool: &PgPool,
    owner_id: i32,
    task_id: i32,
    task: &NewTask,
) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE tasks SET title = $1, contents = $2, last_modified_at = $3 \
         WHERE id = $4 AND creator_id = $5",
    )
    .bind(&task.title)
    .bind(task.contents_or_empty())
    .bind(Utc::now())
    .bind(task_id)
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Ok(false);
    }

    // Tags are never diffed: drop them all and write the new set.
    delete_tags(&mut *tx, task_id).await?;
    insert_tags(&mut *tx, task_id, &task.unique_tags()).await?;
    tx.commit().await?;

    log::debug!("User {} replaced task {}", owner_id, task_id);
    Ok(true)
}

/// Deletes a task and its tags. Returns `false` if absent or not owned.
pub async fn delete_task(pool: &PgPool, owner_id: i32, task_id: i32) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM tasks WHERE id = $1 AND creator_id = $2 FOR UPDATE",
    )
    .bind(task_id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await?;

    if owned.is_none() {
        return Ok(false);
    }

    delete_tags(&mut *tx, task_id).await?;
    sqlx::query("DELETE FROM tasks WHERE id = $1 AND creator_id = $2")
        .bind(task_id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    log::debug!("User {} deleted task {}", owner_id, task_id);
    Ok(true)
}

/// Tasks of `owner_id` with at least one tag starting with `prefix`
/// (case-sensitive).
pub async fn find_tasks_by_tag_prefix(
    pool: &PgPool,
    owner_id: i32,
    prefix: &str,
) -> Result<Vec<Task>, AppError> {
    let mut tx = pool.begin().await?;
    let rows = sqlx::query_as::<_, TaskRow>(
        "SELECT t.id, t.creator_id, t.title, t.contents, t.created_at, t.last_modified_at \
         FROM tasks t \
         WHERE t.creator_id = $1 \
           AND EXISTS (SELECT 1 FROM tags g WHERE g.task_id = t.id AND starts_with(g.name, $2)) \
         ORDER BY t.id",
    )
    .bind(owner_id)
    .bind(prefix)
    .fetch_all(&mut *tx)
    .await?;
    let tasks = attach_tags(&mut *tx, rows).await?;
    tx.commit().await?;
    Ok(tasks)
}

/// Loads the tags of all `rows` with one query and builds full tasks.
async fn attach_tags(conn: &mut PgConnection, rows: Vec<TaskRow>) -> Result<Vec<Task>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let tags = sqlx::query_as::<_, TagRow>(
        "SELECT task_id, name FROM tags WHERE task_id = ANY($1) ORDER BY id",
    )
    .bind(&ids[..])
    .fetch_all(&mut *conn)
    .await?;

    let mut by_task: HashMap<i32, Vec<String>> = HashMap::new();
    for tag in tags {
        by_task.entry(tag.task_id).or_default().push(tag.name);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let tags = by_task.remove(&row.id).unwrap_or_default();
            row.with_tags(tags)
        })
        .collect())
}

async fn insert_tags(conn: &mut PgConnection, task_id: i32, tags: &[String]) -> Result<(), AppError> {
    if tags.is_empty() {
        return Ok(());
    }
    sqlx::query("INSERT INTO tags (task_id, name) SELECT $1::int4, UNNEST($2::text[])")
        .bind(task_id)
        .bind(tags)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn delete_tags(conn: &mut PgConnection, task_id: i32) -> Result<(), AppError> {
    sqlx::query("DELETE FROM tags WHERE task_id = $1")
        .bind(task_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
