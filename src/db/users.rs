use sqlx::{PgConnection, PgPool};

use super::is_unique_violation;
use crate::{error::AppError, models::User};

pub async fn find_user_by_name(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let mut tx = pool.begin().await?;
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, external_id, created_at \
         FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn username_available(pool: &PgPool, username: &str) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;
    let taken = username_taken(&mut *tx, username).await?;
    tx.commit().await?;
    Ok(!taken)
}

async fn username_taken(conn: &mut PgConnection, username: &str) -> Result<bool, AppError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
    )
    .bind(username)
    .fetch_one(conn)
    .await?;
    Ok(taken)
}

/// Registers a user. Returns `false`, writing nothing, if the name is taken.
///
/// The availability check only gives the common case a clean answer. Two
/// concurrent registrations can both pass it; the unique constraint on
/// `users.username` then rejects the second insert, which is reported the same way.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    external_id: Option<i64>,
) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;
    if username_taken(&mut *tx, username).await? {
        log::debug!("Registration rejected, username {:?} is taken", username);
        return Ok(false);
    }

    let inserted = sqlx::query(
        "INSERT INTO users (username, password_hash, external_id) VALUES ($1, $2, $3)",
    )
    .bind(username)
    .bind(password_hash)
    .bind(external_id)
    .execute(&mut *tx)
    .await;

    if let Err(e) = inserted {
        return name_conflict_or(e);
    }
    if let Err(e) = tx.commit().await {
        return name_conflict_or(e);
    }

    log::info!("Registered user {:?}", username);
    Ok(true)
}

/// Renames a user. Returns `false` if the new name is taken (including by the
/// user themselves) or the user no longer exists.
///
/// Tokens carry the username, so every token issued under the old name stops
/// resolving once this commits.
pub async fn rename_user(pool: &PgPool, user_id: i32, new_username: &str) -> Result<bool, AppError> {
    let mut tx = pool.begin().await?;
    if username_taken(&mut *tx, new_username).await? {
        return Ok(false);
    }

    let updated = sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
        .bind(new_username)
        .bind(user_id)
        .execute(&mut *tx)
        .await;

    let rows = match updated {
        Ok(result) => result.rows_affected(),
        Err(e) => return name_conflict_or(e),
    };
    if rows == 0 {
        return Ok(false);
    }
    if let Err(e) = tx.commit().await {
        return name_conflict_or(e);
    }

    log::info!("Renamed user {} to {:?}", user_id, new_username);
    Ok(true)
}

/// Deletes a user together with all of their tasks and those tasks' tags.
pub async fn delete_user(pool: &PgPool, user_id: i32) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let tags = sqlx::query(
        "DELETE FROM tags WHERE task_id IN (SELECT id FROM tasks WHERE creator_id = $1)",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let tasks = sqlx::query("DELETE FROM tasks WHERE creator_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    log::info!(
        "Deleted user {} ({} tasks, {} tags)",
        user_id,
        tasks.rows_affected(),
        tags.rows_affected()
    );
    Ok(())
}

/// Maps a lost username race to `Ok(false)`; anything else stays an error.
fn name_conflict_or(error: sqlx::Error) -> Result<bool, AppError> {
    if is_unique_violation(&error) {
        log::debug!("Username claimed concurrently: {}", error);
        Ok(false)
    } else {
        Err(error.into())
    }
}
