use crate::{
    auth::AuthenticatedUser,
    db,
    error::AppError,
    models::NewTask,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

fn not_found() -> AppError {
    AppError::NotFound("Not Found".into())
}

/// Lists the tasks created by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects, tags included.
/// - `401 Unauthorized`: Missing or invalid token.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = db::tasks::list_tasks(&pool, user.0.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required string.
/// - `contents` (optional): task body, defaults to an empty string.
/// - `tags` (optional): list of tag names.
///
/// ## Responses:
/// - `200 OK`: `{"id": <new task id>}`.
/// - `400 Bad Request`: Malformed payload.
/// - `401 Unauthorized`: Missing or invalid token.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let task_id = db::tasks::create_task(&pool, user.0.id, &task_data).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": task_id })))
}

/// Lists the caller's tasks having a tag that starts with `prefix` (case-sensitive).
#[get("/search/{prefix}")]
pub async fn search_tasks(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    prefix: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let tasks = db::tasks::find_tasks_by_tag_prefix(&pool, user.0.id, &prefix).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves one task.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `404 Not Found`: The task does not exist or belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = db::tasks::find_task(&pool, user.0.id, task_id.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces title, contents and tags of a task.
///
/// ## Responses:
/// - `200 OK`: Updated.
/// - `400 Bad Request`: Malformed payload.
/// - `404 Not Found`: The task does not exist or belongs to someone else.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    if !db::tasks::replace_task(&pool, user.0.id, task_id.into_inner(), &task_data).await? {
        return Err(not_found());
    }
    Ok(HttpResponse::Ok().finish())
}

/// Deletes a task and its tags.
///
/// ## Responses:
/// - `200 OK`: Deleted.
/// - `404 Not Found`: The task does not exist, was already deleted, or belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !db::tasks::delete_task(&pool, user.0.id, task_id.into_inner()).await? {
        return Err(not_found());
    }
    Ok(HttpResponse::Ok().finish())
}
