use crate::{
    auth::{hash_password, AuthSettings, AuthenticatedUser},
    db,
    error::AppError,
    models::{validate_username, NewUser},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

const USERNAME_TAKEN: &str = "That username is taken. Try another";

/// Returns the authenticated user (without the password hash).
#[get("/user")]
pub async fn get_user(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}

/// Register a new user
///
/// ## Responses:
/// - `200 OK`: The account was created.
/// - `400 Bad Request`: The payload failed validation.
/// - `409 Conflict`: The username is already taken.
#[post("/user")]
pub async fn create_user(
    pool: web::Data<PgPool>,
    settings: web::Data<AuthSettings>,
    new_user: web::Json<NewUser>,
) -> Result<impl Responder, AppError> {
    new_user.validate()?;
    let new_user = new_user.into_inner();

    let cost = settings.bcrypt_cost;
    let password = new_user.password;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    if !db::users::create_user(&pool, &new_user.username, &password_hash, new_user.external_id)
        .await?
    {
        return Err(AppError::Conflict(USERNAME_TAKEN.into()));
    }
    Ok(HttpResponse::Ok().finish())
}

/// Rename the authenticated user
///
/// The body is a bare JSON string. Tokens issued under the old name stop working,
/// so the client has to log in again.
#[put("/user")]
pub async fn rename_user(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    new_username: web::Json<String>,
) -> Result<impl Responder, AppError> {
    let new_username = new_username.into_inner();
    validate_username(&new_username)
        .map_err(|e| AppError::ValidationError(format!("username: {}", e)))?;

    if !db::users::rename_user(&pool, user.0.id, &new_username).await? {
        return Err(AppError::Conflict(USERNAME_TAKEN.into()));
    }
    Ok(HttpResponse::Ok().finish())
}

/// Delete the authenticated user and everything they created
#[delete("/user")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    db::users::delete_user(&pool, user.0.id).await?;
    Ok(HttpResponse::Ok().finish())
}
