use actix_web::web;
use sqlx::PgPool;

use crate::{
    auth::{
        password::verify_password,
        token::{TokenKeys, INVALID_CREDENTIALS},
        AuthSettings,
    },
    db,
    error::AppError,
    models::User,
};

/// Resolves a bearer token to the user it was issued to.
///
/// Fails with `Unauthorized` when the token does not verify or when its subject
/// no longer names a user (renamed or deleted account).
pub async fn resolve(pool: &PgPool, keys: &TokenKeys, token: &str) -> Result<User, AppError> {
    let claims = keys.verify(token)?;
    match db::users::find_user_by_name(pool, &claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            log::debug!("Token subject {:?} no longer exists", claims.sub);
            Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()))
        }
    }
}

/// Checks a username/password pair. Returns `None` for an unknown user and for
/// a wrong password alike.
///
/// An unknown user is still checked against `settings.dummy_hash`, which has
/// the configured cost, so both paths take about as long. The bcrypt work runs
/// on the blocking thread pool.
pub async fn authenticate(
    pool: &PgPool,
    settings: &AuthSettings,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let user = db::users::find_user_by_name(pool, username).await?;

    let hash = user
        .as_ref()
        .map(|u| u.password_hash.clone())
        .unwrap_or_else(|| settings.dummy_hash.clone());
    let password = password.to_string();
    let matches = web::block(move || verify_password(&password, &hash)).await?;

    Ok(match user {
        Some(user) if matches => Some(user),
        _ => {
            log::debug!("Failed login for {:?}", username);
            None
        }
    })
}
