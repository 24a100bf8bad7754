use actix_web::dev::Payload;
use actix_web::{http::header, web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;

use crate::auth::{authenticator::resolve, token::INVALID_CREDENTIALS, AuthSettings};
use crate::error::AppError;
use crate::models::User;

/// The user behind the request's bearer token.
///
/// Adding this extractor to a handler is what makes the route require
/// authentication. It reads `Authorization: Bearer <token>`, verifies the
/// token and loads the user it names; any failure short-circuits with
/// `AppError::Unauthorized`. It needs `web::Data<PgPool>` and
/// `web::Data<AuthSettings>` to be registered on the app.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Extracts the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req).map(str::to_owned);
        let pool = req.app_data::<web::Data<PgPool>>().cloned();
        let settings = req.app_data::<web::Data<AuthSettings>>().cloned();

        Box::pin(async move {
            authenticate_request(token, pool, settings)
                .await
                .map_err(ActixError::from)
        })
    }
}

async fn authenticate_request(
    token: Option<String>,
    pool: Option<web::Data<PgPool>>,
    settings: Option<web::Data<AuthSettings>>,
) -> Result<AuthenticatedUser, AppError> {
    let token = token.ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;
    let (pool, settings) = match (pool, settings) {
        (Some(pool), Some(settings)) => (pool, settings),
        _ => {
            return Err(AppError::InternalServerError(
                "Authentication state is not registered on the app".into(),
            ))
        }
    };

    let user = resolve(&pool, &settings.tokens, &token).await?;
    Ok(AuthenticatedUser(user))
}
