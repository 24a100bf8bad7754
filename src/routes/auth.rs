use crate::{
    auth::{authenticate, AuthSettings, LoginForm, TokenResponse},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;

/// Exchange credentials for a bearer token
///
/// Takes an urlencoded `username`/`password` form. Unknown usernames and wrong
/// passwords get the same 401.
#[post("/token")]
pub async fn login(
    pool: web::Data<PgPool>,
    settings: web::Data<AuthSettings>,
    form: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    let form = form.into_inner();

    let user = authenticate(&pool, &settings, &form.username, &form.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Incorrect username or password".into()))?;

    let token = settings.tokens.issue(&user.username)?;
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}
