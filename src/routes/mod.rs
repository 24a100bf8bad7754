pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{web, HttpRequest};

use crate::error::AppError;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::FormConfig::default()
            .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into()),
    )
    .service(health::health)
    .service(auth::login)
    .service(users::get_user)
    .service(users::create_user)
    .service(users::rename_user)
    .service(users::delete_user)
    .service(
        web::scope("/tasks")
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::search_tasks)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
