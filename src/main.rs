use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use taskledger::{auth::AuthSettings, config::Config, db, routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(to_io_error)?;
    let pool = db::connect(&config).map_err(to_io_error)?;
    db::wait_for_db(&pool, config.db_connect_retries)
        .await
        .map_err(to_io_error)?;
    db::run_migrations(&pool).await.map_err(to_io_error)?;

    let auth_settings = web::Data::new(AuthSettings::from_config(&config).map_err(to_io_error)?);
    let pool_data = web::Data::new(pool.clone());

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(auth_settings.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    pool.close().await;
    log::info!("Server stopped");
    Ok(())
}

fn to_io_error(err: taskledger::AppError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
