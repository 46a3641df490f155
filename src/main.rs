use std::{io, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use farmacia_server::{
    config::AppConfig, database, notifier::LogNotifier, protocol::SimpleResponse,
    state::AppState, user,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(SimpleResponse::err("Página no encontrada"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,actix_web=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, format!("{:#}", err)))?;
    let pool = database::create_pool(&config.database_url, config.db_pool_size)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
    let notifier = Arc::new(LogNotifier::new(config.mail_from.clone()));
    let state = web::Data::new(AppState::new(&config, pool, notifier));

    let bind = config.bind_addr.clone();
    info!("Starting Farmacia Alejo server on {}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .service(web::scope("/farmacia-alejo").configure(user::config))
            .default_service(web::route().to(not_found))
    })
    .bind(bind)?
    .run()
    .await
}
