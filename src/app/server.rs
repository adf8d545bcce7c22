use crate::app::routes;
use crate::app::state::AppState;
use crate::config::ServiceConfig;
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::time::Duration;

pub async fn run(config: ServiceConfig) -> std::io::Result<()> {
    let state = AppState::from_config(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);
    let (bind, port) = config.socket_addr();

    tracing::info!("🚀 Listening on {}:{}", bind, port);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .keep_alive(Duration::from_secs(75));

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind((bind.as_str(), port))?.run().await
}
