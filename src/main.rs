use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use roadmap_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    config
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let cors_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(config).map_err(|e| std::io::Error::other(e.to_string()))?;

    if state.config.has_api_key() {
        log::info!("Using model {}", state.config.anthropic_model);
    } else {
        log::warn!("ANTHROPIC_API_KEY is not set; starting in Demo Mode");
    }
    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .expose_headers(vec![header::CONTENT_DISPOSITION])
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::default())
            .wrap(cors)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
