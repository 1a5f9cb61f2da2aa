use actix_web::{middleware, web, App, HttpServer};
use labeler::api::{configure_routes, AppState, WsBroker};
use labeler::{banner, config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Print the startup banner
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Falling back to the config file and process environment");
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = config::AppConfig::from_env().map_err(|e| {
        eprintln!("❌ Invalid configuration: {}", e);
        std::io::Error::other(e)
    })?;

    let bind = (app_config.bind_address.clone(), app_config.port);
    println!("✅ Classification service: {}", app_config.api_base);

    let state = AppState::new(app_config);
    let broker = WsBroker::new();
    broker.forward(&state.queries);

    println!("🚀 Starting server...");
    println!("🏷️  Labeling UI available at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(broker.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
