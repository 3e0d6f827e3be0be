use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;

use server::config::Config;
use server::handlers;
use server::server::spawn_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let srv_tx = spawn_server(&config);
    let bind = config.bind.clone();
    log::info!("Relay listening on {}", bind);

    HttpServer::new(move || {
        App::new()
            .wrap(handlers::cors(&config))
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(srv_tx.clone()))
            .app_data(web::Data::new(config.clone()))
            .configure(handlers::root)
    })
    .bind(bind)?
    .run()
    .await
}
