use crate::config::Config;
use crate::connection::ws_index;
use crate::handlers::presence::configure_presence_handlers;
use actix_cors::Cors;
use actix_web::web;

mod presence;

pub use presence::PresenceResponse;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(vec!["/ws", "/ws/"]).route(web::get().to(ws_index)));

    configure_presence_handlers(cfg);
}

pub fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header();
    if config.allows_any_origin() {
        return cors.allow_any_origin();
    }
    config
        .allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
