use crate::server::{ServerCommand, ServerTx};
use actix_web::{error, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use system::serde_json::json;
use tokio::sync::oneshot;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub user_count: usize,
}

pub fn configure_presence_handlers(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/presence").route(web::get().to(presence)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn presence(srv_tx: web::Data<ServerTx>) -> Result<impl Responder, error::Error> {
    let (tx, rx) = oneshot::channel();
    srv_tx
        .send(ServerCommand::GetPresence { tx })
        .await
        .map_err(|_| error::ErrorServiceUnavailable("relay is not running"))?;
    let user_count = rx
        .await
        .map_err(|_| error::ErrorServiceUnavailable("relay is not running"))?;
    Ok(HttpResponse::Ok().json(PresenceResponse { user_count }))
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
