//! Plain HTTP endpoints: landing page and health check.

use actix_web::{error, web, Error, HttpResponse};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::server::matchmaking::server::GetStats;
use crate::server::state::AppState;

/// Body of `GET /health`.
#[derive(Serialize, Debug)]
pub struct HealthReport {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(rename = "jogadoresOnline")]
    pub players_online: usize,
    pub timestamp: String,
}

pub async fn health(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let stats = data
        .match_server
        .send(GetStats)
        .await
        .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok().json(HealthReport {
        status: "online",
        message: "Servidor Mamoball Multiplayer OK!",
        players_online: stats.total,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

pub async fn index(data: web::Data<AppState>) -> Result<HttpResponse, Error> {
    let stats = data
        .match_server
        .send(GetStats)
        .await
        .map_err(error::ErrorInternalServerError)?;
    let body = format!(
        r#"<!DOCTYPE html>
<html>
  <head><meta charset="utf-8"><title>Mamoball Multiplayer</title></head>
  <body style="font-family: Arial, sans-serif; text-align: center; padding: 50px;">
    <h1>MAMOBALL</h1>
    <h2>Servidor multiplayer online</h2>
    <p>Conecte os clientes em <code>/ws</code> para jogar 1vs1.</p>
    <p>Jogadores online: {}</p>
    <p>Na fila: {} | Partidas ativas: {}</p>
    <p>{}</p>
  </body>
</html>"#,
        stats.total,
        stats.queued,
        stats.active_sessions,
        Utc::now().format("%d/%m/%Y %H:%M:%S UTC"),
    );
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(body))
}
