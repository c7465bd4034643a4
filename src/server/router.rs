//! HTTP and WebSocket routing configuration.
//!
//! `/ws` is the game endpoint, handled by one WebSocket actor per client.
//! `/` and `/health` are plain HTTP.

use actix_web::web;
use crate::server::http::{health, index};
use crate::server::matchmaking::ws_session::ws_matchmaking;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/ws").to(ws_matchmaking));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use actix_web::{test, App};
    use serde_json::Value;

    use crate::config::server::{MatchRules, ReaperConfig};
    use crate::server::matchmaking::server::MatchServer;
    use crate::server::state::AppState;

    fn state() -> web::Data<AppState> {
        let server = MatchServer::new(MatchRules::default(), ReaperConfig::default()).start();
        web::Data::new(AppState::new(server))
    }

    #[actix_web::test]
    async fn test_health_reports_online_count() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "online");
        assert_eq!(body["jogadoresOnline"], 0);
        assert!(body["message"].is_string());
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[actix_web::test]
    async fn test_index_serves_html() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("Jogadores online: 0"));
    }

    #[actix_web::test]
    async fn test_ws_route_rejects_plain_http() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;
        let req = test::TestRequest::get().uri("/ws").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
