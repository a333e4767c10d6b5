// Contao - front-end rendering core for the Contao CMS
// Copyright (C) 2025 Contao Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::{
    modules::login::LOGOUT_PATH,
    page::{logout_handler, page_handler},
    request_logging::request_logging_middleware,
    AppState,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/_health", get(health))
        // System routes
        .route(LOGOUT_PATH, post(logout_handler))
        // Everything else is a front-end page
        .fallback(get(page_handler).post(page_handler))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_app_state, TestSite};
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_health_check() {
        let state = create_test_app_state().await.unwrap();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/_health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_empty_installation_answers_404() {
        let state = create_test_app_state().await.unwrap();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().contains("<h1>404</h1>"));
    }

    #[tokio::test]
    async fn test_root_alias_forwards_to_first_page() {
        let state = create_test_app_state().await.unwrap();
        TestSite::create(&state).await.unwrap();
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/website.html").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/");

        let response = server.get("/index.html").await;
        response.assert_status_ok();
        assert!(response.text().contains("Welcome to our website"));
    }
}
