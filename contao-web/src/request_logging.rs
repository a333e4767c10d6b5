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

use axum::{
    body::Body,
    http::{Request, Response},
    middleware::Next,
};
use std::time::Instant;
use tracing::info;

/// Middleware logging every request with its status and duration.
pub async fn request_logging_middleware(
    request: Request<Body>,
    next: Next,
) -> Result<Response<Body>, axum::http::StatusCode> {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let has_query = request.uri().query().is_some();

    info!(method = %method, path = %path, has_query, "Request");

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();
    if status.is_server_error() {
        tracing::warn!(method = %method, path = %path, status = %status, ?duration, "Response");
    } else {
        info!(method = %method, path = %path, status = %status, ?duration, "Response");
    }

    Ok(response)
}
