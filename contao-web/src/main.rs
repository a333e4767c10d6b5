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

use anyhow::Result;
use contao_db::init_database;
use contao_web::{
    configuration::Config, mailer::create_mailer, routes, state::AppState,
    templates::TemplateEngine,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contao_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting Contao front end");

    // Initialize database
    info!("Initializing database: {}", config.database_url);
    let db = init_database(&config.database_url).await?;

    // Initialize templates
    match &config.templates_dir {
        Some(dir) => info!("Loading templates from: {}", dir),
        None => info!("Using built-in templates"),
    }
    let templates = TemplateEngine::new(config.templates_dir.as_deref(), config.development_mode)?;

    let mailer = create_mailer(&config.mail)?;
    if config.preview_token.is_none() {
        info!("Preview mode is disabled (no PREVIEW_TOKEN)");
    }

    // Create application state
    let state = AppState::new(db, templates, config.clone(), mailer);

    // Create router
    let app = routes::create_router(state);

    // Start server
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
