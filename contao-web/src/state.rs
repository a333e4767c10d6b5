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

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{configuration::Config, mailer::Mailer, templates::TemplateEngine};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub templates: TemplateEngine,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        templates: TemplateEngine,
        config: Config,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            templates,
            config,
            mailer,
        }
    }
}
