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
use async_trait::async_trait;
use contao_core::models::module_config::ModuleConfig;

use super::{FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, RenderContext};

/// Previous, up and next links inside a book (a page subtree).
pub struct BookNavModule;

#[async_trait]
impl FrontendModule for BookNavModule {
    fn template(&self) -> &'static str {
        "mod_booknav"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let book_root = config
            .data
            .get("root_page")
            .and_then(|v| v.as_i64())
            .unwrap_or(ctx.page.root_id);

        let nav = ctx
            .navigator()
            .book(book_root, &config.navigation_options());
        if nav.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        template.set("previous", &nav.previous);
        template.set("up", &nav.up);
        template.set("next", &nav.next);
        Ok(ModuleOutcome::Render)
    }
}
