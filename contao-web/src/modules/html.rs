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
use contao_core::utils::html::escape_html;

use super::{FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, RenderContext};

/// Custom HTML, output as is. The back end shows the source code instead.
pub struct HtmlModule;

#[async_trait]
impl FrontendModule for HtmlModule {
    fn template(&self) -> &'static str {
        "mod_html"
    }

    fn backend_output(&self, config: &ModuleConfig) -> Option<String> {
        Some(format!("<pre>{}</pre>", escape_html(config.html())))
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        template.set("html", config.html());
        Ok(ModuleOutcome::Render)
    }
}
