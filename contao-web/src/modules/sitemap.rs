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

/// The complete page tree of the website.
pub struct SitemapModule;

#[async_trait]
impl FrontendModule for SitemapModule {
    fn template(&self) -> &'static str {
        "mod_sitemap"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let items = ctx.navigator().sitemap(
            config.root_page(),
            config.show_protected(),
            config.show_hidden(),
        );
        if items.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        template.set("items", &ctx.render_nav(config.navigation_tpl(), &items)?);
        Ok(ModuleOutcome::Render)
    }
}
