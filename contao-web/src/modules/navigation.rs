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

/// Menu of the page tree starting at the configured level.
pub struct NavigationModule;

#[async_trait]
impl FrontendModule for NavigationModule {
    fn template(&self) -> &'static str {
        "mod_navigation"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let options = config.navigation_options();
        let items = ctx.navigator().navigation(&options, config.root_page());
        if items.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        let html = ctx.render_nav(config.navigation_tpl(), &items)?;
        template.set("items", &html);
        Ok(ModuleOutcome::Render)
    }
}

/// Menu of hand-picked pages.
pub struct CustomNavModule;

#[async_trait]
impl FrontendModule for CustomNavModule {
    fn template(&self) -> &'static str {
        "mod_customnav"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let pages = config.pages();
        if pages.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        let items = ctx.navigator().custom(&pages, &config.navigation_options());
        if items.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        let html = ctx.render_nav(config.navigation_tpl(), &items)?;
        template.set("items", &html);
        Ok(ModuleOutcome::Render)
    }
}
