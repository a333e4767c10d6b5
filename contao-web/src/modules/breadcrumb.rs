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

/// Path from the website root to the current page.
pub struct BreadcrumbModule;

#[async_trait]
impl FrontendModule for BreadcrumbModule {
    fn template(&self) -> &'static str {
        "mod_breadcrumb"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let items = ctx
            .navigator()
            .breadcrumb(config.show_hidden(), config.include_root());

        // Nothing to show on a top-level page without the root item.
        if items.len() < 2 && !config.include_root() {
            return Ok(ModuleOutcome::Empty);
        }

        template.set("items", &items);
        Ok(ModuleOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_module, create_test_app_state, render_module, TestSite};
    use serde_json::json;

    #[tokio::test]
    async fn test_breadcrumb_links_ancestors() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(&state, "breadcrumb", json!({})).await?;
        let fixture = site.fixture(&state, site.team, "/team.html").await?;

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("<li class=\"root first\"><a href=\"/\" title=\"Website\">Website</a></li>"));
        assert!(html.contains("<a href=\"/about.html\" title=\"About\">About</a>"));
        assert!(html.contains("<li class=\"active last\" aria-current=\"page\">Team</li>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_breadcrumb_without_root_on_top_level_page_is_empty() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(&state, "breadcrumb", json!({"include_root": false})).await?;
        let fixture = site.fixture(&state, site.contact, "/contact.html").await?;

        assert_eq!(render_module(&fixture, &module).await?, "");
        Ok(())
    }
}
