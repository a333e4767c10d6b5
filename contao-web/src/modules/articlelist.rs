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
use contao_core::routing::article_url;
use contao_db::repositories::ArticleRepository;
use serde::Serialize;

use super::{FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, RenderContext};

#[derive(Debug, Serialize)]
struct ArticleLink {
    title: String,
    href: String,
}

/// Links to the articles of the current page in one column.
pub struct ArticleListModule;

#[async_trait]
impl FrontendModule for ArticleListModule {
    fn template(&self) -> &'static str {
        "mod_articlelist"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let page = &ctx.page.page;
        let articles = ArticleRepository::new(ctx.db().clone())
            .find_by_page(page.id())
            .await?;

        let links: Vec<ArticleLink> = articles
            .iter()
            .filter(|a| a.in_column == config.in_column())
            .filter(|a| ctx.is_visible(*a) && ctx.checker.is_granted(*a))
            .skip(config.skip_first())
            .map(|a| ArticleLink {
                title: a.title.clone(),
                href: article_url(page, a, &ctx.page.url_suffix),
            })
            .collect();

        if links.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        template.set("articles", &links);
        Ok(ModuleOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_module, create_test_app_state, render_module, TestSite};
    use contao_core::models::article::Article;
    use serde_json::json;

    #[tokio::test]
    async fn test_article_list_skips_first_and_hidden() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let articles = ArticleRepository::new(state.db.clone());

        let mut second = Article::new(site.about, "History".to_string());
        second.sorting = 256;
        articles.create(&second).await?;
        let mut draft = Article::new(site.about, "Draft".to_string());
        draft.sorting = 384;
        draft.published = false;
        articles.create(&draft).await?;

        let module = create_module(&state, "articlelist", json!({"skip_first": 1})).await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("<a href=\"/about/articles/history.html\" title=\"History\">History</a>"));
        assert!(!html.contains("About us"));
        assert!(!html.contains("Draft"));
        Ok(())
    }
}
