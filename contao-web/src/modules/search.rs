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
use contao_core::models::module_config::{ModuleConfig, QueryType};
use contao_core::search::SearchQuery;
use contao_db::repositories::SearchRepository;
use serde::Serialize;

use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::error::PageError;
use crate::render::{FrontendTemplate, RenderContext};

#[derive(Debug, Serialize)]
struct ResultView {
    title: String,
    href: String,
    excerpt: String,
    relevance: i64,
    percent: u32,
}

#[derive(Debug, Serialize)]
struct PageLink {
    number: usize,
    href: String,
    active: bool,
}

/// Search form with paginated results from the page index.
pub struct SearchModule;

impl SearchModule {
    fn page_param(config: &ModuleConfig) -> String {
        format!("page_s{}", config.id())
    }

    /// Requested result page, starting at 1.
    fn requested_page(ctx: &RenderContext<'_>, param: &str) -> Result<usize, PageError> {
        match ctx.request.query_param(param) {
            None => Ok(1),
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or(PageError::NotFound),
        }
    }

    fn page_href(ctx: &RenderContext<'_>, keywords: &str, query_type: QueryType, param: &str, page: usize) -> String {
        let pairs = [
            ("keywords", keywords.to_string()),
            ("query_type", query_type.as_str().to_string()),
            (param, page.to_string()),
        ];
        let query = serde_urlencoded::to_string(pairs).unwrap_or_default();
        format!("{}?{}", ctx.request.path, query)
    }
}

#[async_trait]
impl FrontendModule for SearchModule {
    fn template(&self) -> &'static str {
        "mod_search"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let keywords = ctx
            .request
            .query_param("keywords")
            .map(str::trim)
            .unwrap_or("");
        let query_type = if config.is_advanced_search() {
            ctx.request
                .query_param("query_type")
                .map(QueryType::parse)
                .unwrap_or_else(|| config.query_type())
        } else {
            config.query_type()
        };

        let action = jump_to_href(ctx, config.jump_to()).unwrap_or_else(|| ctx.current_url());
        template.set("action", &action);
        template.set("keywords", keywords);
        template.set("query_type", query_type.as_str());
        template.set("advanced", &config.is_advanced_search());
        template.set("has_query", &false);
        template.set("results", &Vec::<ResultView>::new());
        template.set("pages", &Vec::<PageLink>::new());
        template.set("count", &0);
        template.set("from", &0);
        template.set("to", &0);

        if keywords.is_empty() {
            return Ok(ModuleOutcome::Render);
        }
        template.set("has_query", &true);

        let query = SearchQuery::parse(keywords, query_type, config.fuzzy(), config.min_keyword_length());
        if query.is_empty() {
            return Ok(ModuleOutcome::Render);
        }

        let mut candidates = SearchRepository::new(ctx.db().clone())
            .find_candidates(ctx.page.root_id, &query.highlight_keywords())
            .await?;
        candidates.retain(|(entry, _)| ctx.checker.is_granted(entry));
        let hits = query.rank(candidates, config.context_length(), config.total_length());

        let count = hits.len();
        let per_page = match config.per_page() {
            0 => count.max(1),
            n => n,
        };
        let total_pages = count.div_ceil(per_page).max(1);
        let param = Self::page_param(config);
        let page = Self::requested_page(ctx, &param)?;
        if page > total_pages {
            tracing::debug!(page, total_pages, "Search result page out of range");
            return Err(PageError::NotFound.into());
        }

        let offset = (page - 1) * per_page;
        let results: Vec<ResultView> = hits
            .into_iter()
            .skip(offset)
            .take(per_page)
            .map(|hit| ResultView {
                title: hit.entry.title,
                href: hit.entry.url,
                excerpt: hit.excerpt,
                relevance: hit.relevance,
                percent: hit.percent,
            })
            .collect();

        let pages: Vec<PageLink> = (1..=total_pages)
            .map(|number| PageLink {
                number,
                href: Self::page_href(ctx, keywords, query_type, &param, number),
                active: number == page,
            })
            .collect();

        template.set("count", &count);
        template.set("from", &(offset + 1).min(count));
        template.set("to", &(offset + results.len()));
        template.set("results", &results);
        template.set("pages", &pages);
        Ok(ModuleOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_module, create_test_app_state, render_module, TestSite};
    use crate::AppState;
    use chrono::Utc;
    use contao_core::models::search_entry::SearchEntry;
    use contao_core::search::term_frequencies;
    use serde_json::json;

    async fn index(state: &AppState, site: &TestSite, page_id: i64, url: &str, title: &str, text: &str, protected: bool) -> Result<()> {
        let entry = SearchEntry {
            id: None,
            root_id: site.root,
            page_id,
            url: url.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            checksum: format!("{}-{}", url, text.len()),
            protected,
            groups: if protected { vec![site.group] } else { Vec::new() },
            language: "en".to_string(),
            indexed_at: Utc::now(),
        };
        let terms = term_frequencies(&format!("{} {}", title, text));
        SearchRepository::new(state.db.clone()).index_page(&entry, &terms).await?;
        Ok(())
    }

    async fn indexed_site() -> Result<(AppState, TestSite)> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        index(&state, &site, site.about, "/about.html", "About", "We build websites with care", false).await?;
        index(&state, &site, site.contact, "/contact.html", "Contact", "Write us about your websites", false).await?;
        index(&state, &site, site.members, "/members.html", "Members", "Secret websites for members", true).await?;
        Ok((state, site))
    }

    #[tokio::test]
    async fn test_search_form_without_keywords() -> Result<()> {
        let (state, site) = indexed_site().await?;
        let module = create_module(&state, "search", json!({})).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("name=\"keywords\""));
        assert!(!html.contains("class=\"result\""));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_results_hide_protected_pages() -> Result<()> {
        let (state, site) = indexed_site().await?;
        let module = create_module(&state, "search", json!({})).await?;
        let fixture = site.fixture(&state, site.home, "/?keywords=websites").await?;

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("Results 1 - 2 of 2"));
        assert!(html.contains("<mark class=\"highlight\">websites</mark>"));
        assert!(html.contains("href=\"/contact.html\""));
        assert!(!html.contains("/members.html"));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_pagination() -> Result<()> {
        let (state, site) = indexed_site().await?;
        let module = create_module(&state, "search", json!({"per_page": 1})).await?;
        let param = format!("page_s{}", module.id());

        let fixture = site
            .fixture(&state, site.home, &format!("/?keywords=websites&{}=2", param))
            .await?;
        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("Results 2 - 2 of 2"));
        assert!(html.contains("<strong class=\"active\">2</strong>"));

        let fixture = site
            .fixture(&state, site.home, &format!("/?keywords=websites&{}=3", param))
            .await?;
        let err = render_module(&fixture, &module).await.unwrap_err();
        assert_eq!(err.downcast_ref::<PageError>(), Some(&PageError::NotFound));
        Ok(())
    }
}
