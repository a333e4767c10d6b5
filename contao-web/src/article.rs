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

//! Articles placed in a layout column.

use anyhow::Result;
use contao_core::models::article::Article;
use contao_core::routing::article_url;
use contao_db::repositories::{ArticleRepository, ContentRepository};

use crate::elements::generate_element;
use crate::error::PageError;
use crate::render::{Fragment, FrontendTemplate, RenderContext};

/// Render the articles of the current page in one column.
///
/// With an `article_key` (from `/<alias>/articles/<key>`) only that article is
/// shown in the main column; a key that matches nothing is a 404.
pub async fn render_column(
    ctx: &RenderContext<'_>,
    column: &str,
    article_key: Option<&str>,
) -> Result<Fragment> {
    let articles = ArticleRepository::new(ctx.db().clone());
    let page_id = ctx.page.page.id();

    if let (Some(key), "main") = (article_key, column) {
        let article = articles
            .find_by_key(page_id, key)
            .await?
            .filter(|a| a.in_column == column && ctx.is_visible(a));
        let Some(article) = article else {
            tracing::debug!(page_id, key, "Article not found");
            return Err(PageError::NotFound.into());
        };
        if !ctx.checker.is_granted(&article) {
            return Err(if ctx.checker.has_frontend_user() {
                PageError::Forbidden
            } else {
                PageError::Unauthorized
            }
            .into());
        }
        return render_article(ctx, &article, Some(ctx.current_url())).await;
    }

    let visible: Vec<Article> = articles
        .find_by_page(page_id)
        .await?
        .into_iter()
        .filter(|a| a.in_column == column)
        .filter(|a| ctx.is_visible(a) && ctx.checker.is_granted(a))
        .collect();
    let multi_mode = visible.len() > 1;

    let mut html = String::new();
    for article in &visible {
        let fragment = if multi_mode && article.show_teaser {
            render_teaser(ctx, article)?
        } else {
            render_article(ctx, article, None).await?
        };
        match fragment {
            Fragment::Html(part) => html.push_str(&part),
            redirect @ Fragment::Redirect(_) => return Ok(redirect),
        }
    }
    Ok(Fragment::Html(html))
}

/// Full article with its content elements.
pub async fn render_article(
    ctx: &RenderContext<'_>,
    article: &Article,
    back_href: Option<String>,
) -> Result<Fragment> {
    let elements = ContentRepository::new(ctx.db().clone())
        .find_by_article(article.id())
        .await?;

    let mut content = String::new();
    for element in &elements {
        match generate_element(ctx, element, 0).await? {
            Fragment::Html(part) => content.push_str(&part),
            redirect @ Fragment::Redirect(_) => return Ok(redirect),
        }
    }

    let mut template = FrontendTemplate::new("mod_article");
    template.set("class", &article.css.class_list("mod_article"));
    template.set("css_id", &article.html_id());
    template.set("elements", &content);
    template.set("back_href", &back_href.unwrap_or_default());
    Ok(Fragment::Html(ctx.render(&template)?))
}

fn render_teaser(ctx: &RenderContext<'_>, article: &Article) -> Result<Fragment> {
    let mut template = FrontendTemplate::new("mod_article_teaser");
    template.set("class", &article.css.class_list("mod_article"));
    template.set("css_id", &article.html_id());
    template.set("title", &article.title);
    template.set("teaser", article.teaser.as_deref().unwrap_or(""));
    template.set("href", &article_url(&ctx.page.page, article, &ctx.page.url_suffix));
    Ok(Fragment::Html(ctx.render(&template)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_app_state, Fixture, TestSite};
    use contao_core::models::content_element::ContentElement;
    use serde_json::json;

    async fn column(fixture: &Fixture, column: &str, key: Option<&str>) -> Result<String> {
        match render_column(&fixture.context(), column, key).await? {
            Fragment::Html(html) => Ok(html),
            Fragment::Redirect(r) => Err(anyhow::anyhow!("unexpected redirect to {}", r.url)),
        }
    }

    #[tokio::test]
    async fn test_main_column_renders_article_elements() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;

        let html = column(&fixture, "main", None).await?;
        assert!(html.contains("<div class=\"mod_article\" id=\"about-us\">"));
        assert!(html.contains("<p>We build websites</p>"));
        assert_eq!(column(&fixture, "left", None).await?, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_teasers_in_multi_article_mode() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let articles = ArticleRepository::new(state.db.clone());
        let mut history = Article::new(site.about, "History".to_string());
        history.sorting = 256;
        history.show_teaser = true;
        history.teaser = Some("<p>Since 2005</p>".to_string());
        let history_id = articles.create(&history).await?;
        ContentRepository::new(state.db.clone())
            .create(&ContentElement::new(history_id, "text".to_string(), json!({"text": "<p>The full story</p>"})))
            .await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;

        let html = column(&fixture, "main", None).await?;
        assert!(html.contains("<p>We build websites</p>"));
        assert!(html.contains("<p>Since 2005</p>"));
        assert!(html.contains("href=\"/about/articles/history.html\""));
        assert!(!html.contains("The full story"));

        let html = column(&fixture, "main", Some("history")).await?;
        assert!(html.contains("The full story"));
        assert!(html.contains("<a href=\"/about.html\" title=\"Go back\">"));
        assert!(!html.contains("We build websites"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_article_is_not_found() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.about, "/about/articles/missing.html").await?;

        let err = render_column(&fixture.context(), "main", Some("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<PageError>(), Some(&PageError::NotFound));
        Ok(())
    }
}
