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

//! Content elements, the building blocks of articles.

use anyhow::Result;
use async_trait::async_trait;
use contao_core::models::content_element::ContentElement;
use futures::future::{BoxFuture, FutureExt};

use crate::render::{Fragment, FrontendTemplate, RenderContext};

pub mod include;
pub mod links;
pub mod list;
pub mod text;

/// How deep `module` and `alias` elements may nest.
pub const MAX_DEPTH: usize = 8;

#[derive(Debug)]
pub enum ElementOutcome {
    Render,
    Empty,
    /// Output produced elsewhere, e.g. by an included module.
    Replace(Fragment),
}

#[async_trait]
pub trait Element: Send + Sync {
    fn template(&self) -> &'static str;

    /// Output in back-end scope instead of rendering the template.
    fn backend_output(&self, _element: &ContentElement) -> Option<String> {
        None
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        depth: usize,
    ) -> Result<ElementOutcome>;
}

pub fn element_for(element_type: &str) -> Option<Box<dyn Element>> {
    let element: Box<dyn Element> = match element_type {
        "headline" => Box::new(text::HeadlineElement),
        "text" => Box::new(text::TextElement),
        "html" => Box::new(text::HtmlElement),
        "markdown" => Box::new(text::MarkdownElement),
        "code" => Box::new(text::CodeElement),
        "list" => Box::new(list::ListElement),
        "table" => Box::new(list::TableElement),
        "hyperlink" => Box::new(links::HyperlinkElement),
        "toplink" => Box::new(links::ToplinkElement),
        "module" => Box::new(include::ModuleElement),
        "alias" => Box::new(include::AliasElement),
        _ => return None,
    };
    Some(element)
}

/// Render a content element. `depth` counts the enclosing includes.
pub fn generate_element<'a>(
    ctx: &'a RenderContext<'_>,
    element: &'a ContentElement,
    depth: usize,
) -> BoxFuture<'a, Result<Fragment>> {
    async move {
        if depth > MAX_DEPTH {
            tracing::warn!(element_id = element.id(), depth, "Element nesting too deep");
            return Ok(Fragment::empty());
        }
        let Some(handler) = element_for(&element.element_type) else {
            tracing::warn!(
                element_id = element.id(),
                element_type = %element.element_type,
                "Unknown element type"
            );
            return Ok(Fragment::empty());
        };

        if !ctx.is_visible(element) || !ctx.checker.is_granted(element) {
            return Ok(Fragment::empty());
        }

        if ctx.scope.is_backend() {
            if let Some(html) = handler.backend_output(element) {
                return Ok(Fragment::Html(html));
            }
        }

        let base = format!("ce_{}", element.element_type);
        let mut template = FrontendTemplate::new(handler.template());
        template.bind_base(&base, element.headline.as_ref(), &element.css);
        template.set("type", &element.element_type);
        template.set("id", &element.id());

        match handler.compile(ctx, element, &mut template, depth).await? {
            ElementOutcome::Render => Ok(Fragment::Html(ctx.render(&template)?)),
            ElementOutcome::Empty => Ok(Fragment::empty()),
            ElementOutcome::Replace(fragment) => Ok(fragment),
        }
    }
    .boxed()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_helpers::{create_test_app_state, Fixture, TestSite};
    use anyhow::anyhow;
    use contao_core::models::content_element::ELEMENT_TYPES;
    use contao_db::repositories::ContentRepository;
    use serde_json::json;

    /// Render an element and expect HTML.
    pub(crate) async fn render(fixture: &Fixture, element: &ContentElement) -> Result<String> {
        match generate_element(&fixture.context(), element, 0).await? {
            Fragment::Html(html) => Ok(html),
            Fragment::Redirect(r) => Err(anyhow!("unexpected redirect to {}", r.url)),
        }
    }

    #[test]
    fn test_every_element_type_is_registered() {
        for element_type in ELEMENT_TYPES {
            assert!(element_for(element_type).is_some(), "{} is not registered", element_type);
        }
        assert!(element_for("gallery").is_none());
    }

    #[tokio::test]
    async fn test_invisible_and_protected_elements_are_hidden() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;

        let mut element = ContentElement::new(1, "text".to_string(), json!({"text": "<p>Hidden</p>"}));
        element.invisible = true;
        assert_eq!(render(&fixture, &element).await?, "");

        let fixture = fixture.with_preview();
        assert!(render(&fixture, &element).await?.contains("<p>Hidden</p>"));

        let mut element = ContentElement::new(1, "text".to_string(), json!({"text": "<p>Staff</p>"}));
        element.protected = true;
        element.groups = vec![site.group];
        assert_eq!(render(&fixture, &element).await?, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_css_class_and_headline_are_bound() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;
        let article = site.add_text(&state, site.about, "Story", "<p>Once</p>").await?;

        let mut element = ContentElement::new(article, "text".to_string(), json!({"text": "<p>Upon</p>"}))
            .with_headline("h3", "Chapter one");
        element.css.class = "intro".to_string();
        element.id = Some(ContentRepository::new(state.db.clone()).create(&element).await?);

        let html = render(&fixture, &element).await?;
        assert!(html.starts_with("<div class=\"ce_text intro\">"));
        assert!(html.contains("<h3>Chapter one</h3>"));
        assert!(html.contains("<p>Upon</p>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_type_is_empty() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;
        let element = ContentElement::new(1, "gallery".to_string(), json!({}));

        assert_eq!(render(&fixture, &element).await?, "");
        Ok(())
    }
}
