use anyhow::Result;
use async_trait::async_trait;
use contao_core::models::content_element::ContentElement;
use contao_core::utils::html::escape_html;

use super::{Element, ElementOutcome};
use crate::render::{FrontendTemplate, RenderContext};

pub struct HeadlineElement;

#[async_trait]
impl Element for HeadlineElement {
    fn template(&self) -> &'static str {
        "ce_headline"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        _template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        if element.headline.as_ref().map_or(true, |h| h.is_empty()) {
            return Ok(ElementOutcome::Empty);
        }
        Ok(ElementOutcome::Render)
    }
}

/// Rich text as stored by the editor.
pub struct TextElement;

#[async_trait]
impl Element for TextElement {
    fn template(&self) -> &'static str {
        "ce_text"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        template.set("text", &element.text("text"));
        Ok(ElementOutcome::Render)
    }
}

pub struct HtmlElement;

#[async_trait]
impl Element for HtmlElement {
    fn template(&self) -> &'static str {
        "ce_html"
    }

    fn backend_output(&self, element: &ContentElement) -> Option<String> {
        Some(format!("<pre>{}</pre>", escape_html(&element.text("html"))))
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        template.set("html", &element.text("html"));
        Ok(ElementOutcome::Render)
    }
}

/// Markdown, converted and sanitised by the `markdown` template filter.
pub struct MarkdownElement;

#[async_trait]
impl Element for MarkdownElement {
    fn template(&self) -> &'static str {
        "ce_markdown"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        template.set("markdown", &element.text("markdown"));
        Ok(ElementOutcome::Render)
    }
}

pub struct CodeElement;

#[async_trait]
impl Element for CodeElement {
    fn template(&self) -> &'static str {
        "ce_code"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        template.set("code", &element.text("code"));
        template.set("language", element.text("language").trim());
        Ok(ElementOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::tests::render;
    use crate::test_helpers::{create_test_app_state, TestSite};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_headline_element() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;

        let element = ContentElement::new(1, "headline".to_string(), json!({}))
            .with_headline("h1", "Fish & Chips");
        assert_eq!(
            render(&fixture, &element).await?.trim(),
            "<h1 class=\"ce_headline\">Fish &amp; Chips</h1>"
        );

        let element = ContentElement::new(1, "headline".to_string(), json!({}));
        assert_eq!(render(&fixture, &element).await?, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_html_element_is_escaped_in_backend() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let element = ContentElement::new(1, "html".to_string(), json!({"html": "<em>raw</em>"}));

        let fixture = site.fixture(&state, site.home, "/").await?;
        assert_eq!(render(&fixture, &element).await?.trim(), "<em>raw</em>");

        let fixture = fixture.with_backend_scope();
        assert_eq!(
            render(&fixture, &element).await?,
            "<pre>&lt;em&gt;raw&lt;/em&gt;</pre>"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_markdown_is_sanitised() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;
        let element = ContentElement::new(
            1,
            "markdown".to_string(),
            json!({"markdown": "**bold**\n\n<script>alert(1)</script>"}),
        );

        let html = render(&fixture, &element).await?;
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_code_is_escaped() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;
        let element = ContentElement::new(
            1,
            "code".to_string(),
            json!({"code": "if a < b {}", "language": "rust"}),
        );

        let html = render(&fixture, &element).await?;
        assert!(html.contains("<code class=\"language-rust\">if a &lt; b {}</code>"));
        Ok(())
    }
}
