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
use contao_core::models::content_element::ContentElement;

use super::{Element, ElementOutcome};
use crate::render::{FrontendTemplate, RenderContext};

pub struct HyperlinkElement;

#[async_trait]
impl Element for HyperlinkElement {
    fn template(&self) -> &'static str {
        "ce_hyperlink"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        let url = element.text("url");
        let url = url.trim();
        if url.is_empty() {
            return Ok(ElementOutcome::Empty);
        }
        if url.to_ascii_lowercase().starts_with("javascript:") {
            tracing::warn!(element_id = element.id(), "Refusing script URL in hyperlink");
            return Ok(ElementOutcome::Empty);
        }

        let title = element.text("link_title");
        let link = if title.trim().is_empty() { url.to_string() } else { title };
        template.set("href", url);
        template.set("link", &link);
        template.set("title_text", &element.text("title_text"));
        template.set("rel", element.text("rel").trim());
        template.set("target_blank", &element.flag("target_blank"));
        Ok(ElementOutcome::Render)
    }
}

/// "Back to top" link to the current page.
pub struct ToplinkElement;

#[async_trait]
impl Element for ToplinkElement {
    fn template(&self) -> &'static str {
        "ce_toplink"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        let title = element.text("link_title");
        let link = if title.trim().is_empty() { "Go to top".to_string() } else { title };
        template.set("href", &ctx.request.request_uri());
        template.set("link", &link);
        Ok(ElementOutcome::Render)
    }
}
