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
use contao_db::repositories::{ContentRepository, ModuleRepository};

use super::{generate_element, Element, ElementOutcome};
use crate::modules;
use crate::render::{FrontendTemplate, RenderContext};

/// Renders a front-end module inside an article.
pub struct ModuleElement;

#[async_trait]
impl Element for ModuleElement {
    fn template(&self) -> &'static str {
        "ce_html"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        element: &ContentElement,
        _template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        let Some(module_id) = element.number("module") else {
            return Ok(ElementOutcome::Empty);
        };
        let Some(config) = ModuleRepository::new(ctx.db().clone())
            .find_by_id(module_id)
            .await?
        else {
            tracing::warn!(element_id = element.id(), module_id, "Included module does not exist");
            return Ok(ElementOutcome::Empty);
        };
        Ok(ElementOutcome::Replace(modules::generate(ctx, &config).await?))
    }
}

/// Renders another content element in place.
pub struct AliasElement;

#[async_trait]
impl Element for AliasElement {
    fn template(&self) -> &'static str {
        "ce_html"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        element: &ContentElement,
        _template: &mut FrontendTemplate,
        depth: usize,
    ) -> Result<ElementOutcome> {
        let Some(target_id) = element.number("cte_alias") else {
            return Ok(ElementOutcome::Empty);
        };
        if Some(target_id) == element.id {
            return Ok(ElementOutcome::Empty);
        }
        let Some(target) = ContentRepository::new(ctx.db().clone())
            .find_by_id(target_id)
            .await?
        else {
            return Ok(ElementOutcome::Empty);
        };
        let fragment = generate_element(ctx, &target, depth + 1).await?;
        Ok(ElementOutcome::Replace(fragment))
    }
}
