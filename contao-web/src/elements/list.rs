use anyhow::Result;
use async_trait::async_trait;
use contao_core::models::content_element::ContentElement;

use super::{Element, ElementOutcome};
use crate::render::{FrontendTemplate, RenderContext};

pub struct ListElement;

#[async_trait]
impl Element for ListElement {
    fn template(&self) -> &'static str {
        "ce_list"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        let items = element.strings("items");
        if items.is_empty() {
            return Ok(ElementOutcome::Empty);
        }
        template.set("ordered", &(element.text("list_type") == "ordered"));
        template.set("items", &items);
        Ok(ElementOutcome::Render)
    }
}

/// A table from rows of cells; the first and last row can become the header and footer.
pub struct TableElement;

impl TableElement {
    fn rows(element: &ContentElement) -> Vec<Vec<String>> {
        element
            .data
            .get("rows")
            .and_then(|v| v.as_array())
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.as_array())
                    .map(|cells| {
                        cells
                            .iter()
                            .map(|cell| match cell {
                                serde_json::Value::String(s) => s.clone(),
                                serde_json::Value::Null => String::new(),
                                other => other.to_string(),
                            })
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Element for TableElement {
    fn template(&self) -> &'static str {
        "ce_table"
    }

    async fn compile(
        &self,
        _ctx: &RenderContext<'_>,
        element: &ContentElement,
        template: &mut FrontendTemplate,
        _depth: usize,
    ) -> Result<ElementOutcome> {
        let mut rows = Self::rows(element);
        let header = if element.flag("thead") && !rows.is_empty() {
            rows.remove(0)
        } else {
            Vec::new()
        };
        let footer = if element.flag("tfoot") && !rows.is_empty() {
            rows.pop().unwrap_or_default()
        } else {
            Vec::new()
        };

        template.set("summary", &element.text("summary"));
        template.set("header", &header);
        template.set("rows", &rows);
        template.set("footer", &footer);
        Ok(ElementOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::tests::render;
    use crate::test_helpers::{create_test_app_state, TestSite};
    use serde_json::json;

    #[tokio::test]
    async fn test_ordered_list() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;
        let element = ContentElement::new(
            1,
            "list".to_string(),
            json!({"list_type": "ordered", "items": ["One", "Two <b>"]}),
        );

        let html = render(&fixture, &element).await?;
        assert!(html.contains("<ol>"));
        assert!(html.contains("<li>Two &lt;b&gt;</li>"));

        let empty = ContentElement::new(1, "list".to_string(), json!({"items": []}));
        assert_eq!(render(&fixture, &empty).await?, "");
        Ok(())
    }

    #[tokio::test]
    async fn test_table_with_header_and_footer() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;
        let element = ContentElement::new(
            1,
            "table".to_string(),
            json!({
                "thead": true,
                "tfoot": true,
                "summary": "Opening hours",
                "rows": [["Day", "Hours"], ["Mon", "9-17"], ["Tue", 10], ["Total", "2 days"]]
            }),
        );

        let html = render(&fixture, &element).await?;
        assert!(html.contains("aria-label=\"Opening hours\""));
        assert!(html.contains("<th>Day</th>"));
        assert!(html.contains("<tr class=\"row_1\">"));
        assert!(html.contains("<td>10</td>"));
        assert!(html.contains("<tfoot>"));
        assert!(!html.contains("<tr class=\"row_2\">"));
        Ok(())
    }
}
