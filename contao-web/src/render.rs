//! Shared rendering context for front-end modules, articles and content elements.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contao_core::models::headline::{CssId, Headline};
use contao_core::models::member::Member;
use contao_core::models::page_details::PageDetails;
use contao_core::navigation::{NavItem, Navigator, PageTree};
use contao_core::security::{Scope, TokenChecker};
use contao_core::visibility::Publishable;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::csrf::REQUEST_TOKEN_FIELD;
use crate::request::{FrontendRequest, FORM_SUBMIT};
use crate::AppState;

/// Change to the member session requested by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Start(String),
    End,
}

/// A 303 redirect requested while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub url: String,
    pub session: Option<SessionChange>,
}

impl Redirection {
    pub fn to(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            session: None,
        }
    }

    pub fn with_session(mut self, change: SessionChange) -> Self {
        self.session = Some(change);
        self
    }
}

/// Output of a module, article or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Html(String),
    Redirect(Redirection),
}

impl Fragment {
    pub fn empty() -> Self {
        Fragment::Html(String::new())
    }
}

/// A named template with its variables.
#[derive(Debug, Clone)]
pub struct FrontendTemplate {
    name: String,
    context: tera::Context,
}

impl FrontendTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context: tera::Context::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    pub fn context(&self) -> &tera::Context {
        &self.context
    }

    /// Variables every module and element template can rely on.
    pub fn bind_base(&mut self, base_class: &str, headline: Option<&Headline>, css: &CssId) {
        let headline = headline.filter(|h| !h.is_empty());
        self.set("headline", headline.map(|h| h.value.as_str()).unwrap_or(""));
        self.set("hl", headline.map(|h| h.tag()).unwrap_or("h2"));
        self.set("css_id", css.id.trim());
        self.set("class", &css.class_list(base_class));
    }
}

/// Everything a module or element needs to know about the current request.
pub struct RenderContext<'a> {
    pub state: &'a AppState,
    pub tree: &'a PageTree,
    pub page: &'a PageDetails,
    pub checker: &'a TokenChecker,
    pub request: &'a FrontendRequest,
    pub scope: Scope,
    pub now: DateTime<Utc>,
    pub request_token: &'a str,
}

impl<'a> RenderContext<'a> {
    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn navigator(&self) -> Navigator<'a> {
        Navigator::new(self.tree, self.page, self.checker, self.now)
    }

    pub fn member(&self) -> Option<&Member> {
        self.checker.member()
    }

    pub fn is_preview(&self) -> bool {
        self.checker.is_preview_mode()
    }

    /// Publication check that lets previews see everything.
    pub fn is_visible<P: Publishable + ?Sized>(&self, item: &P) -> bool {
        self.is_preview() || item.is_visible_at(self.now)
    }

    pub fn current_url(&self) -> String {
        self.tree.url_of(&self.page.page)
    }

    /// Link target of a page by id, `None` when it is gone or leads nowhere.
    pub fn page_href(&self, id: i64) -> Option<String> {
        let page = self.tree.get(id)?;
        self.navigator().href(page)
    }

    pub fn render(&self, template: &FrontendTemplate) -> Result<String> {
        self.state.templates.render(template.name(), template.context())
    }

    /// Bind what every form needs: its id, the request token and its action.
    pub fn bind_form(&self, template: &mut FrontendTemplate, form_id: &str) {
        template.set("form_id", form_id);
        template.set("form_submit_field", FORM_SUBMIT);
        template.set("request_token_field", REQUEST_TOKEN_FIELD);
        template.set("request_token", self.request_token);
        template.set("action", &self.request.request_uri());
    }

    /// Render menu items with the item template, one level per call.
    pub fn render_nav(&self, template_name: &str, items: &[NavItem]) -> Result<String> {
        if items.is_empty() {
            return Ok(String::new());
        }
        let template_name = self.state.templates.pick(template_name, "nav_default");

        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            let mut value = serde_json::to_value(item).context("Failed to serialize menu item")?;
            let subitems = self.render_nav(&template_name, &item.children)?;
            if let Value::Object(map) = &mut value {
                map.remove("children");
                map.insert("subitems".to_string(), Value::String(subitems));
            }
            rendered.push(value);
        }

        let mut template = FrontendTemplate::new(template_name);
        template.set("items", &rendered);
        template.set("level", &format!("level_{}", items[0].level));
        self.render(&template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_app_state, TestSite};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bind_base_defaults() {
        let mut template = FrontendTemplate::new("ce_text");
        template.bind_base("ce_text", Some(&Headline::new("h9", " ")), &CssId::new(" intro ", "wide"));
        let ctx = template.context();
        assert_eq!(ctx.get("headline"), Some(&Value::String(String::new())));
        assert_eq!(ctx.get("hl"), Some(&Value::String("h2".to_string())));
        assert_eq!(ctx.get("css_id"), Some(&Value::String("intro".to_string())));
        assert_eq!(ctx.get("class"), Some(&Value::String("ce_text wide".to_string())));
    }

    #[test]
    fn test_redirection_builder() {
        let redirect = Redirection::to("/home.html").with_session(SessionChange::End);
        assert_eq!(redirect.url, "/home.html");
        assert_eq!(redirect.session, Some(SessionChange::End));
        assert_eq!(Fragment::empty(), Fragment::Html(String::new()));
    }

    #[tokio::test]
    async fn test_render_nav_nests_levels() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let fixture = site.fixture(&state, site.about, "/about.html").await?;
        let ctx = fixture.context();

        let options = contao_core::navigation::NavigationOptions::default();
        let items = ctx.navigator().navigation(&options, None);
        let html = ctx.render_nav("nav_default", &items)?;

        assert!(html.contains("<ul class=\"level_1\">"));
        assert!(html.contains("<ul class=\"level_2\">"));
        assert!(html.contains("Team"));
        assert!(html.contains("<strong class=\"submenu active\">"));
        Ok(())
    }
}
