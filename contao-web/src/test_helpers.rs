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

use anyhow::{anyhow, Context, Result};
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use chrono::{Duration, Utc};
use contao_core::models::{
    article::Article,
    content_element::ContentElement,
    layout::Layout,
    member::Member,
    member_group::MemberGroup,
    module_config::ModuleConfig,
    page::{Page, PageType},
    page_details::PageDetails,
    session::Session,
};
use contao_core::navigation::PageTree;
use contao_core::security::{FrontendUser, Scope, TokenChecker};
use contao_db::init_database;
use contao_db::repositories::{
    ArticleRepository, ContentRepository, LayoutRepository, MemberGroupRepository,
    MemberRepository, MemberSessionRepository, ModuleRepository, PageRepository,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::configuration::{Config, MailConfig, ServerConfig, SessionConfig};
use crate::mailer::LogMailer;
use crate::render::{Fragment, Redirection, RenderContext};
use crate::request::FrontendRequest;
use crate::templates::TemplateEngine;
use crate::AppState;

pub const TEST_PASSWORD: &str = "correct-horse";
pub const PREVIEW_TOKEN: &str = "preview-secret";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        session: SessionConfig {
            timeout_minutes: 60,
            secure_cookies: false,
        },
        mail: MailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_tls: false,
            from: "Contao <noreply@example.com>".to_string(),
        },
        database_url: "sqlite::memory:".to_string(),
        templates_dir: None,
        development_mode: false,
        preview_token: Some(PREVIEW_TOKEN.to_string()),
    }
}

pub async fn create_test_app_state() -> Result<AppState> {
    let (state, _) = create_test_app_state_with_mailer().await?;
    Ok(state)
}

/// App state whose mailer keeps the sent messages.
pub async fn create_test_app_state_with_mailer() -> Result<(AppState, Arc<LogMailer>)> {
    let db = init_database("sqlite::memory:").await?;
    let templates = TemplateEngine::builtin()?;
    let mailer = Arc::new(LogMailer::new());
    let state = AppState::new(db, templates, test_config(), mailer.clone());
    Ok((state, mailer))
}

/// A small website:
///
/// ```text
/// Website (root, layout)
/// ├── Home           /
/// ├── About          /about.html
/// │   └── Team       /team.html
/// ├── Contact        /contact.html
/// ├── Members        /members.html (protected, `group`)
/// └── Page not found (error_404)
/// ```
pub struct TestSite {
    pub root: i64,
    pub home: i64,
    pub about: i64,
    pub team: i64,
    pub contact: i64,
    pub members: i64,
    pub error_404: i64,
    pub layout: i64,
    pub group: i64,
}

impl TestSite {
    pub async fn create(state: &AppState) -> Result<Self> {
        let pages = PageRepository::new(state.db.clone());
        let layout = LayoutRepository::new(state.db.clone())
            .create(&Layout::new("Default".to_string()))
            .await?;
        let group = MemberGroupRepository::new(state.db.clone())
            .create(&MemberGroup::new("Members".to_string()))
            .await?;

        let mut root = Page::new_root("Website".to_string(), String::new(), "en".to_string());
        root.include_layout = true;
        root.layout = Some(layout);
        let root = pages.create(&root).await?;

        let mut sorting = 0;
        let mut child = |pid: i64, title: &str| {
            sorting += 128;
            let mut page = Page::new_regular(pid, title.to_string());
            page.sorting = sorting;
            page
        };

        let home = pages.create(&child(root, "Home")).await?;
        let about = pages.create(&child(root, "About")).await?;
        let team = pages.create(&child(about, "Team")).await?;
        let contact = pages.create(&child(root, "Contact")).await?;

        let mut members = child(root, "Members");
        members.protected = true;
        members.groups = vec![group];
        let members = pages.create(&members).await?;

        let mut not_found = child(root, "Page not found");
        not_found.page_type = PageType::Error404;
        let error_404 = pages.create(&not_found).await?;

        let site = Self {
            root,
            home,
            about,
            team,
            contact,
            members,
            error_404,
            layout,
            group,
        };

        site.add_text(state, home, "Welcome", "<p>Welcome to our website</p>").await?;
        site.add_text(state, about, "About us", "<p>We build websites</p>").await?;
        site.add_text(state, members, "Members", "<p>Members only area</p>").await?;
        site.add_text(state, error_404, "Not found", "<p>Nothing to see here</p>").await?;

        Ok(site)
    }

    /// A published article in `main` with one text element.
    pub async fn add_text(&self, state: &AppState, page_id: i64, title: &str, html: &str) -> Result<i64> {
        let article_id = ArticleRepository::new(state.db.clone())
            .create(&Article::new(page_id, title.to_string()))
            .await?;
        ContentRepository::new(state.db.clone())
            .create(&ContentElement::new(
                article_id,
                "text".to_string(),
                json!({ "text": html }),
            ))
            .await?;
        Ok(article_id)
    }

    /// Place a module into a column of the site layout.
    pub async fn place_module(&self, state: &AppState, module_id: i64, column: &str) -> Result<()> {
        let layouts = LayoutRepository::new(state.db.clone());
        let mut layout = layouts
            .find_by_id(self.layout)
            .await?
            .context("Test layout is missing")?;
        layout
            .modules
            .push(contao_core::models::layout::LayoutModule::new(module_id, column));
        layouts.update(&layout).await
    }

    /// Load the page tree and build a fixture for a page.
    pub async fn fixture(&self, state: &AppState, page_id: i64, path: &str) -> Result<Fixture> {
        let tree = PageTree::new(PageRepository::new(state.db.clone()).find_all().await?);
        let details = tree.details(page_id, Utc::now())?;
        Ok(Fixture {
            state: state.clone(),
            tree,
            details,
            checker: TokenChecker::anonymous(),
            request: test_request(Method::GET, path, ""),
            token: "ab".repeat(32),
            scope: Scope::Frontend,
        })
    }
}

pub async fn create_module(state: &AppState, module_type: &str, data: Value) -> Result<ModuleConfig> {
    let mut module = ModuleConfig::new(format!("Test {}", module_type), module_type.to_string(), data);
    let id = ModuleRepository::new(state.db.clone()).create(&module).await?;
    module.id = Some(id);
    Ok(module)
}

/// An active member with the given groups and password [`TEST_PASSWORD`].
pub async fn create_member(state: &AppState, username: &str, groups: Vec<i64>) -> Result<Member> {
    let mut member = Member::new(
        username.to_string(),
        format!("{}@example.com", username),
        TEST_PASSWORD,
    )?;
    member.firstname = "Test".to_string();
    member.lastname = "Member".to_string();
    member.groups = groups;
    let id = MemberRepository::new(state.db.clone()).create(&member).await?;
    member.id = Some(id);
    Ok(member)
}

/// A stored session for the member, as the session cookie would carry it.
pub async fn login(state: &AppState, member: &Member) -> Result<FrontendUser> {
    let session = Session::new(member.id(), Duration::hours(1));
    MemberSessionRepository::new(state.db.clone())
        .create(&session)
        .await?;
    Ok(FrontendUser {
        member: member.clone(),
        groups: member.groups.clone(),
        session_id: session.id,
    })
}

pub fn test_request(method: Method, uri: &str, body: &str) -> FrontendRequest {
    let mut headers = HeaderMap::new();
    headers.insert(header::HOST, HeaderValue::from_static("localhost"));
    let uri: Uri = uri.parse().unwrap_or_else(|_| Uri::from_static("/"));
    FrontendRequest::from_parts(method, &uri, &headers, body.as_bytes())
}

/// Everything a [`RenderContext`] borrows, owned in one place.
pub struct Fixture {
    pub state: AppState,
    pub tree: PageTree,
    pub details: PageDetails,
    pub checker: TokenChecker,
    pub request: FrontendRequest,
    pub token: String,
    pub scope: Scope,
}

impl Fixture {
    pub fn context(&self) -> RenderContext<'_> {
        RenderContext {
            state: &self.state,
            tree: &self.tree,
            page: &self.details,
            checker: &self.checker,
            request: &self.request,
            scope: self.scope,
            now: Utc::now(),
            request_token: &self.token,
        }
    }

    pub fn with_user(mut self, user: FrontendUser) -> Self {
        self.checker = TokenChecker::new(Some(user), self.checker.is_preview_mode());
        self
    }

    pub fn with_preview(mut self) -> Self {
        self.checker = TokenChecker::new(self.checker.user().cloned(), true);
        self
    }

    pub fn with_backend_scope(mut self) -> Self {
        self.scope = Scope::Backend;
        self
    }

    /// Replace the request, e.g. with a form submission.
    pub fn with_request(mut self, method: Method, uri: &str, body: &str) -> Self {
        self.request = test_request(method, uri, body);
        self
    }
}

/// Render a module and expect HTML.
pub async fn render_module(fixture: &Fixture, config: &ModuleConfig) -> Result<String> {
    match crate::modules::generate(&fixture.context(), config).await? {
        Fragment::Html(html) => Ok(html),
        Fragment::Redirect(r) => Err(anyhow!("unexpected redirect to {}", r.url)),
    }
}

/// Render a module and expect a redirect.
pub async fn module_redirect(fixture: &Fixture, config: &ModuleConfig) -> Result<Redirection> {
    match crate::modules::generate(&fixture.context(), config).await? {
        Fragment::Redirect(redirect) => Ok(redirect),
        Fragment::Html(html) => Err(anyhow!("expected a redirect, got {}", html)),
    }
}
