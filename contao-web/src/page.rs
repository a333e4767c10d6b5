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

//! Page assembly: resolve the requested page, check access, run the layout
//! modules and render the page template.

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use contao_core::models::article::COLUMNS;
use contao_core::models::module_config::ModuleConfig;
use contao_core::models::page::{Page, PageType, RedirectType};
use contao_core::models::page_details::PageDetails;
use contao_core::navigation::{Navigator, PageTree};
use contao_core::routing::{article_url, resolve_path, INDEX_ALIAS};
use contao_core::security::{Scope, TokenChecker};
use contao_core::visibility::Publishable;
use contao_db::repositories::{
    ArticleRepository, LayoutRepository, MemberSessionRepository, ModuleRepository,
    PageRepository,
};
use std::collections::{BTreeMap, HashMap};

use crate::article;
use crate::auth::{session_cookie, session_cookie_removal, OptionalMember, PreviewMode};
use crate::csrf::{RequestToken, REQUEST_TOKEN_FIELD};
use crate::error::{AppError, PageError};
use crate::indexer;
use crate::modules;
use crate::render::{Fragment, FrontendTemplate, Redirection, RenderContext, SessionChange};
use crate::request::FrontendRequest;
use crate::AppState;

/// What a page request ends in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResponse {
    Html { status: StatusCode, html: String },
    Redirect { status: StatusCode, redirection: Redirection },
}

impl PageResponse {
    fn redirect(status: StatusCode, url: impl Into<String>) -> Self {
        PageResponse::Redirect {
            status,
            redirection: Redirection::to(url),
        }
    }
}

/// Everything known about one front-end request.
pub struct PageRequest {
    pub state: AppState,
    pub tree: PageTree,
    pub checker: TokenChecker,
    pub request: FrontendRequest,
    pub request_token: String,
    pub now: DateTime<Utc>,
}

impl PageRequest {
    pub async fn load(
        state: AppState,
        checker: TokenChecker,
        request: FrontendRequest,
        request_token: String,
    ) -> Result<Self> {
        let pages = PageRepository::new(state.db.clone()).find_all().await?;
        Ok(Self {
            state,
            tree: PageTree::new(pages),
            checker,
            request,
            request_token,
            now: Utc::now(),
        })
    }

    fn context<'a>(&'a self, details: &'a PageDetails) -> RenderContext<'a> {
        RenderContext {
            state: &self.state,
            tree: &self.tree,
            page: details,
            checker: &self.checker,
            request: &self.request,
            scope: Scope::Frontend,
            now: self.now,
            request_token: &self.request_token,
        }
    }

    fn preview(&self) -> bool {
        self.checker.is_preview_mode()
    }

    /// Handle the request, turning page errors into the error pages of the root.
    pub async fn respond(&self) -> Result<PageResponse> {
        let Some(root) = self.tree.root_for_host(self.request.host_name()).cloned() else {
            tracing::warn!(host = %self.request.host_name(), "No website root for host");
            return self.plain_error(&PageError::NotFound);
        };

        match self.dispatch(&root).await {
            Ok(response) => Ok(response),
            Err(err) => match err.downcast_ref::<PageError>().cloned() {
                Some(PageError::BadRequest(_)) | None => Err(err),
                Some(page_error) => self.error_page(&root, &page_error).await,
            },
        }
    }

    /// Find the page a path addresses inside the root.
    fn resolve(&self, root: &Page) -> Result<(Page, Option<String>), PageError> {
        let start_page = || {
            self.tree
                .first_regular_child(root.id(), self.now, self.preview())
                .cloned()
                .ok_or(PageError::NotFound)
        };

        match resolve_path(&self.request.path, &root.url_suffix) {
            None if self.request.path.trim_start_matches('/').is_empty() => Ok((start_page()?, None)),
            None => Err(PageError::NotFound),
            Some(resolved) if resolved.alias == INDEX_ALIAS => Ok((start_page()?, resolved.article)),
            Some(resolved) if resolved.alias == root.alias => Ok((root.clone(), resolved.article)),
            Some(resolved) => {
                let page = self
                    .tree
                    .find_by_alias(root.id(), &resolved.alias)
                    .cloned()
                    .ok_or(PageError::NotFound)?;
                Ok((page, resolved.article))
            }
        }
    }

    async fn dispatch(&self, root: &Page) -> Result<PageResponse> {
        let (page, article_key) = self.resolve(root)?;
        let details = self.tree.details(page.id(), self.now)?;

        if !self.preview() && !details.is_public {
            tracing::debug!(page_id = page.id(), "Page is not published");
            return Err(PageError::NotFound.into());
        }
        if !self.checker.is_granted(&details) {
            return Err(if self.checker.has_frontend_user() {
                PageError::Forbidden
            } else {
                PageError::Unauthorized
            }
            .into());
        }

        let navigator = Navigator::new(&self.tree, &details, &self.checker, self.now);
        match page.page_type {
            PageType::Forward => {
                let target = navigator.forward_target(&page).ok_or_else(|| {
                    tracing::warn!(page_id = page.id(), "Forward page without target");
                    PageError::NotFound
                })?;
                let status = match page.redirect {
                    RedirectType::Permanent => StatusCode::MOVED_PERMANENTLY,
                    RedirectType::Temporary => StatusCode::SEE_OTHER,
                };
                Ok(PageResponse::redirect(status, self.tree.url_of(target)))
            }
            PageType::Redirect => {
                let url = page
                    .url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or(PageError::NotFound)?;
                let status = match page.redirect {
                    RedirectType::Permanent => StatusCode::MOVED_PERMANENTLY,
                    RedirectType::Temporary => StatusCode::FOUND,
                };
                Ok(PageResponse::redirect(status, url))
            }
            PageType::Root => {
                let target = self
                    .tree
                    .first_regular_child(page.id(), self.now, self.preview())
                    .ok_or(PageError::NotFound)?;
                Ok(PageResponse::redirect(StatusCode::SEE_OTHER, self.tree.url_of(target)))
            }
            PageType::Logout => {
                let target = page
                    .jump_to
                    .and_then(|id| self.tree.get(id))
                    .and_then(|target| navigator.href(target))
                    .unwrap_or_else(|| "/".to_string());
                Ok(PageResponse::Redirect {
                    status: StatusCode::SEE_OTHER,
                    redirection: Redirection::to(target).with_session(SessionChange::End),
                })
            }
            PageType::Regular | PageType::Error401 | PageType::Error403 | PageType::Error404 => {
                self.render(&details, article_key.as_deref(), StatusCode::OK).await
            }
        }
    }

    /// Render a page through its layout.
    async fn render(
        &self,
        details: &PageDetails,
        article_key: Option<&str>,
        status: StatusCode,
    ) -> Result<PageResponse> {
        let layout_id = details
            .layout
            .ok_or_else(|| anyhow!("No layout assigned to page {}", details.id()))?;
        let layout = LayoutRepository::new(self.state.db.clone())
            .find_by_id(layout_id)
            .await?
            .with_context(|| format!("Layout {} does not exist", layout_id))?;
        let module_configs: HashMap<i64, ModuleConfig> = ModuleRepository::new(self.state.db.clone())
            .find_all()
            .await?
            .into_iter()
            .map(|m| (m.id(), m))
            .collect();

        // Single articles are shown through the main column only.
        if article_key.is_some()
            && !layout
                .active_modules()
                .any(|m| m.is_article_placeholder() && m.column == "main")
        {
            tracing::debug!(layout_id, page_id = details.id(), "Layout shows no articles in main");
            return Err(PageError::NotFound.into());
        }

        let ctx = self.context(details);
        let mut sections: BTreeMap<&str, String> =
            COLUMNS.iter().map(|column| (*column, String::new())).collect();

        for placement in layout.active_modules() {
            let fragment = if placement.is_article_placeholder() {
                article::render_column(&ctx, &placement.column, article_key).await?
            } else {
                let Some(config) = module_configs.get(&placement.module_id) else {
                    tracing::warn!(
                        layout_id,
                        module_id = placement.module_id,
                        "Layout references a missing module"
                    );
                    continue;
                };
                modules::generate(&ctx, config).await?
            };

            match fragment {
                Fragment::Html(html) => {
                    if let Some(section) = sections.get_mut(placement.column.as_str()) {
                        section.push_str(&html);
                    }
                }
                Fragment::Redirect(redirection) => {
                    return Ok(PageResponse::Redirect {
                        status: StatusCode::SEE_OTHER,
                        redirection,
                    });
                }
            }
        }

        let page = &details.page;
        let body_class = [layout.css_class.trim(), page.css_class.trim()]
            .iter()
            .filter(|c| !c.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        let mut template = FrontendTemplate::new(self.state.templates.pick(&layout.template, "fe_page"));
        template.set("page", page);
        template.set("language", &details.language);
        template.set("page_title", page.display_title());
        template.set("root_title", &details.root_title);
        template.set("robots", &page.robots);
        template.set("description", page.description.as_deref().unwrap_or(""));
        template.set("body_class", &body_class);
        template.set("sections", &sections);
        template.set("member", &ctx.member());
        template.set("request_token", &self.request_token);
        let html = ctx.render(&template)?;

        if status == StatusCode::OK {
            self.index(details, article_key, &html).await;
        }
        Ok(PageResponse::Html { status, html })
    }

    async fn index(&self, details: &PageDetails, article_key: Option<&str>, html: &str) {
        if self.request.method != Method::GET || self.request.raw_query.is_some() {
            return;
        }
        if !indexer::is_indexable(details, self.checker.has_frontend_user(), self.preview()) {
            return;
        }
        let indexed = match self.canonical_url(details, article_key).await {
            Ok(url) => indexer::index_page(&self.state.db, details, &url, html, self.now).await,
            Err(e) => Err(e),
        };
        if let Err(e) = indexed {
            tracing::warn!(url = %self.request.path, "Failed to index page: {:#}", e);
        }
    }

    /// The URL a page is indexed under, whichever alias the request used.
    async fn canonical_url(&self, details: &PageDetails, article_key: Option<&str>) -> Result<String> {
        let Some(key) = article_key else {
            return Ok(self.tree.url_of(&details.page));
        };
        let article = ArticleRepository::new(self.state.db.clone())
            .find_by_key(details.id(), key)
            .await?
            .with_context(|| format!("Article {} of page {} does not exist", key, details.id()))?;
        Ok(article_url(&details.page, &article, &details.url_suffix))
    }

    /// The root's error page for `error`, or the plain error template.
    async fn error_page(&self, root: &Page, error: &PageError) -> Result<PageResponse> {
        let page_type = match error {
            PageError::NotFound => PageType::Error404,
            PageError::Unauthorized => PageType::Error401,
            PageError::Forbidden => PageType::Error403,
            PageError::BadRequest(_) => return self.plain_error(error),
        };
        let Some(error_page) = self
            .tree
            .children(root.id())
            .find(|p| p.page_type == page_type && (self.preview() || p.is_visible_at(self.now)))
            .cloned()
        else {
            return self.plain_error(error);
        };
        let details = self.tree.details(error_page.id(), self.now)?;

        if page_type == PageType::Error401 && error_page.auto_forward {
            let navigator = Navigator::new(&self.tree, &details, &self.checker, self.now);
            if let Some(href) = error_page
                .jump_to
                .and_then(|id| self.tree.get(id))
                .and_then(|target| navigator.href(target))
            {
                let query = serde_urlencoded::to_string([("redirect", self.request.request_uri())])
                    .context("Failed to encode redirect target")?;
                return Ok(PageResponse::redirect(
                    StatusCode::SEE_OTHER,
                    format!("{}?{}", href, query),
                ));
            }
        }

        match self.render(&details, None, error.status()).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!(page_id = error_page.id(), "Failed to render error page: {:#}", e);
                self.plain_error(error)
            }
        }
    }

    fn plain_error(&self, error: &PageError) -> Result<PageResponse> {
        let status = error.status();
        let mut template = FrontendTemplate::new("error");
        template.set("status", &status.as_u16());
        template.set("message", &error.to_string());
        let html = self
            .state
            .templates
            .render(template.name(), template.context())?;
        Ok(PageResponse::Html { status, html })
    }
}

fn redirect_response(status: StatusCode, url: &str) -> Response {
    (status, [(header::LOCATION, url.to_string())]).into_response()
}

/// Catch-all handler for front-end pages (GET and POST).
#[allow(clippy::too_many_arguments)]
pub async fn page_handler(
    State(state): State<AppState>,
    OptionalMember(user): OptionalMember,
    PreviewMode(preview): PreviewMode,
    jar: CookieJar,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = FrontendRequest::from_parts(method, &uri, &headers, &body);
    let token = RequestToken::from_jar(&jar);
    if request.is_post() && !token.verify(request.form.get(REQUEST_TOKEN_FIELD).map(String::as_str)) {
        tracing::warn!(path = %request.path, "Form submitted without a valid request token");
        return Err(AppError::bad_request("Invalid request token"));
    }

    let secure = state.config.session.secure_cookies;
    let checker = TokenChecker::new(user, preview);
    let page_request = PageRequest::load(state.clone(), checker, request, token.value.clone()).await?;
    let response = page_request.respond().await?;

    let mut jar = jar;
    if token.is_new {
        jar = jar.add(token.cookie(secure));
    }

    let response = match response {
        PageResponse::Html { status, html } => (status, Html(html)).into_response(),
        PageResponse::Redirect { status, redirection } => {
            match &redirection.session {
                Some(SessionChange::Start(session_id)) => {
                    jar = jar.add(session_cookie(session_id, secure));
                }
                Some(SessionChange::End) => {
                    if let Some(user) = page_request.checker.user() {
                        MemberSessionRepository::new(state.db.clone())
                            .delete(&user.session_id)
                            .await?;
                        tracing::info!(member_id = user.member.id(), "Member logged out");
                    }
                    jar = jar.remove(session_cookie_removal());
                }
                None => {}
            }
            redirect_response(status, &redirection.url)
        }
    };
    Ok((jar, response).into_response())
}

/// `POST /_logout`: end the session and go back to where the visitor came from.
pub async fn logout_handler(
    State(state): State<AppState>,
    OptionalMember(user): OptionalMember,
    jar: CookieJar,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = FrontendRequest::from_parts(Method::POST, &uri, &headers, &body);
    let token = RequestToken::from_jar(&jar);
    if !token.verify(request.form.get(REQUEST_TOKEN_FIELD).map(String::as_str)) {
        return Err(AppError::bad_request("Invalid request token"));
    }

    if let Some(user) = user {
        MemberSessionRepository::new(state.db.clone())
            .delete(&user.session_id)
            .await?;
        tracing::info!(member_id = user.member.id(), "Member logged out");
    }

    let target = request
        .referer
        .as_deref()
        .and_then(|referer| local_referer(referer, request.host_name()))
        .unwrap_or_else(|| "/".to_string());
    let jar = jar.remove(session_cookie_removal());
    Ok((jar, redirect_response(StatusCode::SEE_OTHER, &target)).into_response())
}

/// Path and query of a referer on the same host.
fn local_referer(referer: &str, host: &str) -> Option<String> {
    let url = url::Url::parse(referer).ok()?;
    if !url.host_str()?.eq_ignore_ascii_case(host) {
        return None;
    }
    Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}
