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

//! Page tree traversal for menus, breadcrumbs, sitemaps and book navigation.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::page::{Page, PageType, SitemapMode};
use crate::models::page_details::{PageDetails, PageDetailsError};
use crate::routing::page_url;
use crate::security::TokenChecker;
use crate::visibility::{AccessPolicy, Publishable};

/// All pages of the installation, indexed by id and parent.
#[derive(Debug, Clone, Default)]
pub struct PageTree {
    pages: HashMap<i64, Page>,
    children: HashMap<i64, Vec<i64>>,
    roots: Vec<i64>,
}

impl PageTree {
    pub fn new(pages: Vec<Page>) -> Self {
        let mut tree = Self::default();
        let mut ordered: Vec<Page> = pages.into_iter().filter(|p| p.id.is_some()).collect();
        ordered.sort_by_key(|p| (p.sorting, p.id()));

        for page in ordered {
            let id = page.id();
            match page.pid {
                Some(pid) if pid > 0 => tree.children.entry(pid).or_default().push(id),
                _ => tree.roots.push(id),
            }
            tree.pages.insert(id, page);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Page> {
        self.roots.iter().filter_map(|id| self.pages.get(id))
    }

    /// Direct children of `pid`, ordered by sorting.
    pub fn children(&self, pid: i64) -> impl Iterator<Item = &Page> {
        self.children
            .get(&pid)
            .into_iter()
            .flatten()
            .filter_map(|id| self.pages.get(id))
    }

    /// Ancestor chain from the topmost page down to `id` (inclusive).
    pub fn chain(&self, id: i64) -> Vec<&Page> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if !seen.insert(current) {
                break;
            }
            match self.pages.get(&current) {
                Some(page) => {
                    chain.push(page);
                    next = page.pid.filter(|pid| *pid > 0);
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    pub fn root_of(&self, id: i64) -> Option<&Page> {
        self.chain(id).into_iter().next().filter(|p| p.is_root())
    }

    pub fn details(&self, id: i64, now: DateTime<Utc>) -> Result<PageDetails, PageDetailsError> {
        let chain: Vec<Page> = self.chain(id).into_iter().cloned().collect();
        PageDetails::from_chain(&chain, now)
    }

    /// Protection of a page, inherited from the nearest protected ancestor.
    pub fn access_policy(&self, id: i64) -> AccessPolicy {
        self.chain(id)
            .into_iter()
            .rev()
            .find(|p| p.protected)
            .map(|p| AccessPolicy::new(true, p.groups.clone()))
            .unwrap_or_default()
    }

    pub fn is_descendant(&self, ancestor: i64, id: i64) -> bool {
        ancestor != id && self.chain(id).iter().any(|p| p.id() == ancestor)
    }

    /// Page with the given alias below a website root.
    pub fn find_by_alias(&self, root_id: i64, alias: &str) -> Option<&Page> {
        let mut stack: Vec<i64> = self.children.get(&root_id).cloned().unwrap_or_default();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if let Some(page) = self.pages.get(&id) {
                if page.alias == alias {
                    return Some(page);
                }
            }
            if let Some(children) = self.children.get(&id) {
                stack.extend(children.iter().rev());
            }
        }
        None
    }

    /// Website root serving the given host: an exact `dns` match, else a root without `dns`.
    pub fn root_for_host(&self, host: &str) -> Option<&Page> {
        let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
        let roots: Vec<&Page> = self.roots().filter(|p| p.is_root()).collect();

        roots
            .iter()
            .find(|p| !p.dns.is_empty() && p.dns.eq_ignore_ascii_case(&host))
            .or_else(|| roots.iter().find(|p| p.dns.is_empty() && p.fallback))
            .or_else(|| roots.iter().find(|p| p.dns.is_empty()))
            .copied()
    }

    /// First regular child of `pid` that is visible at `now`.
    pub fn first_regular_child(&self, pid: i64, now: DateTime<Utc>, preview: bool) -> Option<&Page> {
        self.children(pid)
            .find(|p| p.page_type == PageType::Regular && (preview || p.is_visible_at(now)))
    }

    pub fn url_suffix(&self, id: i64) -> &str {
        self.root_of(id).map(|r| r.url_suffix.as_str()).unwrap_or("")
    }

    /// The first regular page below its root is served at `/`.
    pub fn is_start_page(&self, page: &Page) -> bool {
        let Some(pid) = page.pid else {
            return false;
        };
        match self.get(pid) {
            Some(parent) if parent.is_root() => self
                .children(pid)
                .find(|p| p.page_type == PageType::Regular && p.published)
                .map(|p| p.id() == page.id())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn url_of(&self, page: &Page) -> String {
        page_url(page, self.url_suffix(page.id()), self.is_start_page(page))
    }
}

/// Settings that shape a rendered menu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationOptions {
    pub level_offset: usize,
    pub show_level: usize,
    pub hard_limit: bool,
    pub show_protected: bool,
    pub show_hidden: bool,
    /// Honour the per-page sitemap flags and never mark items active.
    pub sitemap: bool,
}

impl NavigationOptions {
    pub fn sitemap() -> Self {
        Self {
            sitemap: true,
            ..Self::default()
        }
    }
}

/// One menu entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NavItem {
    pub id: i64,
    pub page_type: String,
    pub title: String,
    pub page_title: String,
    pub link: String,
    pub href: String,
    pub class: String,
    pub is_active: bool,
    pub is_trail: bool,
    pub target_blank: bool,
    pub accesskey: String,
    pub tabindex: i64,
    pub description: String,
    pub nofollow: bool,
    pub level: usize,
    pub children: Vec<NavItem>,
}

/// Previous, parent and next page inside a book.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BookNav {
    pub previous: Option<NavItem>,
    pub up: Option<NavItem>,
    pub next: Option<NavItem>,
}

impl BookNav {
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.up.is_none() && self.next.is_none()
    }
}

/// Page at which a menu starts rendering, `None` when the trail is too short.
pub fn start_page(trail: &[i64], level_offset: usize, root_page: Option<i64>) -> Option<i64> {
    match root_page {
        Some(id) => Some(id),
        None => trail.get(level_offset).copied(),
    }
}

/// Builds menus for one request.
pub struct Navigator<'a> {
    pub tree: &'a PageTree,
    pub current: &'a PageDetails,
    pub checker: &'a TokenChecker,
    pub now: DateTime<Utc>,
}

impl<'a> Navigator<'a> {
    pub fn new(
        tree: &'a PageTree,
        current: &'a PageDetails,
        checker: &'a TokenChecker,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tree,
            current,
            checker,
            now,
        }
    }

    fn is_published(&self, page: &Page) -> bool {
        self.checker.is_preview_mode() || page.is_visible_at(self.now)
    }

    fn is_accessible(&self, page: &Page) -> bool {
        self.checker.is_granted(&self.tree.access_policy(page.id()))
    }

    fn is_listed(&self, page: &Page, options: &NavigationOptions) -> bool {
        if !page.is_navigable_type() || !self.is_published(page) {
            return false;
        }
        if page.guests && self.checker.has_frontend_user() {
            return false;
        }

        let forced = options.sitemap && page.sitemap == SitemapMode::Always;
        if options.sitemap && page.sitemap == SitemapMode::Never {
            return false;
        }
        if page.hide && !options.show_hidden && !forced {
            return false;
        }
        forced || options.show_protected || self.is_accessible(page)
    }

    /// Target of a forward page: its `jump_to` page or its first regular child.
    pub fn forward_target(&self, page: &Page) -> Option<&'a Page> {
        match page.jump_to {
            Some(id) => self.tree.get(id).filter(|p| self.is_published(p)),
            None => self
                .tree
                .first_regular_child(page.id(), self.now, self.checker.is_preview_mode()),
        }
    }

    /// Link target of a page, `None` when a forward page has nowhere to go.
    pub fn href(&self, page: &Page) -> Option<String> {
        match page.page_type {
            PageType::Redirect => page.url.clone().filter(|u| !u.trim().is_empty()),
            PageType::Root => Some(if page.dns.is_empty() {
                "/".to_string()
            } else {
                format!("//{}/", page.dns)
            }),
            PageType::Forward => self.forward_target(page).map(|t| self.tree.url_of(t)),
            _ => Some(self.tree.url_of(page)),
        }
    }

    fn is_active(&self, page: &Page, options: &NavigationOptions) -> bool {
        if options.sitemap {
            return false;
        }
        let current = self.current.id();
        page.id() == current
            || (page.page_type == PageType::Forward && page.jump_to == Some(current))
    }

    fn item(&self, page: &Page, href: String, level: usize) -> NavItem {
        NavItem {
            id: page.id(),
            page_type: page.page_type.as_str().to_string(),
            title: page.display_title().to_string(),
            page_title: page.page_title.clone().unwrap_or_default(),
            link: page.title.clone(),
            href,
            class: String::new(),
            is_active: false,
            is_trail: false,
            target_blank: page.target_blank,
            accesskey: page.accesskey.clone(),
            tabindex: page.tabindex,
            description: page.description.clone().unwrap_or_default(),
            nofollow: page.is_nofollow(),
            level,
            children: Vec::new(),
        }
    }

    /// Recursive menu below `pid`; `level` is the level of the returned items.
    pub fn build(&self, pid: i64, level: usize, options: &NavigationOptions) -> Vec<NavItem> {
        let mut items = Vec::new();

        for page in self.tree.children(pid) {
            if !self.is_listed(page, options) {
                continue;
            }
            let Some(href) = self.href(page) else {
                continue;
            };

            let descend = options.show_level == 0
                || options.show_level > level
                || (!options.hard_limit && self.current.in_trail(page.id()));
            let children = if descend {
                self.build(page.id(), level + 1, options)
            } else {
                Vec::new()
            };

            let mut item = self.item(page, href, level);
            let mut classes: Vec<String> = Vec::new();
            if !children.is_empty() {
                classes.push("submenu".to_string());
            }
            if matches!(page.page_type, PageType::Forward | PageType::Redirect) {
                classes.push(page.page_type.as_str().to_string());
            }
            if self.tree.access_policy(page.id()).protected {
                classes.push("protected".to_string());
            }
            if !page.css_class.trim().is_empty() {
                classes.push(page.css_class.trim().to_string());
            }

            if self.is_active(page, options) {
                classes.push("active".to_string());
                item.is_active = true;
            } else {
                if !options.sitemap && self.current.in_trail(page.id()) {
                    classes.push("trail".to_string());
                    item.is_trail = true;
                }
                if page.pid.is_some() && page.pid == self.current.pid() {
                    classes.push("sibling".to_string());
                }
            }

            item.class = classes.join(" ");
            item.children = children;
            items.push(item);
        }

        mark_first_last(&mut items);
        items
    }

    /// Menu of the current page's trail, starting at `level_offset` or `root_page`.
    pub fn navigation(&self, options: &NavigationOptions, root_page: Option<i64>) -> Vec<NavItem> {
        match start_page(&self.current.trail, options.level_offset, root_page) {
            Some(pid) => self.build(pid, 1, options),
            None => Vec::new(),
        }
    }

    /// Whole tree of the website (or of `root_page`) honouring sitemap flags.
    pub fn sitemap(&self, root_page: Option<i64>, show_protected: bool, show_hidden: bool) -> Vec<NavItem> {
        let options = NavigationOptions {
            show_protected,
            show_hidden,
            ..NavigationOptions::sitemap()
        };
        self.build(root_page.unwrap_or(self.current.root_id), 1, &options)
    }

    /// Items leading from the website root to the current page.
    pub fn breadcrumb(&self, show_hidden: bool, include_root: bool) -> Vec<NavItem> {
        let chain = self.tree.chain(self.current.id());
        let mut items = Vec::new();
        let Some((current, ancestors)) = chain.split_last() else {
            return items;
        };

        for (index, page) in ancestors.iter().enumerate() {
            let level = index;
            if page.is_root() {
                if include_root {
                    let href = self
                        .tree
                        .first_regular_child(page.id(), self.now, self.checker.is_preview_mode())
                        .map(|p| self.tree.url_of(p))
                        .unwrap_or_else(|| "/".to_string());
                    let mut item = self.item(page, href, level);
                    item.class = "root".to_string();
                    item.is_trail = true;
                    items.push(item);
                }
                continue;
            }
            if (page.hide && !show_hidden) || !self.is_published(page) {
                continue;
            }
            let Some(href) = self.href(page) else {
                continue;
            };
            let mut item = self.item(page, href, level);
            item.is_trail = true;
            items.push(item);
        }

        let mut item = self.item(current, self.tree.url_of(current), ancestors.len());
        item.is_active = true;
        item.class = "active".to_string();
        items.push(item);

        mark_first_last(&mut items);
        items
    }

    /// Explicitly listed pages, in the given order.
    pub fn custom(&self, ids: &[i64], options: &NavigationOptions) -> Vec<NavItem> {
        let mut items = Vec::new();

        for id in ids {
            let Some(page) = self.tree.get(*id) else {
                continue;
            };
            if !page.is_navigable_type() || !self.is_published(page) {
                continue;
            }
            if page.guests && self.checker.has_frontend_user() {
                continue;
            }
            if !options.show_protected && !self.is_accessible(page) {
                continue;
            }
            let Some(href) = self.href(page) else {
                continue;
            };

            let mut item = self.item(page, href, 1);
            let mut classes: Vec<String> = Vec::new();
            if !page.css_class.trim().is_empty() {
                classes.push(page.css_class.trim().to_string());
            }
            if self.is_active(page, options) {
                classes.push("active".to_string());
                item.is_active = true;
            } else if self.current.in_trail(page.id()) {
                classes.push("trail".to_string());
                item.is_trail = true;
            }
            item.class = classes.join(" ");
            items.push(item);
        }

        mark_first_last(&mut items);
        items
    }

    /// Previous, up and next links of the current page inside the book at `book_root`.
    pub fn book(&self, book_root: i64, options: &NavigationOptions) -> BookNav {
        if !self.current.in_trail(book_root) {
            return BookNav::default();
        }
        let Some(root) = self.tree.get(book_root) else {
            return BookNav::default();
        };

        let mut pages: Vec<&Page> = vec![root];
        self.collect_book_pages(book_root, options, &mut pages);

        let current_id = self.current.id();
        let Some(position) = pages.iter().position(|p| p.id() == current_id) else {
            return BookNav::default();
        };

        let link = |page: &Page| self.href(page).map(|href| self.item(page, href, 0));

        let mut nav = BookNav::default();
        if current_id != book_root {
            let mut up = self.current.pid();
            while let Some(pid) = up {
                if let Some(page) = pages.iter().find(|p| p.id() == pid) {
                    nav.up = link(*page);
                    break;
                }
                up = self.tree.get(pid).and_then(|p| p.pid);
            }
        }
        if position > 0 {
            nav.previous = link(pages[position - 1]);
        }
        if let Some(next) = pages.get(position + 1) {
            nav.next = link(*next);
        }
        nav
    }

    fn collect_book_pages(&self, pid: i64, options: &NavigationOptions, pages: &mut Vec<&'a Page>) {
        for page in self.tree.children(pid) {
            if page.page_type == PageType::Regular && self.is_listed(page, options) {
                pages.push(page);
            }
            self.collect_book_pages(page.id(), options, pages);
        }
    }
}

fn mark_first_last(items: &mut [NavItem]) {
    let len = items.len();
    for (index, item) in items.iter_mut().enumerate() {
        let mut extra = Vec::new();
        if index == 0 {
            extra.push("first");
        }
        if index + 1 == len {
            extra.push("last");
        }
        for class in extra {
            if item.class.is_empty() {
                item.class = class.to_string();
            } else {
                item.class = format!("{} {}", item.class, class);
            }
        }
    }
}

/// Depth-first list of a menu, e.g. for `<select>` based navigation.
pub fn flatten(items: &[NavItem]) -> Vec<NavItem> {
    let mut flat = Vec::new();
    for item in items {
        let mut entry = item.clone();
        entry.children = Vec::new();
        flat.push(entry);
        flat.extend(flatten(&item.children));
    }
    flat
}
