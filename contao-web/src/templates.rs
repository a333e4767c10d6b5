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
use contao_core::utils::html::escape_html;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tera::Tera;

use crate::markdown::make_markdown_filter;

macro_rules! builtin {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("../templates/", $name)))),*]
    };
}

/// Templates shipped with the binary; a file with the same name in the
/// templates directory replaces one of them.
const BUILTIN_TEMPLATES: &[(&str, &str)] = builtin![
    "block_searchable.html",
    "block_unsearchable.html",
    "fe_page.html",
    "error.html",
    "nav_default.html",
    "mod_article.html",
    "mod_article_teaser.html",
    "mod_navigation.html",
    "mod_customnav.html",
    "mod_breadcrumb.html",
    "mod_sitemap.html",
    "mod_booknav.html",
    "mod_quicknav.html",
    "mod_quicklink.html",
    "mod_articlelist.html",
    "mod_search.html",
    "mod_login.html",
    "mod_registration.html",
    "mod_lostpassword.html",
    "mod_personaldata.html",
    "mod_changepassword.html",
    "mod_closeaccount.html",
    "mod_html.html",
    "ce_headline.html",
    "ce_text.html",
    "ce_html.html",
    "ce_markdown.html",
    "ce_list.html",
    "ce_table.html",
    "ce_code.html",
    "ce_hyperlink.html",
    "ce_toplink.html",
];

const EXTENSION: &str = ".html";

/// Tera wrapper; in development mode templates are reloaded on each render.
pub enum TemplateEngine {
    Static(Arc<Tera>),
    Reloadable {
        templates_dir: Option<String>,
        cached: Arc<RwLock<Tera>>,
    },
}

impl TemplateEngine {
    pub fn new(templates_dir: Option<&str>, development_mode: bool) -> Result<Self> {
        let tera = Self::create_tera_instance(templates_dir)?;
        if development_mode {
            tracing::info!("Template hot reload enabled (development mode)");
            Ok(Self::Reloadable {
                templates_dir: templates_dir.map(str::to_string),
                cached: Arc::new(RwLock::new(tera)),
            })
        } else {
            tracing::info!("Templates loaded once (production mode)");
            Ok(Self::Static(Arc::new(tera)))
        }
    }

    /// Only the embedded templates.
    pub fn builtin() -> Result<Self> {
        Self::new(None, false)
    }

    fn create_tera_instance(templates_dir: Option<&str>) -> Result<Tera> {
        let mut sources: Vec<(String, String)> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, content)| (name.to_string(), content.to_string()))
            .collect();

        if let Some(dir) = templates_dir {
            let root = Path::new(dir);
            if root.is_dir() {
                let mut custom = Vec::new();
                collect_templates(root, root, &mut custom)?;
                for (name, content) in custom {
                    match sources.iter_mut().find(|(existing, _)| *existing == name) {
                        Some(entry) => entry.1 = content,
                        None => sources.push((name, content)),
                    }
                }
            } else {
                tracing::warn!(templates_dir = %dir, "Templates directory does not exist");
            }
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources)
            .context("Failed to parse templates")?;
        tera.set_escape_fn(escape_html);
        tera.register_filter("markdown", make_markdown_filter());
        Ok(tera)
    }

    /// Render a template by its name without the `.html` extension.
    pub fn render(&self, name: &str, context: &tera::Context) -> Result<String> {
        let full_name = format!("{}{}", name, EXTENSION);
        match self {
            Self::Static(tera) => tera
                .render(&full_name, context)
                .with_context(|| format!("Failed to render template {}", name)),
            Self::Reloadable {
                templates_dir,
                cached,
            } => {
                match Self::create_tera_instance(templates_dir.as_deref()) {
                    Ok(fresh) => {
                        let mut guard = cached
                            .write()
                            .map_err(|_| anyhow!("Template cache lock poisoned"))?;
                        *guard = fresh;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to reload templates: {:#}. Using cached version.", e);
                    }
                }
                let guard = cached
                    .read()
                    .map_err(|_| anyhow!("Template cache lock poisoned"))?;
                guard
                    .render(&full_name, context)
                    .with_context(|| format!("Failed to render template {}", name))
            }
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        let full_name = format!("{}{}", name, EXTENSION);
        match self {
            Self::Static(tera) => tera.get_template_names().any(|t| t == full_name),
            Self::Reloadable { cached, .. } => cached
                .read()
                .map(|tera| tera.get_template_names().any(|t| t == full_name))
                .unwrap_or(false),
        }
    }

    /// `preferred` when it exists, otherwise `fallback`.
    pub fn pick(&self, preferred: &str, fallback: &str) -> String {
        if preferred == fallback || self.has_template(preferred) {
            return preferred.to_string();
        }
        tracing::warn!(template = %preferred, fallback = %fallback, "Custom template not found");
        fallback.to_string()
    }
}

impl Clone for TemplateEngine {
    fn clone(&self) -> Self {
        match self {
            Self::Static(tera) => Self::Static(Arc::clone(tera)),
            Self::Reloadable {
                templates_dir,
                cached,
            } => Self::Reloadable {
                templates_dir: templates_dir.clone(),
                cached: Arc::clone(cached),
            },
        }
    }
}

fn collect_templates(root: &Path, dir: &Path, out: &mut Vec<(String, String)>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read templates directory {}", dir.display()))?;
    for entry in entries {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.is_dir() {
            collect_templates(root, &path, out)?;
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let name = path
            .strip_prefix(root)
            .context("Template outside of templates directory")?
            .to_string_lossy()
            .replace('\\', "/");
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        out.push((name, content));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_templates_parse() {
        let engine = TemplateEngine::builtin().expect("built-in templates parse");
        assert!(engine.has_template("fe_page"));
        assert!(engine.has_template("nav_default"));
        assert!(!engine.has_template("mod_unknown"));
    }

    #[test]
    fn test_user_template_overrides_builtin() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("ce_toplink.html"), "TOP {{ link }}").expect("write");
        std::fs::write(dir.path().join("nav_compact.html"), "compact").expect("write");

        let engine = TemplateEngine::new(dir.path().to_str(), false).expect("engine");
        let mut context = tera::Context::new();
        context.insert("link", "up");
        assert_eq!(engine.render("ce_toplink", &context).expect("render"), "TOP up");
        assert_eq!(engine.pick("nav_compact", "nav_default"), "nav_compact");
        assert_eq!(engine.pick("nav_missing", "nav_default"), "nav_default");
    }

    #[test]
    fn test_reloadable_picks_up_changes() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("custom.html");
        std::fs::write(&path, "one").expect("write");

        let engine = TemplateEngine::new(dir.path().to_str(), true).expect("engine");
        let context = tera::Context::new();
        assert_eq!(engine.render("custom", &context).expect("render"), "one");

        std::fs::write(&path, "two").expect("write");
        assert_eq!(engine.render("custom", &context).expect("render"), "two");
    }

    #[test]
    fn test_markdown_filter_registered() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("md.html"), "{{ text | markdown | safe }}").expect("write");

        let engine = TemplateEngine::new(dir.path().to_str(), false).expect("engine");
        let mut context = tera::Context::new();
        context.insert("text", "**bold**");
        let html = engine.render("md", &context).expect("render");
        assert!(html.contains("<strong>bold</strong>"));
    }
}
