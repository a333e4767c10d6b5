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

use pulldown_cmark::{html, Options, Parser};

fn parser_options() -> Options {
    Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Render Markdown and sanitise the result, so element authors cannot inject scripts.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut rendered, Parser::new_ext(markdown, parser_options()));
    ammonia::clean(&rendered)
}

/// The `markdown` template filter.
pub fn make_markdown_filter() -> impl tera::Filter {
    |value: &tera::Value, _: &std::collections::HashMap<String, tera::Value>| match value.as_str() {
        Some(text) => Ok(tera::Value::String(markdown_to_html(text))),
        None => Err(tera::Error::msg("markdown filter expects a string")),
    }
}
