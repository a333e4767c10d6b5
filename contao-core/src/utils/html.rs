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

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>")
        .expect("Failed to compile script regex")
});
static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("Failed to compile tag regex"));
static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

const INDEXER_CONTINUE: &str = "<!-- indexer::continue -->";
const INDEXER_STOP: &str = "<!-- indexer::stop -->";

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Plain text of an HTML fragment with collapsed whitespace.
pub fn strip_tags(html: &str) -> String {
    let without_code = SCRIPT_STYLE_REGEX.replace_all(html, " ");
    let without_tags = TAG_REGEX.replace_all(&without_code, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_REGEX.replace_all(&decoded, " ").trim().to_string()
}

/// Parts of a rendered page that go into the search index.
///
/// Content between an `indexer::stop` marker and the next
/// `indexer::continue` marker is dropped. Without markers the whole `<body>`
/// (or document) is used.
pub fn indexable_html(html: &str) -> String {
    let body = match (html.find("<body"), html.rfind("</body>")) {
        (Some(start), Some(end)) if start < end => match html[start..end].find('>') {
            Some(gt) => &html[start + gt + 1..end],
            None => html,
        },
        _ => html,
    };

    if !body.contains(INDEXER_CONTINUE) && !body.contains(INDEXER_STOP) {
        return body.to_string();
    }

    let mut out = String::new();
    let mut rest = body;
    let mut indexing = true;

    loop {
        let marker = if indexing { INDEXER_STOP } else { INDEXER_CONTINUE };
        match rest.find(marker) {
            Some(pos) => {
                if indexing {
                    out.push_str(&rest[..pos]);
                    out.push(' ');
                }
                rest = &rest[pos + marker.len()..];
                indexing = !indexing;
            }
            None => {
                if indexing {
                    out.push_str(rest);
                }
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_tags() {
        let html = "<h1>Hello</h1>\n<p>World &amp; <b>friends</b></p><script>var x = 1;</script>";
        assert_eq!(strip_tags(html), "Hello World & friends");
    }

    #[test]
    fn test_indexable_html_without_markers_uses_body() {
        let html = "<html><head><title>T</title></head><body class=\"x\"><p>Body</p></body></html>";
        assert_eq!(indexable_html(html), "<p>Body</p>");
    }

    #[test]
    fn test_indexable_html_with_markers() {
        let html = "<body><!-- indexer::stop --><nav>Menu</nav><!-- indexer::continue --><main>Text</main><!-- indexer::stop --><footer>Foot</footer></body>";
        let text = strip_tags(&indexable_html(html));
        assert_eq!(text, "Text");
    }

    #[test]
    fn test_indexable_html_starting_with_content() {
        let html = "<p>Intro</p><!-- indexer::stop --><nav>Menu</nav><!-- indexer::continue --><p>More</p>";
        let text = strip_tags(&indexable_html(html));
        assert_eq!(text, "Intro More");
    }
}
