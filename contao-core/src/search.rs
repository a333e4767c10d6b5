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

//! Keyword parsing, matching, ranking and excerpts for the site search.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::module_config::QueryType;
use crate::models::search_entry::{SearchEntry, SearchHit, SearchTerm};
use crate::utils::html::escape_html;

static CHUNK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""[^"]+"|[+-]?[^ ]+\*?"#).expect("Failed to compile keyword regex")
});

const MIN_TERM_LENGTH: usize = 2;

/// Lower-cased words of a text; words shorter than two characters are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TERM_LENGTH)
        .map(|w| w.to_lowercase())
        .collect()
}

/// Term counts of a text, ordered by term.
pub fn term_frequencies(text: &str) -> Vec<SearchTerm> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for word in tokenize(text) {
        *counts.entry(word).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(term, relevance)| SearchTerm { term, relevance })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMatch {
    Exact,
    Prefix,
    Infix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub term: String,
    pub matching: TermMatch,
}

impl Keyword {
    fn new(term: String, matching: TermMatch) -> Self {
        Self { term, matching }
    }

    pub fn matches(&self, word: &str) -> bool {
        match self.matching {
            TermMatch::Exact => word == self.term,
            TermMatch::Prefix => word.starts_with(&self.term),
            TermMatch::Infix => word.contains(&self.term),
        }
    }

    /// Sum of the counts of all terms this keyword matches.
    fn relevance(&self, terms: &[SearchTerm]) -> i64 {
        terms
            .iter()
            .filter(|t| self.matches(&t.term))
            .map(|t| t.relevance)
            .sum()
    }
}

/// A parsed search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: Vec<Keyword>,
    pub required: Vec<Keyword>,
    pub excluded: Vec<Keyword>,
    pub phrases: Vec<Vec<String>>,
    pub query_type: QueryType,
}

impl SearchQuery {
    /// Parse a keyword string.
    ///
    /// Supports `"quoted phrases"`, `+required`, `-excluded` and trailing `*`
    /// wildcards. With `fuzzy` every plain keyword matches inside words.
    pub fn parse(input: &str, query_type: QueryType, fuzzy: bool, min_length: usize) -> Self {
        let mut query = Self {
            keywords: Vec::new(),
            required: Vec::new(),
            excluded: Vec::new(),
            phrases: Vec::new(),
            query_type,
        };
        let min_length = min_length.max(MIN_TERM_LENGTH);
        let plain = if fuzzy { TermMatch::Infix } else { TermMatch::Exact };

        for chunk in CHUNK_REGEX.find_iter(input.trim()) {
            let chunk = chunk.as_str();

            if let Some(inner) = chunk.strip_prefix('"').and_then(|c| c.strip_suffix('"')) {
                let words = tokenize(inner);
                if words.len() > 1 {
                    query.phrases.push(words);
                } else if let Some(word) = words.into_iter().next() {
                    query.keywords.push(Keyword::new(word, TermMatch::Exact));
                }
                continue;
            }

            let (target, body) = match chunk.chars().next() {
                Some('+') => (Some(true), &chunk[1..]),
                Some('-') => (Some(false), &chunk[1..]),
                _ => (None, chunk),
            };
            let (body, wildcard) = match body.strip_suffix('*') {
                Some(stripped) => (stripped, true),
                None => (body, false),
            };

            let words = tokenize(body);
            let count = words.len();
            for (index, word) in words.into_iter().enumerate() {
                if word.chars().count() < min_length && target != Some(false) {
                    continue;
                }
                let matching = if wildcard && index + 1 == count {
                    TermMatch::Prefix
                } else if target.is_some() {
                    TermMatch::Exact
                } else {
                    plain
                };
                let keyword = Keyword::new(word, matching);
                match target {
                    Some(true) => query.required.push(keyword),
                    Some(false) => query.excluded.push(keyword),
                    None => query.keywords.push(keyword),
                }
            }
        }

        query
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.required.is_empty() && self.phrases.is_empty()
    }

    /// Keywords whose occurrences are highlighted in excerpts.
    pub fn highlight_keywords(&self) -> Vec<Keyword> {
        let mut all: Vec<Keyword> = self.keywords.clone();
        all.extend(self.required.iter().cloned());
        for phrase in &self.phrases {
            all.extend(phrase.iter().map(|w| Keyword::new(w.clone(), TermMatch::Exact)));
        }
        all
    }

    /// Relevance of an indexed page, `None` when it does not match.
    pub fn score(&self, terms: &[SearchTerm], text: &str) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        if self.excluded.iter().any(|k| k.relevance(terms) > 0) {
            return None;
        }

        let mut total = 0;
        for keyword in &self.required {
            let relevance = keyword.relevance(terms);
            if relevance == 0 {
                return None;
            }
            total += relevance;
        }

        let mut matched_any = false;
        for keyword in &self.keywords {
            let relevance = keyword.relevance(terms);
            if relevance == 0 && self.query_type == QueryType::And {
                return None;
            }
            if relevance > 0 {
                matched_any = true;
            }
            total += relevance;
        }

        if !self.phrases.is_empty() {
            let haystack = format!(" {} ", tokenize(text).join(" "));
            for phrase in &self.phrases {
                let found = haystack.contains(&format!(" {} ", phrase.join(" ")));
                if !found && self.query_type == QueryType::And {
                    return None;
                }
                if found {
                    matched_any = true;
                    total += phrase
                        .iter()
                        .map(|w| Keyword::new(w.clone(), TermMatch::Exact).relevance(terms))
                        .sum::<i64>();
                }
            }
        }

        let needs_optional = !self.keywords.is_empty() || !self.phrases.is_empty();
        if self.query_type == QueryType::Or && needs_optional && !matched_any && self.required.is_empty() {
            return None;
        }
        Some(total)
    }

    /// Matching entries, best first, with excerpts.
    pub fn rank(
        &self,
        candidates: Vec<(SearchEntry, Vec<SearchTerm>)>,
        context_length: usize,
        total_length: usize,
    ) -> Vec<SearchHit> {
        let mut scored: Vec<(SearchEntry, i64)> = candidates
            .into_iter()
            .filter_map(|(entry, terms)| self.score(&terms, &entry.text).map(|s| (entry, s)))
            .collect();

        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.title.cmp(&b.0.title)));

        let best = scored.first().map(|(_, s)| *s).unwrap_or(0).max(1);
        let keywords = self.highlight_keywords();

        scored
            .into_iter()
            .map(|(entry, relevance)| {
                let excerpt = excerpt(&entry.text, &keywords, context_length, total_length);
                let percent = ((relevance.max(0) * 100) / best).clamp(0, 100) as u32;
                SearchHit {
                    entry,
                    relevance,
                    percent,
                    excerpt,
                }
            })
            .collect()
    }
}

/// Char ranges of the alphanumeric words in `chars`.
fn word_spans(chars: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in chars.iter().enumerate() {
        match (c.is_alphanumeric(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, chars.len()));
    }
    spans
}

fn is_match(chars: &[char], span: (usize, usize), keywords: &[Keyword]) -> bool {
    let word: String = chars[span.0..span.1].iter().collect::<String>().to_lowercase();
    keywords.iter().any(|k| k.matches(&word))
}

fn render_segment(chars: &[char], from: usize, to: usize, marked: &[(usize, usize)]) -> String {
    let mut out = String::new();
    let mut pos = from;
    for &(start, end) in marked.iter().filter(|(s, e)| *s >= from && *e <= to) {
        let before: String = chars[pos..start].iter().collect();
        let word: String = chars[start..end].iter().collect();
        out.push_str(&escape_html(&before));
        out.push_str("<mark class=\"highlight\">");
        out.push_str(&escape_html(&word));
        out.push_str("</mark>");
        pos = end;
    }
    let rest: String = chars[pos..to].iter().collect();
    out.push_str(&escape_html(&rest));
    out
}

/// Context around keyword matches with the matches highlighted.
///
/// Each match gets up to `context_length` characters on either side, cut at
/// word boundaries; overlapping windows merge, and the excerpt stops after
/// `total_length` characters of text. The result is HTML-escaped.
pub fn excerpt(text: &str, keywords: &[Keyword], context_length: usize, total_length: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let marked: Vec<(usize, usize)> = word_spans(&chars)
        .into_iter()
        .filter(|span| is_match(&chars, *span, keywords))
        .collect();

    if marked.is_empty() {
        let cut = chars.len().min(total_length);
        let head: String = chars[..cut].iter().collect();
        let suffix = if cut < chars.len() { " …" } else { "" };
        return format!("{}{}", escape_html(head.trim_end()), suffix);
    }

    let mut windows: Vec<(usize, usize)> = Vec::new();
    for &(start, end) in &marked {
        let mut from = start.saturating_sub(context_length);
        while from > 0 && from < start && !chars[from - 1].is_whitespace() {
            from += 1;
        }
        let mut to = (end + context_length).min(chars.len());
        while to < chars.len() && to > end && !chars[to].is_whitespace() {
            to -= 1;
        }
        match windows.last_mut() {
            Some(last) if from <= last.1 => last.1 = last.1.max(to),
            _ => windows.push((from, to)),
        }
    }

    let mut parts = Vec::new();
    let mut used = 0;
    for (from, to) in windows {
        if used >= total_length {
            break;
        }
        let to = to.min(from + (total_length - used));
        used += to - from;
        let segment = render_segment(&chars, from, to, &marked);
        parts.push(segment.trim().to_string());
    }

    parts.join(" … ")
}
