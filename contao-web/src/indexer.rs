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

//! Feeds rendered pages into the search index.

use anyhow::Result;
use chrono::{DateTime, Utc};
use contao_core::models::page_details::PageDetails;
use contao_core::models::search_entry::SearchEntry;
use contao_core::search::term_frequencies;
use contao_core::utils::html::{indexable_html, strip_tags};
use contao_db::repositories::SearchRepository;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

pub fn checksum(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Whether a rendered page belongs in the index at all.
pub fn is_indexable(details: &PageDetails, has_member: bool, preview: bool) -> bool {
    if preview || details.page.no_search || !details.is_public {
        return false;
    }
    // Protected pages are indexed from member requests only. Public pages are
    // indexed from guest requests only, so member-only content never leaks
    // into a publicly searchable entry.
    details.protected == has_member
}

/// Index the HTML of a page under its canonical `url`. Returns whether the index changed.
pub async fn index_page(
    pool: &SqlitePool,
    details: &PageDetails,
    url: &str,
    html: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let text = strip_tags(&indexable_html(html));
    if text.is_empty() {
        return Ok(false);
    }

    let entry = SearchEntry {
        id: None,
        root_id: details.root_id,
        page_id: details.id(),
        url: url.to_string(),
        title: details.page.display_title().to_string(),
        checksum: checksum(&text),
        text,
        protected: details.protected,
        groups: details.groups.clone(),
        language: details.language.clone(),
        indexed_at: now,
    };
    let terms = term_frequencies(&format!("{} {}", entry.title, entry.text));

    let changed = SearchRepository::new(pool.clone())
        .index_page(&entry, &terms)
        .await?;
    if changed {
        tracing::debug!(url = %url, terms = terms.len(), "Page indexed");
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_app_state, TestSite};
    use contao_core::navigation::PageTree;
    use contao_db::repositories::PageRepository;
    use pretty_assertions::assert_eq;

    const HTML: &str = "<html><body><nav><!-- indexer::stop -->Menu<!-- indexer::continue --></nav>\
                        <p>Fresh bread every morning</p></body></html>";

    #[test]
    fn test_checksum_is_sha256_hex() {
        assert_eq!(
            checksum("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_index_page_skips_unchanged_text() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let tree = PageTree::new(PageRepository::new(state.db.clone()).find_all().await?);
        let details = tree.details(site.about, Utc::now())?;

        assert!(index_page(&state.db, &details, "/about.html", HTML, Utc::now()).await?);
        assert!(!index_page(&state.db, &details, "/about.html", HTML, Utc::now()).await?);

        let entry = SearchRepository::new(state.db.clone())
            .find_by_url(site.root, "/about.html")
            .await?
            .expect("indexed entry");
        assert_eq!(entry.text, "Fresh bread every morning");
        assert_eq!(entry.title, "About");
        assert_eq!(entry.root_id, site.root);
        Ok(())
    }

    #[tokio::test]
    async fn test_members_index_protected_pages_only() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let tree = PageTree::new(PageRepository::new(state.db.clone()).find_all().await?);
        let now = Utc::now();

        let about = tree.details(site.about, now)?;
        assert!(is_indexable(&about, false, false));
        assert!(!is_indexable(&about, true, false));
        assert!(!is_indexable(&about, false, true));

        let members = tree.details(site.members, now)?;
        assert!(!is_indexable(&members, false, false));
        assert!(is_indexable(&members, true, false));
        Ok(())
    }
}
