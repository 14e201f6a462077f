// src/services/parser.rs

//! Trending listing parser.
//!
//! Turns the listing markup into [`ListingRecord`]s using the configured CSS
//! selectors.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ListingRecord, ListingSelectors};
use crate::utils::{normalize_whitespace, resolve_url};

/// Parser for the trending listing page.
#[derive(Debug)]
pub struct ListingParser {
    row: Selector,
    title: Selector,
    description: Selector,
    base_url: Url,
}

impl ListingParser {
    /// Compile the selectors; links resolve against `base_url`.
    pub fn new(selectors: &ListingSelectors, base_url: &str) -> Result<Self> {
        Ok(Self {
            row: Self::parse_selector(&selectors.row)?,
            title: Self::parse_selector(&selectors.title)?,
            description: Self::parse_selector(&selectors.description)?,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Parse every listing entry in document order.
    ///
    /// Entries without a usable title anchor are skipped; a page without any
    /// entries yields an empty vector. Invalid UTF-8 sequences are replaced
    /// with U+FFFD.
    pub fn parse(&self, html: &[u8], category: &str) -> Result<Vec<ListingRecord>> {
        let text = String::from_utf8_lossy(html);
        let document = Html::parse_document(&text);

        let mut records = Vec::new();
        let mut skipped = 0;
        for row in document.select(&self.row) {
            match self.parse_row(&row, category) {
                Some(record) => records.push(record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::debug!("Skipped {} listing entries without a title link", skipped);
        }
        Ok(records)
    }

    fn parse_row(&self, row: &ElementRef, category: &str) -> Option<ListingRecord> {
        let anchor = row.select(&self.title).next()?;

        let title = normalize_whitespace(&anchor.text().collect::<String>());
        if title.is_empty() {
            return None;
        }

        let href = anchor.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }

        let description = row
            .select(&self.description)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        Some(ListingRecord {
            title,
            source_url: resolve_url(&self.base_url, href),
            description,
            category: category.to_string(),
        })
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <article class="Box-row">
            <h2 class="h3 lh-condensed">
              <a href="/a/foo">
                <span class="text-normal">a /</span>
                foo
              </a>
            </h2>
            <p class="col-9 color-fg-muted my-1 pr-4">
              Fast foo for everyone
            </p>
          </article>
          <article class="Box-row">
            <h2><span>no link here</span></h2>
            <p class="col-9">orphan</p>
          </article>
          <article class="Box-row">
            <h1><a href="/b/bar">b / bar</a></h1>
          </article>
        </body></html>
    "#;

    fn parser() -> ListingParser {
        ListingParser::new(&ListingSelectors::default(), "https://github.com").unwrap()
    }

    #[test]
    fn test_parse_listing() {
        let records = parser().parse(LISTING.as_bytes(), "python").unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].title, "a / foo");
        assert_eq!(records[0].source_url, "https://github.com/a/foo");
        assert_eq!(records[0].description, "Fast foo for everyone");
        assert_eq!(records[0].category, "python");

        assert_eq!(records[1].title, "b / bar");
        assert_eq!(records[1].source_url, "https://github.com/b/bar");
        assert_eq!(records[1].description, "");
    }

    #[test]
    fn test_parse_page_without_entries() {
        let html = "<html><body><p>Nothing trending today</p></body></html>";
        let records = parser().parse(html.as_bytes(), "python").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_skips_anchor_without_href() {
        let html = r#"
            <article class="Box-row"><h2><a>ghost</a></h2></article>
            <article class="Box-row"><h2><a href="/c/baz">c / baz</a></h2></article>
        "#;
        let records = parser().parse(html.as_bytes(), "rust").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_url, "https://github.com/c/baz");
    }

    #[test]
    fn test_parse_tolerates_broken_markup() {
        let html = r#"<article class="Box-row"><h2><a href="/d/qux">d / qux"#;
        let records = parser().parse(html.as_bytes(), "go").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "d / qux");
    }

    #[test]
    fn test_parse_tolerates_invalid_utf8() {
        let mut html = Vec::new();
        html.extend_from_slice(
            br#"<article class="Box-row"><h2><a href="/a/foo">a / foo</a></h2><p class="col-9">caf"#,
        );
        html.push(0xe9);
        html.extend_from_slice(
            br#"</p></article><article class="Box-row"><h2><a href="/b/bar">b / bar</a></h2></article>"#,
        );

        let records = parser().parse(&html, "python").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "caf\u{fffd}");
        assert_eq!(records[1].source_url, "https://github.com/b/bar");
    }

    #[test]
    fn test_parse_binary_body_yields_nothing() {
        let records = parser().parse(&[0xff, 0xfe, 0x00], "python").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_selector_invalid() {
        let selectors = ListingSelectors {
            row: "[[invalid".to_string(),
            ..ListingSelectors::default()
        };
        let err = ListingParser::new(&selectors, "https://github.com").unwrap_err();
        assert!(matches!(err, AppError::Selector { .. }));
    }
}
