//! Listing-page parsing
//!
//! Turns one fetched results page into its card fragments and the location of
//! the next page, and enumerates the category entries shown on the first page
//! of a fresh query.

use scraper::Html;

use crate::error::ExtractError;
use crate::parser::selectors::ListingSelectors;

/// Where the walk goes after the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// Href of the next results page, usually relative
    Next(String),

    /// No forward-pagination control: this is the last page
    End,
}

/// One parsed listing page
#[derive(Debug)]
pub struct ListingPage {
    /// Serialized card sub-trees, in document order
    pub cards: Vec<String>,

    /// Forward cursor
    pub next: PageCursor,
}

/// One category entry from the disambiguation block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    /// Display label, e.g. "Electronics"
    pub label: String,

    /// Displayed number of adverts in this category
    pub count: u64,

    /// Href of the category's own results page
    pub href: String,
}

/// Parser for marketplace listing pages
pub struct ListingPageParser {
    selectors: ListingSelectors,
}

impl ListingPageParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            selectors: ListingSelectors::new(),
        }
    }

    /// Parse one results page into card fragments plus the forward cursor
    ///
    /// An absent pagination control is the normal last-page signal and maps
    /// to [`PageCursor::End`]. A control that is present but carries no
    /// usable href is a markup fault and raises
    /// [`ExtractError::PaginationBroken`]; the caller stops the walk early
    /// and keeps what it has.
    pub fn parse(&self, html: &str) -> Result<ListingPage, ExtractError> {
        let document = Html::parse_document(html);

        let cards: Vec<String> = document
            .select(self.selectors.card)
            .map(|card| card.html())
            .collect();

        let next = match document.select(self.selectors.pagination_forward).next() {
            None => PageCursor::End,
            Some(control) => match control.value().attr("href") {
                Some(href) if !href.trim().is_empty() => PageCursor::Next(href.to_string()),
                _ => return Err(ExtractError::PaginationBroken),
            },
        };

        Ok(ListingPage { cards, next })
    }

    /// Enumerate category entries on the first page of a fresh query
    ///
    /// Entries missing a link are skipped; an empty result is not an error at
    /// this level - the category selector decides whether that is fatal.
    pub fn parse_categories(&self, html: &str) -> Vec<CategoryEntry> {
        let document = Html::parse_document(html);

        let mut entries = Vec::new();
        for item in document.select(self.selectors.category_item) {
            let Some(link) = item.select(self.selectors.category_link).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };

            let count_text = item
                .select(self.selectors.category_count)
                .next()
                .map(|span| span.text().collect::<String>())
                .unwrap_or_default();

            // Counts are displayed with non-breaking-space digit groups
            let digits: String = count_text.chars().filter(char::is_ascii_digit).collect();
            let count = digits.parse::<u64>().unwrap_or(0);

            // The link text is "{label}{count}"; peel the count suffix off
            let full_text = link.text().collect::<String>();
            let label = full_text
                .strip_suffix(count_text.as_str())
                .unwrap_or(&full_text)
                .trim()
                .to_string();

            entries.push(CategoryEntry {
                label,
                count,
                href: href.to_string(),
            });
        }

        entries
    }
}

impl Default for ListingPageParser {
    fn default() -> Self {
        Self::new()
    }
}
