//! Structural markers for the marketplace listing markup
//!
//! Every CSS selector and pattern the extractor depends on lives here. The
//! site ships obfuscated utility classes and data attributes; when it rotates
//! them, this table is the only surface that needs editing - traversal and
//! extraction logic stay untouched.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    // Category disambiguation block on the first page of a fresh query
    static ref CATEGORY_ITEM: Selector = parse_selector!("li.css-szrfjb");
    static ref CATEGORY_LINK: Selector = parse_selector!("a");
    static ref CATEGORY_COUNT: Selector = parse_selector!("a span");

    // One listing card and the forward-pagination control
    static ref CARD: Selector = parse_selector!(r#"[data-cy*="l-card"]"#);
    static ref PAGINATION_FORWARD: Selector = parse_selector!(r#"[data-testid*="pagination-forward"]"#);

    // Inside one card
    static ref CARD_LINK: Selector = parse_selector!("a.css-rc5s2u");
    static ref CARD_TOP_BLOCK: Selector = parse_selector!(r#"div[class*="css-u2ayx9"]"#);
    static ref CARD_BOTTOM_BLOCK: Selector = parse_selector!("div.css-odp1qd");
    static ref CARD_TITLE: Selector = parse_selector!("h6");
    static ref CARD_PRICE: Selector = parse_selector!("p");
    static ref CARD_INFO_LINE: Selector = parse_selector!("p");

    // "12 000 UAH" - grouped digits followed by a currency unit
    static ref PRICE_PATTERN: Regex =
        Regex::new(r"^(\d{1,3}(?: \d{3})*) .*$").expect("Invalid price pattern");
}

/// Selectors for listing-page structure: cards, pagination, categories
pub struct ListingSelectors {
    pub category_item: &'static Selector,
    pub category_link: &'static Selector,
    pub category_count: &'static Selector,
    pub card: &'static Selector,
    pub pagination_forward: &'static Selector,
}

impl ListingSelectors {
    pub fn new() -> Self {
        Self {
            category_item: &CATEGORY_ITEM,
            category_link: &CATEGORY_LINK,
            category_count: &CATEGORY_COUNT,
            card: &CARD,
            pagination_forward: &PAGINATION_FORWARD,
        }
    }
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors for the interior of one card fragment
pub struct CardSelectors {
    pub link: &'static Selector,
    pub top_block: &'static Selector,
    pub bottom_block: &'static Selector,
    pub title: &'static Selector,
    pub price: &'static Selector,
    pub info_line: &'static Selector,
}

impl CardSelectors {
    pub fn new() -> Self {
        Self {
            link: &CARD_LINK,
            top_block: &CARD_TOP_BLOCK,
            bottom_block: &CARD_BOTTOM_BLOCK,
            title: &CARD_TITLE,
            price: &CARD_PRICE,
            info_line: &CARD_INFO_LINE,
        }
    }
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self::new()
    }
}

/// Pattern matching a displayed price with space-grouped digits
pub fn price_pattern() -> &'static Regex {
    &PRICE_PATTERN
}
