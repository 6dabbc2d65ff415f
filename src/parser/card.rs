//! Record extraction from a single listing card
//!
//! Converts one card fragment into an [`Advertisement`]. A card missing a
//! required field fails alone; the batch it came from is unaffected. A
//! missing or unparseable price is not a failure at all - the record keeps a
//! zero price and extraction continues.

use chrono::Utc;
use scraper::Html;
use url::Url;

use crate::error::ExtractError;
use crate::models::Advertisement;
use crate::parser::date;
use crate::parser::selectors::{price_pattern, CardSelectors};

/// Extractor for individual card fragments
pub struct RecordExtractor {
    selectors: CardSelectors,

    /// Site base URL; card hrefs are relative to it
    base: Url,
}

impl RecordExtractor {
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            selectors: CardSelectors::new(),
            base,
        }
    }

    /// Extract one advertisement from a serialized card fragment
    ///
    /// `query` and `tag` on the returned record are left empty; the walker
    /// attaches them once per job.
    pub fn extract(&self, card_html: &str) -> Result<Advertisement, ExtractError> {
        let fragment = Html::parse_fragment(card_html);

        let href = fragment
            .select(self.selectors.link)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or(ExtractError::LinkMissing)?;

        let url = self
            .base
            .join(href)
            .map_err(|_| ExtractError::LinkMissing)?
            .to_string();

        let top_block = fragment
            .select(self.selectors.top_block)
            .next()
            .ok_or(ExtractError::TitleMissing)?;

        let title = top_block
            .select(self.selectors.title)
            .next()
            .map(|heading| heading.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(ExtractError::TitleMissing)?;

        let price = self.extract_price(&top_block, &title);

        let bottom_block = fragment
            .select(self.selectors.bottom_block)
            .next()
            .ok_or(ExtractError::InfoLineMissing)?;

        let info_line = bottom_block
            .select(self.selectors.info_line)
            .next()
            .map(|line| line.text().collect::<String>())
            .ok_or(ExtractError::InfoLineMissing)?;

        let (place, date_added) = split_info_line(&info_line)?;

        Ok(Advertisement {
            title,
            url,
            price,
            place,
            date_added,
            query: String::new(),
            tag: String::new(),
        })
    }

    /// Pull the price out of the card's top block
    ///
    /// The first paragraph matching the grouped-digits pattern wins. No match
    /// is a warning, never an error.
    fn extract_price(&self, top_block: &scraper::ElementRef<'_>, title: &str) -> i64 {
        for paragraph in top_block.select(self.selectors.price) {
            let text = paragraph.text().collect::<String>();
            if let Some(caps) = price_pattern().captures(text.trim()) {
                if let Ok(price) = caps[1].replace(' ', "").parse::<i64>() {
                    return price;
                }
            }
        }

        tracing::warn!(title, "Missing or unparseable price field, defaulting to 0");
        0
    }
}

/// Split the combined geo/date line into place and publication date
///
/// Everything before the last `-` is the place; the tail segment is the date.
fn split_info_line(line: &str) -> Result<(String, chrono::DateTime<Utc>), ExtractError> {
    let segments: Vec<&str> = line.split('-').collect();
    let (head, tail) = segments.split_at(segments.len() - 1);

    let place = head
        .iter()
        .map(|segment| segment.trim())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let raw_date = tail[0].trim();
    let date_added =
        date::resolve(raw_date).ok_or_else(|| ExtractError::BadDate(raw_date.to_string()))?;

    Ok((place, date_added))
}
