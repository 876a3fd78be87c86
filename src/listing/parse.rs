//! Extraction of listing rows from markup.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::{ListingDialect, ListingRow};

/// Extracts every listing row, in document order.
///
/// Rows without an anchor are dropped. Only the first anchor and the first
/// image of each row are considered; attribute values and text are trimmed.
/// An invalid row selector yields no rows (it is rejected earlier by config
/// validation).
#[must_use]
pub fn parse_listing(markup: &str, dialect: &ListingDialect) -> Vec<ListingRow> {
    let Ok(item_selector) = Selector::parse(&dialect.item_selector) else {
        warn!(selector = %dialect.item_selector, "invalid listing row selector");
        return Vec::new();
    };
    let (Ok(anchor_selector), Ok(img_selector)) = (Selector::parse("a"), Selector::parse("img"))
    else {
        return Vec::new();
    };

    let document = Html::parse_fragment(markup);
    document
        .select(&item_selector)
        .filter_map(|item| row_from_item(item, &anchor_selector, &img_selector))
        .collect()
}

fn row_from_item(
    item: ElementRef<'_>,
    anchor_selector: &Selector,
    img_selector: &Selector,
) -> Option<ListingRow> {
    let anchor = item.select(anchor_selector).next()?;
    let attr = |name: &str| anchor.value().attr(name).unwrap_or_default().trim().to_string();

    Some(ListingRow {
        href: attr("href"),
        rel: attr("rel"),
        text: anchor.text().collect::<String>().trim().to_string(),
        icon_src: item
            .select(img_selector)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string),
    })
}
