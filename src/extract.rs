use scraper::{Html, Selector};

use crate::{Error, Result};

/// Extracts the `href` targets of every anchor matched by `selector`, in
/// document order.
///
/// No matches is an empty `Vec`, not an error. The caller is responsible
/// for entity-decoding the document first when the source field was
/// escaped; running selectors over still-escaped markup silently extracts
/// nothing.
pub fn extract_links(html: &str, selector: &str) -> Result<Vec<String>> {
    let doc = Html::parse_document(html);
    let selector = create_selector(selector)?;

    let links = doc
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::to_owned)
        .collect();
    Ok(links)
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::Selector(sel_str.into()))
}
