//! Selector logic for the two scraped regions of a bird guide page.
//!
//! Extraction is pure (`&str` in, `Result` out) so it can be unit tested
//! against inline fixtures without any network plumbing.

use scraper::{Html, Selector};
use thiserror::Error;

/// Region holding the guide photograph.
const IMAGE_REGION: &str = "div.bird-guide-image";
/// Region holding the description text; the guide marks it with the
/// visibility-utility classes shown only on large layouts.
const DESCRIPTION_REGION: &str = "div.hide-for-tiny.hide-for-small.hide-for-medium";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page has no `{0}` region")]
    MissingRegion(&'static str),
    #[error("image region has no <img> with a src attribute")]
    MissingImage,
    #[error("description region is empty")]
    EmptyDescription,
}

/// Locate the guide image and return its `src` attribute.
pub fn guide_image_url(html: &str) -> Result<String, ExtractError> {
    let doc = Html::parse_document(html);
    let region = Selector::parse(IMAGE_REGION).expect("static selector");
    let img = Selector::parse("img").expect("static selector");

    let region_el = doc
        .select(&region)
        .next()
        .ok_or(ExtractError::MissingRegion("bird-guide-image"))?;
    let src = region_el
        .select(&img)
        .next()
        .and_then(|tag| tag.value().attr("src"))
        .ok_or(ExtractError::MissingImage)?;
    Ok(src.to_string())
}

/// Locate the description block and return its text content, stripped of
/// leading/trailing tabs, spaces, and newlines.
pub fn guide_description(html: &str) -> Result<String, ExtractError> {
    let doc = Html::parse_document(html);
    let region = Selector::parse(DESCRIPTION_REGION).expect("static selector");

    let region_el = doc.select(&region).next().ok_or(ExtractError::MissingRegion(
        "hide-for-tiny hide-for-small hide-for-medium",
    ))?;
    let text: String = region_el.text().collect();
    let text = text.trim_matches(['\t', ' ', '\n']);
    if text.is_empty() {
        return Err(ExtractError::EmptyDescription);
    }
    Ok(text.to_string())
}
