//! Page access and HTML region extraction for the bird guide pages.
//!
//! [`fetch`] hides the HTTP layer behind the [`PageSource`] trait so the
//! publisher can be driven by stub pages in tests; [`extract`] holds the
//! pure selector logic for the two regions the bot scrapes.
pub mod extract;
pub mod fetch;

pub use extract::{ExtractError, guide_description, guide_image_url};
pub use fetch::{HttpPageSource, PageSource};
