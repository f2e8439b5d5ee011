//! Field extraction from product pages.
//!
//! Every strategy reads a [`Page`] and degrades to `None` on anything it
//! does not recognize; nothing here returns an error.

pub mod image;
pub mod jsonld;
pub mod normalize;
pub mod page;
pub mod price;
pub mod title;

pub use image::{RankKey, TieredImageRules, find_image_generic, find_image_tiered, upgrade_size_tier};
pub use jsonld::StructuredData;
pub use normalize::{clean_text, coerce_number, normalize};
pub use page::Page;
pub use price::find_price;
pub use title::{TitleFields, split_title};
