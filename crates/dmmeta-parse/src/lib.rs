//! Pure string helpers shared by the DMM provider: catalog number
//! normalization, preview-image maximization and loose value parsing.

pub mod image;
pub mod number;
pub mod values;

pub use image::{maximize, RewriteRule, MAXIMIZE_RULES};
pub use number::normalize;
pub use values::{parse_date, parse_duration, parse_score, parse_score_from_url};
