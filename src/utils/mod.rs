// SPDX-License-Identifier: GPL-3.0-only
pub mod search;
pub mod url_validator;

pub use search::contains_pattern;
pub use url_validator::validate_image_url;
