// SPDX-License-Identifier: GPL-3.0-only
use regex::Regex;
use std::sync::LazyLock;

use crate::registry::error::{RegistryError, RegistryResult};
use crate::registry::models::{FieldError, PlotData};
use crate::utils::validate_image_url;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

static TEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("static regex is valid"));

/// Check every field of `data`, collecting all failures rather than stopping at the first
pub fn validate_plot_data(data: &PlotData) -> RegistryResult<()> {
    let mut errors = Vec::new();

    require(&mut errors, "title", &data.title, "Title is required");
    require(&mut errors, "dimensions", &data.dimensions, "Dimensions are required");
    require(&mut errors, "location", &data.location, "Location is required");
    require(&mut errors, "price", &data.price, "Price is required");
    require(&mut errors, "ownerName", &data.owner_name, "Owner name is required");
    ten_digits(
        &mut errors,
        "phoneNumber",
        &data.phone_number,
        "Phone number is required",
        "Phone number must be 10 digits",
    );
    ten_digits(
        &mut errors,
        "whatsappNumber",
        &data.whatsapp_number,
        "WhatsApp number is required",
        "WhatsApp number must be 10 digits",
    );

    if let Some(description) = &data.description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            errors.push(FieldError::new(
                "description",
                format!("Description must be at most {} characters", MAX_DESCRIPTION_CHARS),
            ));
        }
    }

    for (position, image) in data.images.iter().enumerate() {
        if let Err(e) = validate_image_url(image) {
            errors.push(FieldError::new(
                format!("images[{}]", position),
                format!("Image URL at position {} is invalid: {}", position, e),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RegistryError::Validation(errors))
    }
}

fn require(errors: &mut Vec<FieldError>, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

fn ten_digits(errors: &mut Vec<FieldError>, field: &str, value: &str, missing: &str, malformed: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, missing));
    } else if !TEN_DIGITS.is_match(value) {
        errors.push(FieldError::new(field, malformed));
    }
}
