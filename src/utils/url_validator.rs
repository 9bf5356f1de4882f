// SPDX-License-Identifier: GPL-3.0-only
use url::Url;
use anyhow::{Result, Context};

/// Maximum allowed URL length
const MAX_URL_LENGTH: usize = 2048;

/// Validate a listing image URL
///
/// Checks:
/// - Validates URL length
/// - Only allows http/https schemes
/// - Requires a host
pub fn validate_image_url(url_str: &str) -> Result<()> {
    if url_str.len() > MAX_URL_LENGTH {
        return Err(anyhow::anyhow!("URL exceeds maximum length of {} characters", MAX_URL_LENGTH));
    }

    let url = Url::parse(url_str)
        .context("Invalid URL format")?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(anyhow::anyhow!(
                "Invalid URL scheme: {} (only http and https are allowed)",
                scheme
            ));
        }
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(anyhow::anyhow!("URL must have a host")),
    }
}
