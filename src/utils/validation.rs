use crate::utils::error::{Result, ScraperError};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 支援的 Shopee 國家網域
pub const SUPPORTED_DOMAINS: &[&str] = &[
    "shopee.co.th",
    "shopee.sg",
    "shopee.vn",
    "shopee.co.id",
    "shopee.com.my",
    "shopee.ph",
    "shopee.tw",
    "shopee.br",
    "shopee.com.mx",
    "shopee.cl",
    "shopee.com.co",
];

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> ScraperError {
    ScraperError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Absolute http(s) URL, used for base URL overrides.
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Not an absolute URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            url_str,
            format!("Only http and https are supported, got '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field_name, url_str, "URL has no host"));
    }
    Ok(())
}

pub fn validate_domain(field_name: &str, domain: &str) -> Result<()> {
    if SUPPORTED_DOMAINS.contains(&domain) {
        return Ok(());
    }
    Err(invalid(
        field_name,
        domain,
        format!("Supported domains: {}", SUPPORTED_DOMAINS.join(", ")),
    ))
}

/// Export target: non-empty, no NUL, not a directory.
pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    let reason = if path.trim().is_empty() {
        "Output path is empty"
    } else if path.contains('\0') {
        "Output path contains a NUL byte"
    } else if path.ends_with('/') || path.ends_with('\\') {
        "Output path points to a directory, expected a file name"
    } else {
        return Ok(());
    };
    Err(invalid(field_name, path, reason))
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed: HashSet<&str> = allowed_extensions.iter().copied().collect();

    let extension = std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if allowed.contains(ext.as_str()) => Ok(()),
        Some(ext) => Err(invalid(
            field_name,
            file,
            format!(
                "Cannot export '.{}' files, use one of: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        )),
        None => Err(invalid(
            field_name,
            file,
            format!("Add a file extension ({})", allowed_extensions.join(", ")),
        )),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "Must not be blank"));
    }
    Ok(())
}

/// Inclusive bounds check for numeric settings (pages, attempts, timeouts).
pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field_name, value, format!("Expected {} to {}", min, max)))
    }
}
