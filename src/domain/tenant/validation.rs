//! Workspace name and slug validation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const NAME_MAX: usize = 255;
pub const SLUG_MAX: usize = 64;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Validation errors for workspace fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenantValidationError {
    #[error("Workspace name cannot be empty")]
    NameEmpty,
    #[error("Workspace name must be at most {NAME_MAX} characters")]
    NameTooLong,
    #[error("Slug must be lowercase alphanumeric segments separated by single hyphens")]
    SlugFormat,
    #[error("Slug must be between 1 and {SLUG_MAX} characters")]
    SlugLength,
}

/// Validate a workspace display name
pub fn validate_tenant_name(name: &str) -> Result<(), TenantValidationError> {
    if name.trim().is_empty() {
        return Err(TenantValidationError::NameEmpty);
    }

    if name.chars().count() > NAME_MAX {
        return Err(TenantValidationError::NameTooLong);
    }

    Ok(())
}

/// Validate a slug
pub fn validate_slug(slug: &str) -> Result<(), TenantValidationError> {
    if slug.is_empty() || slug.len() > SLUG_MAX {
        return Err(TenantValidationError::SlugLength);
    }

    if !SLUG_RE.is_match(slug) {
        return Err(TenantValidationError::SlugFormat);
    }

    Ok(())
}

/// Derive a base slug from a workspace name.
///
/// Non-alphanumeric runs collapse to single hyphens. The result is truncated
/// so that collision suffixes still fit within the slug length limit. Names
/// with no usable characters fall back to "workspace".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    // leave room for "-NNN" collision suffixes
    slug.truncate(SLUG_MAX - 4);

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("workspace");
    }

    slug
}
