//! File extension derivation from image URLs.

use crate::error::ExtensionError;

/// Returns the lower-cased extension of the last path segment of `url`.
///
/// Query and fragment are ignored. Fails when the last segment has no `.`
/// or nothing follows it.
pub fn extension(url: &str) -> Result<String, ExtensionError> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => Ok(ext.to_ascii_lowercase()),
        _ => Err(ExtensionError {
            url: url.to_string(),
        }),
    }
}

/// `<stem>.<extension of url>`.
pub fn output_filename(stem: &str, url: &str) -> Result<String, ExtensionError> {
    Ok(format!("{stem}.{}", extension(url)?))
}
