//! Name validation and collision suffixes.

use std::collections::HashSet;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_entity::item::ItemType;

/// Validate a user-supplied name and return it trimmed.
pub fn validate_name(name: &str, max_length: usize) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_argument("Name cannot be empty"));
    }
    if trimmed.chars().count() > max_length {
        return Err(AppError::invalid_argument(format!(
            "Name cannot be longer than {max_length} characters"
        )));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(AppError::invalid_argument(
            "Name cannot contain path separators ('/' or '\\')",
        ));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(AppError::invalid_argument(
            "Name cannot contain control characters",
        ));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::invalid_argument("Name cannot be '.' or '..'"));
    }
    Ok(trimmed.to_string())
}

/// `name (n)` for folders, `stem (n).ext` for files, shortening the name
/// or stem so the result stays within `max_length` characters.
pub fn with_suffix(name: &str, n: u32, item_type: ItemType, max_length: usize) -> String {
    let suffix = format!(" ({n})");
    if item_type == ItemType::File {
        if let Some((stem, ext)) = name.rsplit_once('.') {
            let room = max_length.saturating_sub(suffix.chars().count() + ext.chars().count() + 1);
            if !stem.is_empty() && room > 0 {
                return format!("{}{suffix}.{ext}", truncate_chars(stem, room));
            }
        }
    }
    let room = max_length.saturating_sub(suffix.chars().count());
    format!("{}{suffix}", truncate_chars(name, room))
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].trim_end(),
        None => s,
    }
}

/// Pick `desired` or its smallest free suffixed form.
pub fn free_name(
    desired: &str,
    item_type: ItemType,
    taken: &HashSet<String>,
    max_suffix: u32,
    max_length: usize,
) -> AppResult<String> {
    if !taken.contains(desired) {
        return Ok(desired.to_string());
    }
    (1..=max_suffix)
        .map(|n| with_suffix(desired, n, item_type, max_length))
        .find(|candidate| !taken.contains(candidate))
        .ok_or_else(|| {
            AppError::conflict(format!(
                "No free name for '{desired}' after {max_suffix} attempts"
            ))
        })
}
