//! New-name validation for rename and copy-here.

use filedesk_core::ValidationError;

/// Check a proposed name against the item's current name.
///
/// A name is acceptable when it is non-empty and differs from the current one.
pub fn validate_new_name(current: &str, proposed: &str) -> Result<(), ValidationError> {
    if proposed.is_empty() {
        return Err(ValidationError::invalid_name(proposed, "Name cannot be empty"));
    }
    if proposed == current {
        return Err(ValidationError::invalid_name(
            proposed,
            "Name is the same as the current name",
        ));
    }
    Ok(())
}

/// Predicate form of [`validate_new_name`], for text prompts.
pub fn is_acceptable_name(current: &str, proposed: &str) -> bool {
    validate_new_name(current, proposed).is_ok()
}
