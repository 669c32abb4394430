use std::collections::HashSet;

use crate::core::observer::SelectionObserver;
use crate::errors::VerifyError;

/// Confirms a candidate instance type against an allow-list and a default.
///
/// An empty candidate means no preference was expressed and resolves to the
/// default. A non-empty candidate has to be either the default (when the
/// allow-list is empty) or a member of the allow-list.
pub fn verify_instance_type(
    candidate: &str,
    allowed_instance_types: &[String],
    default_instance_type: &str,
    observer: &dyn SelectionObserver,
) -> Result<String, VerifyError> {
    if candidate.is_empty() {
        observer.defaulted(default_instance_type);
        return Ok(default_instance_type.to_string());
    }

    if allowed_instance_types.is_empty() {
        if candidate != default_instance_type {
            return Err(VerifyError::AmbiguousDefaultPolicy {
                requested: candidate.to_string(),
                default: default_instance_type.to_string(),
            });
        }
        return Ok(candidate.to_string());
    }

    let allowed: HashSet<&str> = allowed_instance_types.iter().map(String::as_str).collect();
    if !allowed.contains(candidate) {
        return Err(VerifyError::UnsupportedInstanceType {
            requested: candidate.to_string(),
        });
    }

    Ok(candidate.to_string())
}
