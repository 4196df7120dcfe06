//! Identifier rules for generator, parameter and option names.

use crate::{Error, Result};

/// Check whether a name is usable for a generator, param, input or option.
///
/// Returns None if valid, Some(reason) if invalid.
///
/// The rules are those of a C identifier, tightened in two ways: a leading
/// underscore is forbidden rather than merely reserved, and two underscores
/// in a row are forbidden anywhere.
pub fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    match chars.next() {
        None => return Some("name cannot be empty"),
        Some(c) if c.is_ascii_alphabetic() => {}
        Some('_') => return Some("name cannot start with an underscore"),
        Some(_) => return Some("name must start with a letter"),
    }

    let mut prev_was_underscore = false;
    for c in chars {
        if c == '_' {
            if prev_was_underscore {
                return Some("name cannot contain consecutive underscores");
            }
            prev_was_underscore = true;
        } else if c.is_ascii_alphanumeric() {
            prev_was_underscore = false;
        } else {
            return Some("name must contain only letters, digits and underscores");
        }
    }

    None
}

/// Returns true iff the name is valid for generators, params and options.
pub fn is_valid_name(name: &str) -> bool {
    validate_identifier(name).is_none()
}

/// Validate a name, producing an [`Error::InvalidName`] for the given context
/// (e.g. "Param", "Input", "generator").
pub fn validate_name(name: &str, context: &str) -> Result<()> {
    match validate_identifier(name) {
        Some(reason) => Err(Error::invalid_name(name, context, reason)),
        None => Ok(()),
    }
}

/// Split a possibly namespaced function name (`a::b::f`) into its namespaces
/// and simple name.
pub fn split_namespaces(function_name: &str) -> (Vec<&str>, &str) {
    let mut parts: Vec<&str> = function_name.split("::").collect();
    // split always yields at least one element
    let simple = parts.pop().unwrap_or(function_name);
    (parts, simple)
}
