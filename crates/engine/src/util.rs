//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, ResultEngine};

/// Declares a closed set of upper-case wire names with `as_str` and a
/// labelled `TryFrom<&str>`.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($label:literal) {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = crate::EngineError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::EngineError::InvalidInput(format!(
                        "invalid {}: {other}",
                        $label
                    ))),
                }
            }
        }
    };
}

pub(crate) use text_enum;

/// Trim a required text field, rejecting blank values.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Comparison key for names that must be unique regardless of case,
/// accents or spacing ("Nhóm  Xe" and "nhom xe" collide).
pub(crate) fn normalize_key(input: &str) -> Option<String> {
    let mut out = String::new();
    let mut prev_space = false;
    for ch in input.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

const CODE_LEN: std::ops::RangeInclusive<usize> = 5..=20;
const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=15;

/// Upper-case identifier with inner whitespace removed (VINs, plates),
/// 5 to 20 characters long.
pub(crate) fn normalize_code(value: &str, label: &str) -> ResultEngine<String> {
    let code: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect();
    if code.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    if !CODE_LEN.contains(&code.chars().count()) {
        return Err(EngineError::InvalidInput(format!(
            "{label} must be between {} and {} characters",
            CODE_LEN.start(),
            CODE_LEN.end()
        )));
    }
    Ok(code)
}

/// Usernames are 3 to 15 ASCII letters, digits or underscores and do not
/// start with a digit.
pub(crate) fn normalize_username(value: &str) -> ResultEngine<String> {
    let username = normalize_required(value, "username")?;
    if !USERNAME_LEN.contains(&username.len()) {
        return Err(EngineError::InvalidInput(format!(
            "username must be between {} and {} characters",
            USERNAME_LEN.start(),
            USERNAME_LEN.end()
        )));
    }
    let mut chars = username.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(EngineError::InvalidInput(
            "username may only use letters, digits and '_' and must not start with a digit"
                .to_string(),
        ));
    }
    Ok(username)
}

/// Ownership percentages live in `(0, 1]`.
pub(crate) fn validate_percentage(percentage: f64) -> ResultEngine<()> {
    if !percentage.is_finite() || percentage <= 0.0 || percentage > 1.0 {
        return Err(EngineError::InvalidInput(
            "percentage must be in (0, 1]".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_key_folds_case_accents_and_spaces() {
        assert_eq!(normalize_key("  Nhóm  Xe "), Some("nhom xe".to_string()));
        assert_eq!(normalize_key("EV-Team #1"), Some("ev team 1".to_string()));
        assert_eq!(normalize_key(" -- "), None);
    }

    #[test]
    fn normalize_code_uppercases_and_strips_spaces() {
        assert_eq!(
            normalize_code(" 51g 123.45 ", "plate").unwrap(),
            "51G123.45".to_string()
        );
        assert!(normalize_code("   ", "vin").is_err());
    }

    #[test]
    fn codes_are_five_to_twenty_characters() {
        assert!(normalize_code("AB12", "plate").is_err());
        assert!(normalize_code("AB 123", "plate").is_ok());
        assert!(normalize_code(&"A".repeat(20), "vin").is_ok());
        assert!(normalize_code(&"A".repeat(21), "vin").is_err());
    }

    #[test]
    fn username_rules() {
        assert_eq!(normalize_username("  anna_1 ").unwrap(), "anna_1");
        assert!(normalize_username("_ops").is_ok());
        for bad in ["ab", "1anna", "anna nguyen", "anna-b", "a_very_long_username", "ánna"] {
            assert!(normalize_username(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn percentage_bounds() {
        assert!(validate_percentage(1.0).is_ok());
        assert!(validate_percentage(0.01).is_ok());
        assert!(validate_percentage(0.0).is_err());
        assert!(validate_percentage(1.01).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
    }
}
