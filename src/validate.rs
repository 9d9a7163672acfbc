//! Client-side field validation mirroring server constraints.
//!
//! These checks exist so forms can reject bad input before a round-trip;
//! the server remains authoritative. Uniqueness checks (registered email)
//! need the API and live on `ApiClient` instead.

/// Outcome of a field check. `message` is set only when invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validity {
    pub is_valid: bool,
    pub message: Option<&'static str>,
}

impl Validity {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    fn invalid(message: &'static str) -> Self {
        Self {
            is_valid: false,
            message: Some(message),
        }
    }
}

/// Password rule: at least 8 characters, combining at least two of the
/// three classes (letters, digits, special characters).
pub fn check_password_pattern(password: &str) -> Validity {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password
        .chars()
        .any(|c| !c.is_ascii_alphabetic() && !c.is_ascii_digit());

    let classes = [has_letter, has_digit, has_special]
        .iter()
        .filter(|present| **present)
        .count();

    if password.len() >= 8 && classes >= 2 {
        Validity::valid()
    } else {
        Validity::invalid(
            "Password should contain at least 8 characters and \
             two character types out of three (letters, numbers, special characters)",
        )
    }
}

/// Username rule: 2 to 150 characters, letters, digits and @/./+/-/_ only.
pub fn check_username(username: &str) -> Validity {
    let length = username.chars().count();
    let charset_ok = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));

    if (2..=150).contains(&length) && charset_ok {
        Validity::valid()
    } else {
        Validity::invalid("Username must be 2 to 150 characters: letters, digits and @/./+/-/_")
    }
}

/// Structural email check: one `@`, non-empty local part, dotted domain
/// without whitespace.
pub fn check_email_pattern(email: &str) -> Validity {
    let mut parts = email.split('@');
    let structure_ok = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    };

    if structure_ok {
        Validity::valid()
    } else {
        Validity::invalid("Enter a valid email address")
    }
}
