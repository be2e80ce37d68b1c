//! Form validation.
//!
//! Every form owns a [`Validator`] field and runs its checks through it; the
//! collected messages are rendered next to the offending inputs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// The pattern recommended by the WHATWG for `<input type="email">`.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Accumulates validation failures.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    pub non_field_errors: Vec<String>,
    pub field_errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records `message` for `key` unless the field already has an error.
    pub fn add_field_error(&mut self, key: &str, message: &str) {
        self.field_errors
            .entry(key.to_owned())
            .or_insert_with(|| message.to_owned());
    }

    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_owned());
    }

    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// At most `n` characters (not bytes).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}
