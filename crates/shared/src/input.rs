use std::{fmt::Display, str::FromStr};

/// Parses a user-supplied numeric field, falling back to `default` on bad input.
///
/// Invalid input never blocks the caller; the reset is only logged.
pub fn parse_or_default<T>(raw: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(input = raw, %default, "invalid numeric input; using default");
            default
        }
    }
}
