//! Argument checking and numeric conversion for console commands.
//!
//! Numbers are accepted in decimal or with a `0x` prefix in hexadecimal.
//! Signed conversions also accept a leading `+` or `-`.

use crate::error::CommandError;

/// Checks that `args` (command name excluded) holds between `min` and `max`
/// tokens.
pub fn check_arg_count(
    args: &[&str],
    min: usize,
    max: usize,
    usage: &'static str,
) -> Result<(), CommandError> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(CommandError::ArgumentCount { usage })
    }
}

fn parse_unsigned(token: &str) -> Option<u64> {
    let token = token.strip_prefix('+').unwrap_or(token);
    match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

fn parse_signed(token: &str) -> Option<i64> {
    match token.strip_prefix('-') {
        Some(magnitude) => {
            let magnitude = parse_unsigned(magnitude)?;
            if magnitude == i64::MIN.unsigned_abs() {
                Some(i64::MIN)
            } else {
                i64::try_from(magnitude).ok().map(|value| -value)
            }
        }
        None => parse_unsigned(token).and_then(|value| i64::try_from(value).ok()),
    }
}

fn parse_error(token: &str) -> CommandError {
    CommandError::ArgumentParse {
        token: token.to_owned(),
    }
}

pub fn to_int(token: &str) -> Result<i32, CommandError> {
    parse_signed(token)
        .and_then(|value| i32::try_from(value).ok())
        .ok_or_else(|| parse_error(token))
}

pub fn to_uint(token: &str) -> Result<u32, CommandError> {
    parse_unsigned(token)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| parse_error(token))
}

pub fn to_long(token: &str) -> Result<i64, CommandError> {
    parse_signed(token).ok_or_else(|| parse_error(token))
}

pub fn to_ulong(token: &str) -> Result<u64, CommandError> {
    parse_unsigned(token).ok_or_else(|| parse_error(token))
}

/// A timer device index known to be below the driver's device count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceIndex(usize);

impl DeviceIndex {
    /// Validates a numeric index.
    pub fn new(index: usize, device_count: usize) -> Result<Self, CommandError> {
        if index < device_count {
            Ok(Self(index))
        } else {
            Err(CommandError::DeviceNotFound {
                token: index.to_string(),
                count: device_count,
            })
        }
    }

    /// Resolves a console token. Tokens that are not numbers do not name a
    /// device either.
    pub fn resolve(token: &str, device_count: usize) -> Result<Self, CommandError> {
        parse_unsigned(token)
            .and_then(|value| usize::try_from(value).ok())
            .filter(|&index| index < device_count)
            .map(Self)
            .ok_or_else(|| CommandError::DeviceNotFound {
                token: token.to_owned(),
                count: device_count,
            })
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_count_bounds_are_inclusive() {
        assert!(check_arg_count(&["0", "1"], 2, 3, "A B [C]").is_ok());
        assert!(check_arg_count(&["0", "1", "2"], 2, 3, "A B [C]").is_ok());
        assert_eq!(
            check_arg_count(&["0"], 2, 3, "A B [C]"),
            Err(CommandError::ArgumentCount { usage: "A B [C]" })
        );
        assert!(check_arg_count(&["0", "1", "2", "3"], 2, 3, "A B [C]").is_err());
    }

    #[test]
    fn converts_decimal_and_hex() {
        assert_eq!(to_int("-42"), Ok(-42));
        assert_eq!(to_int("0x10"), Ok(16));
        assert_eq!(to_uint("+7"), Ok(7));
        assert_eq!(to_uint("0XfF"), Ok(255));
        assert_eq!(to_long("-9223372036854775808"), Ok(i64::MIN));
        assert_eq!(to_ulong("18446744073709551615"), Ok(u64::MAX));
    }

    #[test]
    fn rejects_garbage_and_overflow() {
        assert!(to_int("ten").is_err());
        assert!(to_int("2147483648").is_err());
        assert!(to_uint("-1").is_err());
        assert!(to_uint("4294967296").is_err());
        assert!(to_long("").is_err());
        assert!(to_ulong("0x").is_err());
        assert_eq!(
            to_uint("12abc"),
            Err(CommandError::ArgumentParse {
                token: "12abc".into()
            })
        );
    }

    #[test]
    fn device_resolution() {
        assert_eq!(DeviceIndex::resolve("1", 2).map(DeviceIndex::get), Ok(1));
        assert_eq!(
            DeviceIndex::resolve("2", 2),
            Err(CommandError::DeviceNotFound {
                token: "2".into(),
                count: 2
            })
        );
        assert!(DeviceIndex::resolve("timer0", 2).is_err());
        assert!(DeviceIndex::resolve("-1", 2).is_err());
        assert!(DeviceIndex::new(0, 0).is_err());
    }
}
