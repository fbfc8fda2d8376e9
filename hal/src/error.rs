//! Common error types for HAL operations

use core::fmt;

/// Driver code for an operation the device does not implement.
pub const CODE_NOT_SUPPORTED: i32 = -95;
/// Driver code for a frequency the device cannot be clocked at.
pub const CODE_INVALID_FREQUENCY: i32 = -22;
/// Driver code for a channel the device does not have.
pub const CODE_INVALID_CHANNEL: i32 = -34;
/// Driver code for an operation on a device that was never initialised.
pub const CODE_UNINITIALIZED: i32 = -1;

/// HAL operation errors
///
/// Drivers report failures as plain integers on most platforms. Every variant
/// maps to exactly one code so that callers can pass the value through
/// without reinterpreting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Operation not supported by this implementation
    NotSupported,
    /// Requested timer frequency cannot be generated
    InvalidFrequency,
    /// Channel index out of range for the device
    InvalidChannel,
    /// Device used before `init`
    Uninitialized,
    /// Vendor-specific error code
    VendorError(i32),
}

impl HalError {
    /// Returns the numeric driver code for this error.
    pub const fn code(&self) -> i32 {
        match self {
            Self::NotSupported => CODE_NOT_SUPPORTED,
            Self::InvalidFrequency => CODE_INVALID_FREQUENCY,
            Self::InvalidChannel => CODE_INVALID_CHANNEL,
            Self::Uninitialized => CODE_UNINITIALIZED,
            Self::VendorError(code) => *code,
        }
    }

    /// Maps a raw driver code back to an error. `0` is success and yields `None`.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => None,
            CODE_NOT_SUPPORTED => Some(Self::NotSupported),
            CODE_INVALID_FREQUENCY => Some(Self::InvalidFrequency),
            CODE_INVALID_CHANNEL => Some(Self::InvalidChannel),
            CODE_UNINITIALIZED => Some(Self::Uninitialized),
            other => Some(Self::VendorError(other)),
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "operation not supported"),
            Self::InvalidFrequency => write!(f, "invalid timer frequency"),
            Self::InvalidChannel => write!(f, "invalid timer channel"),
            Self::Uninitialized => write!(f, "timer not initialized"),
            Self::VendorError(code) => write!(f, "vendor error code: {}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;

/// Collapses a HAL result into the driver's integer convention.
pub fn result_code(result: HalResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}
