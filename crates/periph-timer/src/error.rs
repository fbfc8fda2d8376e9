//! Command status codes and the console error taxonomy.

use thiserror::Error;

/// Command completed and the driver reported success.
pub const RESULT_OK: i32 = 0;
/// Command ran but the driver (or the wait) failed.
pub const RESULT_ERROR: i32 = -1;
/// Arguments were missing, surplus or unparsable.
pub const ARGS_ERROR: i32 = 1;
/// `errno` value for a device index that does not exist.
pub const ENODEV: i32 = 19;
/// `errno` value reported when a bounded wait expires.
pub const ETIMEDOUT: i32 = 110;

/// Failures detected before any hardware is touched.
///
/// Driver failures are not errors at this level: their codes are carried
/// verbatim in a [`CommandOutcome`](crate::CommandOutcome).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Invalid number of arguments")]
    ArgumentCount { usage: &'static str },

    #[error("unable to parse arguments")]
    ArgumentParse { token: String },

    #[error("No device, only {count} supported")]
    DeviceNotFound { token: String, count: usize },

    #[error("no valid callback name given. Valid values are cb_toggle, cb_high or cb_low")]
    UnknownCallback { name: String },
}

impl CommandError {
    /// Status code returned to the enclosing shell.
    pub fn status(&self) -> i32 {
        match self {
            Self::DeviceNotFound { .. } => -ENODEV,
            Self::ArgumentCount { .. }
            | Self::ArgumentParse { .. }
            | Self::UnknownCallback { .. } => ARGS_ERROR,
        }
    }
}

/// Failures while wiring a [`TimerTester`](crate::TimerTester) together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("driver exposes {count} timer devices, at most {max} are supported")]
    TooManyDevices { count: usize, max: usize },
}
