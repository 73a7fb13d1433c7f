//! Library backing the `rpi-i2c-timing` utility.
//!
//! The tool maps the BSC1 (I2C1) register window of a BCM2711 based
//! Raspberry Pi directly from `/dev/mem`, bypassing the kernel I2C
//! driver, to inspect and optionally rewrite the bus timing registers
//! (clock divider, clock stretch timeout and data delays).
use std::io;

pub mod clock;
pub mod devmem;
pub mod firmware;
pub mod report;
pub mod timing;

/// Fatal error conditions of a single invocation.
///
/// Wrong-argument-count usage errors never reach this type, they are
/// rejected by the CLI parser. The core clock sample is advisory and
/// its absence is not an error either.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not parse {name} value: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{name} = {value} out of bounds ({lo}, {hi})")]
    OutOfRange {
        name: &'static str,
        value: i64,
        lo: i64,
        hi: i64,
    },
    #[error("could not query device tree node {path}: {source}")]
    DeviceTree {
        path: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("could not open /dev/mem: {source}")]
    DevMemOpen {
        #[source]
        source: io::Error,
    },
    #[error("could not map I2C register window: {source}")]
    Map {
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Process exit code for this error, following errno conventions:
    /// parse failures map to EINVAL, bound violations to ERANGE and
    /// resource acquisition failures to the underlying OS error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Parse { .. } => libc::EINVAL,
            Error::OutOfRange { .. } => libc::ERANGE,
            Error::DeviceTree { source, .. }
            | Error::DevMemOpen { source }
            | Error::Map { source } => source.raw_os_error().unwrap_or(libc::EIO),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_errno() {
        let err = Error::OutOfRange {
            name: "CDIV",
            value: 70000,
            lo: 0,
            hi: 65535,
        };
        assert_eq!(err.exit_code(), libc::ERANGE);
        let err = Error::DevMemOpen {
            source: io::Error::from_raw_os_error(libc::EACCES),
        };
        assert_eq!(err.exit_code(), libc::EACCES);
        let err = Error::Map {
            source: io::Error::other("no raw error"),
        };
        assert_eq!(err.exit_code(), libc::EIO);
    }
}
