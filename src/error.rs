//! Crate error type.
//!
//! The layout and paint pipeline is infallible by design (invalid geometry
//! clamps, missing collaborators fall back), so errors only arise at the
//! terminal boundary: driver I/O and raw-mode setup.

use thiserror::Error;

/// Errors produced by the terminal driver and application loop.
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying terminal I/O operation failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event loop was started on an app constructed without a driver.
    #[error("no terminal driver attached (headless app)")]
    Headless,
}

/// Convenience alias used across the crate's fallible surface.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn headless_message() {
        assert!(Error::Headless.to_string().contains("headless"));
    }
}
