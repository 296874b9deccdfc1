/// Error types for the geodat library
use std::fmt;
use std::io;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for database load operations
///
/// Carries string payloads and derives `Clone` so the shared accessor can
/// cache a load failure and hand it back to every later caller.
///
/// Malformed *query* input is not represented here: an unparseable IPv4
/// string degrades to a `None` lookup result (best-effort contract), never
/// to an error value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// I/O errors opening or reading the database file
    Io(String),

    /// Memory mapping errors
    Mmap(String),

    /// Format/parsing errors (truncated file, out-of-range text span,
    /// invalid prefix window, non-UTF-8 record text)
    Format(String),
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::Io(msg) => write!(f, "I/O error: {}", msg),
            GeoError::Mmap(msg) => write!(f, "Memory mapping error: {}", msg),
            GeoError::Format(msg) => write!(f, "Format error: {}", msg),
        }
    }
}

impl std::error::Error for GeoError {}

impl From<io::Error> for GeoError {
    fn from(err: io::Error) -> Self {
        GeoError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_payload() {
        let err = GeoError::Format("prefix window out of range".to_string());
        assert_eq!(err.to_string(), "Format error: prefix window out of range");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err: GeoError = io_err.into();
        assert!(matches!(err, GeoError::Io(_)));
    }

    #[test]
    fn test_clone_and_eq() {
        let err = GeoError::Io("gone".to_string());
        assert_eq!(err.clone(), err);
    }
}
