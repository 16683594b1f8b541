use std::fmt;
use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while building, training or persisting a
/// `Network`.  Each variant is caller-actionable; nothing is retried.
#[derive(Debug)]
pub enum NetError {
    /// Unusable configuration: empty layer list, non-positive batch size or
    /// learning rate, empty training set, or a layer that rejects its input.
    Configuration(String),
    /// A vector's width does not match what the network or layer expects.
    Dimension {
        context: String,
        expected: usize,
        actual: usize,
    },
    /// Filesystem failure while saving, loading or writing a report.
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// A saved model that cannot be parsed or is internally inconsistent.
    CorruptFormat(String),
}

pub type Result<T> = std::result::Result<T, NetError>;

impl NetError {
    pub fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        NetError::Dimension { context: context.into(), expected, actual }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        NetError::Io { path: path.into(), source }
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Configuration(msg) => write!(f, "configuration error: {}", msg),
            NetError::Dimension { context, expected, actual } => write!(
                f,
                "dimension error: {} expected width {}, got {}",
                context, expected, actual
            ),
            NetError::Io { path, source } => {
                write!(f, "i/o error on '{}': {}", path.display(), source)
            }
            NetError::CorruptFormat(msg) => write!(f, "corrupt model file: {}", msg),
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_mismatch() {
        let err = NetError::dimension("example input", 2, 3);
        assert_eq!(err.to_string(), "dimension error: example input expected width 2, got 3");
    }

    #[test]
    fn io_errors_keep_their_source() {
        use std::error::Error;
        let err = NetError::io("/nope", io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/nope"));
    }
}
