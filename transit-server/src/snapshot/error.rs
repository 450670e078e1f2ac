//! Snapshot provider error types.

/// Errors raised while reading the route/stop snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Reading the backing file failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The data file is not valid JSON for the expected shape
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// A route's stop order is inconsistent
    #[error("route {route}: {reason}")]
    InvalidRoute { route: String, reason: String },

    /// The provider has no routes and no stops at all
    #[error("snapshot is empty: no routes or stops available")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SnapshotError::Empty;
        assert_eq!(
            err.to_string(),
            "snapshot is empty: no routes or stops available"
        );

        let err = SnapshotError::InvalidRoute {
            route: "5".into(),
            reason: "duplicate stop_order 3".into(),
        };
        assert_eq!(err.to_string(), "route 5: duplicate stop_order 3");

        let err = SnapshotError::Json {
            message: "expected value".into(),
        };
        assert!(err.to_string().contains("expected value"));
    }
}
