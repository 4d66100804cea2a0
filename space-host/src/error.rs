//! Errors returned by `SpaceHost` implementations
//!
use snafu::prelude::*;

/// Errors a remote space host can report for any read or write operation.
///
/// The snapshot engine treats all of these as retryable or skippable on a
/// per-entity basis; none of them is fatal to a whole capture or restore
/// except when the space itself cannot be resolved.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HostError {
    /// The requested entity does not exist on the host.
    #[snafu(display("{obj_type} {key} not found"))]
    NotFound { obj_type: String, key: String },

    /// The caller lacks permission for the attempted operation.
    #[snafu(display("capability denied for {operation}"))]
    CapabilityDenied { operation: String },

    /// The host applied backpressure. `retry_after_secs` is the wait the
    /// host suggested, when it provided one.
    #[snafu(display("rate limited on {operation}"))]
    RateLimited {
        operation: String,
        retry_after_secs: Option<u64>,
    },

    /// A supplied value is outside the range the host accepts.
    #[snafu(display("validation failed for {field}: {message}"))]
    Validation { field: String, message: String },

    /// Connection-level failure between the client and the host.
    #[snafu(display("transport error during {operation}: {message}"))]
    Transport { operation: String, message: String },
}

impl HostError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(obj_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            obj_type: obj_type.into(),
            key: key.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let err = HostError::not_found("Channel", "c-9");
        assert_eq!(err.to_string(), "Channel c-9 not found");
    }

    #[test]
    fn test_display_rate_limited() {
        let err = HostError::RateLimited {
            operation: "create_channel".to_string(),
            retry_after_secs: Some(2),
        };
        assert!(err.to_string().contains("create_channel"));
    }
}
