use thiserror::Error;

/// Error type the transport seam hands back; kept opaque so the SDK error survives unmodified.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("invalid invocation request: {0}")]
    InvalidRequest(String),
    /// The request could not be delivered or acknowledged.
    #[error("lambda invocation failed in transport")]
    Transport(#[source] BoxError),
    /// The function ran and reported a failure; `detail` is its raw output.
    #[error("{error_type} error in lambda invoke result: {detail}")]
    RemoteExecution { error_type: String, detail: String },
    #[error("failed to serialize invocation payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl InvokeError {
    pub fn is_remote_execution(&self) -> bool {
        matches!(self, InvokeError::RemoteExecution { .. })
    }

    /// Raw function output carried by a remote execution failure.
    pub fn detail(&self) -> Option<&str> {
        match self {
            InvokeError::RemoteExecution { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn transport_keeps_the_underlying_error_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset");
        let err = InvokeError::Transport(Box::new(io));

        assert_eq!(err.to_string(), "lambda invocation failed in transport");
        let source = err.source().expect("transport error has a source");
        let io = source
            .downcast_ref::<std::io::Error>()
            .expect("source is the original io error");
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn remote_execution_displays_type_and_detail() {
        let err = InvokeError::RemoteExecution {
            error_type: "Unhandled".to_string(),
            detail: "boom".to_string(),
        };

        assert!(err.is_remote_execution());
        assert_eq!(err.detail(), Some("boom"));
        assert_eq!(
            err.to_string(),
            "Unhandled error in lambda invoke result: boom"
        );
    }
}
