use crate::error::InvokeError;
use aws_sdk_lambda::types::InvocationType;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationMode {
    /// Wait for the function to finish and return its output.
    Synchronous,
    /// Wait only until the service has queued the event.
    FireAndForget,
}

impl InvocationMode {
    /// Name of the mode on the Lambda wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationMode::Synchronous => "RequestResponse",
            InvocationMode::FireAndForget => "Event",
        }
    }

    pub fn invocation_type(&self) -> InvocationType {
        match self {
            InvocationMode::Synchronous => InvocationType::RequestResponse,
            InvocationMode::FireAndForget => InvocationType::Event,
        }
    }
}

impl fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    function_name: String,
    payload: String,
    mode: InvocationMode,
}

impl InvocationRequest {
    pub fn new(
        function_name: impl Into<String>,
        payload: impl Into<String>,
        mode: InvocationMode,
    ) -> Result<Self, InvokeError> {
        let function_name = function_name.into();
        if function_name.trim().is_empty() {
            return Err(InvokeError::InvalidRequest(
                "function name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            function_name,
            payload: payload.into(),
            mode,
        })
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn mode(&self) -> InvocationMode {
        self.mode
    }
}

/// Response envelope as returned by the transport, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInvocation {
    pub status_code: i32,
    pub payload: Vec<u8>,
    pub function_error: Option<String>,
    pub executed_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub text: String,
    pub function_error: Option<String>,
}

impl InvocationResult {
    pub fn from_raw(raw: RawInvocation) -> Self {
        let text = match String::from_utf8(raw.payload) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };

        Self {
            text,
            function_error: raw.function_error,
        }
    }

    /// Error type reported by the function, if any. Empty strings count as none.
    pub fn reported_error(&self) -> Option<&str> {
        self.function_error
            .as_deref()
            .filter(|error_type| !error_type.is_empty())
    }

    pub fn into_output(self) -> Result<String, InvokeError> {
        match self.reported_error() {
            Some(error_type) => Err(InvokeError::RemoteExecution {
                error_type: error_type.to_string(),
                detail: self.text,
            }),
            None => Ok(self.text),
        }
    }
}
