use crate::client::InvocationClient;
use crate::error::InvokeError;
use crate::models::InvocationRequest;
use crate::transport::{AwsLambdaTransport, InvokeTransport};
use anyhow::{Context, Result};
use invoke_core::config::AppConfig;
use tokio::runtime::{Builder, Runtime};

/// Blocking wrapper around [`InvocationClient`] for callers without an async runtime.
///
/// Owns a current-thread runtime; calling it from inside another runtime panics.
pub struct BlockingInvocationClient<T> {
    inner: InvocationClient<T>,
    runtime: Runtime,
}

impl BlockingInvocationClient<AwsLambdaTransport> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let runtime = build_runtime()?;
        let inner = runtime.block_on(InvocationClient::from_config(config))?;
        Ok(Self { inner, runtime })
    }
}

impl<T> BlockingInvocationClient<T>
where
    T: InvokeTransport,
{
    pub fn new(inner: InvocationClient<T>) -> Result<Self> {
        Ok(Self {
            inner,
            runtime: build_runtime()?,
        })
    }

    pub fn invoke_sync(&self, function_name: &str, args_json: &str) -> Result<String, InvokeError> {
        self.runtime
            .block_on(self.inner.invoke_sync(function_name, args_json))
    }

    pub fn invoke_async(
        &self,
        function_name: &str,
        args_json: &str,
    ) -> Result<String, InvokeError> {
        self.runtime
            .block_on(self.inner.invoke_async(function_name, args_json))
    }

    pub fn invoke(&self, request: &InvocationRequest) -> Result<String, InvokeError> {
        self.runtime.block_on(self.inner.invoke(request))
    }
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime for blocking client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvocationMode, RawInvocation};
    use crate::transport::MockInvokeTransport;

    #[test]
    fn blocking_calls_select_the_matching_mode() {
        let mut transport = MockInvokeTransport::new();
        transport
            .expect_send()
            .withf(|request| request.mode() == InvocationMode::Synchronous)
            .times(1)
            .returning(|request| {
                Ok(RawInvocation {
                    status_code: 200,
                    payload: request.payload().as_bytes().to_vec(),
                    ..RawInvocation::default()
                })
            });
        transport
            .expect_send()
            .withf(|request| request.mode() == InvocationMode::FireAndForget)
            .times(1)
            .returning(|_| {
                Ok(RawInvocation {
                    status_code: 202,
                    ..RawInvocation::default()
                })
            });

        let client = BlockingInvocationClient::new(InvocationClient::new(transport)).unwrap();

        assert_eq!(
            client.invoke_sync("lambdaTest", r#"{"name":"bob"}"#).unwrap(),
            r#"{"name":"bob"}"#
        );
        assert_eq!(client.invoke_async("lambdaTest", "{}").unwrap(), "");
    }

    #[test]
    fn blocking_surfaces_function_errors() {
        let mut transport = MockInvokeTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(RawInvocation {
                status_code: 200,
                payload: b"boom".to_vec(),
                function_error: Some("Unhandled".to_string()),
                executed_version: None,
            })
        });

        let client = BlockingInvocationClient::new(InvocationClient::new(transport)).unwrap();
        let request =
            InvocationRequest::new("lambdaTest", "{}", InvocationMode::Synchronous).unwrap();

        let err = client.invoke(&request).unwrap_err();
        assert_eq!(err.detail(), Some("boom"));
    }
}
