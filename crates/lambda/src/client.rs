use crate::credentials::resolve_provider;
use crate::error::InvokeError;
use crate::models::{InvocationMode, InvocationRequest, InvocationResult};
use crate::transport::{AwsLambdaTransport, InvokeTransport};
use anyhow::Result;
use invoke_core::config::AppConfig;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

/// Performs exactly one Lambda invocation per call and classifies the outcome.
#[derive(Debug, Clone)]
pub struct InvocationClient<T> {
    transport: T,
}

impl InvocationClient<AwsLambdaTransport> {
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let credentials = resolve_provider(&config.lambda.credentials).await;
        let transport = AwsLambdaTransport::connect(&config.lambda, credentials).await?;
        Ok(Self::new(transport))
    }
}

impl<T> InvocationClient<T>
where
    T: InvokeTransport,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Run the function and wait for its output.
    pub async fn invoke_sync(
        &self,
        function_name: &str,
        args_json: &str,
    ) -> Result<String, InvokeError> {
        let request =
            InvocationRequest::new(function_name, args_json, InvocationMode::Synchronous)?;
        self.invoke(&request).await
    }

    /// Queue the function for execution. The returned text is the acknowledgement body.
    pub async fn invoke_async(
        &self,
        function_name: &str,
        args_json: &str,
    ) -> Result<String, InvokeError> {
        let request =
            InvocationRequest::new(function_name, args_json, InvocationMode::FireAndForget)?;
        self.invoke(&request).await
    }

    pub async fn invoke_json<A>(
        &self,
        function_name: &str,
        args: &A,
        mode: InvocationMode,
    ) -> Result<String, InvokeError>
    where
        A: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(args)?;
        let request = InvocationRequest::new(function_name, payload, mode)?;
        self.invoke(&request).await
    }

    #[instrument(skip_all, fields(function = %request.function_name(), mode = %request.mode()))]
    pub async fn invoke(&self, request: &InvocationRequest) -> Result<String, InvokeError> {
        info!("Lambda invoke {}", request.function_name());

        let raw = self
            .transport
            .send(request)
            .await
            .map_err(InvokeError::Transport)?;

        debug!(
            status_code = raw.status_code,
            executed_version = ?raw.executed_version,
            "lambda acknowledged invocation"
        );

        let result = InvocationResult::from_raw(raw);
        if let Some(error_type) = result.reported_error() {
            error!(
                error_type = %error_type,
                detail = %result.text,
                "{} error in Lambda invoke result",
                error_type
            );
        }

        result.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawInvocation;
    use crate::transport::MockInvokeTransport;
    use serde_json::json;

    fn respond(payload: &str, function_error: Option<&str>) -> RawInvocation {
        RawInvocation {
            status_code: 200,
            payload: payload.as_bytes().to_vec(),
            function_error: function_error.map(str::to_string),
            executed_version: Some("$LATEST".to_string()),
        }
    }

    #[tokio::test]
    async fn sync_echo_returns_payload() {
        let mut transport = MockInvokeTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.function_name() == "echo"
                    && request.payload() == r#"{"name":"bob"}"#
                    && request.mode() == InvocationMode::Synchronous
            })
            .times(1)
            .returning(|request| Ok(respond(request.payload(), None)));

        let client = InvocationClient::new(transport);
        let output = client.invoke_sync("echo", r#"{"name":"bob"}"#).await.unwrap();

        assert_eq!(output, r#"{"name":"bob"}"#);
    }

    #[tokio::test]
    async fn sync_function_error_raises_remote_execution() {
        let mut transport = MockInvokeTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(respond("boom", Some("Unhandled"))));

        let client = InvocationClient::new(transport);
        let err = client.invoke_sync("echo", "{}").await.unwrap_err();

        assert!(err.is_remote_execution());
        assert_eq!(err.detail(), Some("boom"));
    }

    #[tokio::test]
    async fn async_acknowledgement_returns_empty_string() {
        let mut transport = MockInvokeTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.function_name() == "fireAndForget"
                    && request.mode() == InvocationMode::FireAndForget
            })
            .times(1)
            .returning(|_| {
                Ok(RawInvocation {
                    status_code: 202,
                    ..RawInvocation::default()
                })
            });

        let client = InvocationClient::new(transport);
        let output = client
            .invoke_async("fireAndForget", r#"{"any":"thing"}"#)
            .await
            .unwrap();

        assert_eq!(output, "");
    }

    #[tokio::test]
    async fn async_acceptance_error_is_still_a_remote_execution() {
        let mut transport = MockInvokeTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(|_| Ok(respond("rejected", Some("Handled"))));

        let client = InvocationClient::new(transport);
        let err = client.invoke_async("fireAndForget", "{}").await.unwrap_err();

        assert!(err.is_remote_execution());
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_retry() {
        let mut transport = MockInvokeTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )
            .into())
        });

        let client = InvocationClient::new(transport);
        let err = client.invoke_sync("echo", "{}").await.unwrap_err();

        match err {
            InvokeError::Transport(source) => {
                let io = source
                    .downcast_ref::<std::io::Error>()
                    .expect("original error is preserved");
                assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_function_name_never_reaches_transport() {
        let mut transport = MockInvokeTransport::new();
        transport.expect_send().never();

        let client = InvocationClient::new(transport);

        let err = client.invoke_sync("", "{}").await.unwrap_err();
        assert!(matches!(err, InvokeError::InvalidRequest(_)));

        let err = client.invoke_async(" ", "{}").await.unwrap_err();
        assert!(matches!(err, InvokeError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn invoke_json_serializes_arguments() {
        let mut transport = MockInvokeTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                serde_json::from_str::<serde_json::Value>(request.payload()).ok()
                    == Some(json!({"name": "bob", "age": 42}))
                    && request.mode() == InvocationMode::FireAndForget
            })
            .times(1)
            .returning(|_| Ok(respond("", None)));

        let client = InvocationClient::new(transport);
        let output = client
            .invoke_json(
                "lambdaTest",
                &json!({"name": "bob", "age": 42}),
                InvocationMode::FireAndForget,
            )
            .await
            .unwrap();

        assert_eq!(output, "");
    }
}
