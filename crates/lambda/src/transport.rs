use crate::error::BoxError;
use crate::models::{InvocationRequest, RawInvocation};
use anyhow::Result;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_sdk_lambda::primitives::Blob;
use invoke_core::config::LambdaConfig;
use tracing::{info, instrument};

/// Delivers one invocation to the compute service.
///
/// Implementations must not retry or reinterpret errors; classification of the
/// response happens in [`crate::InvocationClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvokeTransport: Send + Sync {
    async fn send(&self, request: &InvocationRequest) -> Result<RawInvocation, BoxError>;
}

#[derive(Debug, Clone)]
pub struct AwsLambdaTransport {
    inner: aws_sdk_lambda::Client,
}

impl AwsLambdaTransport {
    pub fn new(inner: aws_sdk_lambda::Client) -> Self {
        Self { inner }
    }

    /// Build an SDK client from configuration and an injected credential provider.
    #[instrument(skip_all, fields(region = ?config.region, endpoint = ?config.endpoint_url))]
    pub async fn connect(
        config: &LambdaConfig,
        credentials: SharedCredentialsProvider,
    ) -> Result<Self> {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).credentials_provider(credentials);

        if let Some(ref region) = config.region {
            loader = loader.region(Region::new(region.clone()));
        }

        if let Some(ref endpoint) = config.endpoint_url {
            info!("using custom Lambda endpoint {}", endpoint);
            loader = loader.endpoint_url(endpoint.clone());
        }

        if let Some(attempts) = config.max_attempts {
            loader = loader.retry_config(RetryConfig::standard().with_max_attempts(attempts));
        }

        let sdk_config = loader.load().await;
        ensure_region(&sdk_config)?;

        Ok(Self::new(aws_sdk_lambda::Client::new(&sdk_config)))
    }
}

fn ensure_region(sdk_config: &SdkConfig) -> Result<()> {
    anyhow::ensure!(
        sdk_config.region().is_some(),
        "no AWS region configured: set AWS_REGION or LAMBDA_INVOKE__LAMBDA__REGION"
    );
    Ok(())
}

fn raw_from_output(output: InvokeOutput) -> RawInvocation {
    RawInvocation {
        status_code: output.status_code(),
        payload: output
            .payload()
            .map(|blob| blob.as_ref().to_vec())
            .unwrap_or_default(),
        function_error: output.function_error().map(str::to_string),
        executed_version: output.executed_version().map(str::to_string),
    }
}

#[async_trait]
impl InvokeTransport for AwsLambdaTransport {
    #[instrument(skip_all, fields(function = %request.function_name(), mode = %request.mode()))]
    async fn send(&self, request: &InvocationRequest) -> Result<RawInvocation, BoxError> {
        let output = self
            .inner
            .invoke()
            .function_name(request.function_name())
            .invocation_type(request.mode().invocation_type())
            .payload(Blob::new(request.payload().as_bytes()))
            .send()
            .await
            .map_err(|err| Box::new(aws_sdk_lambda::Error::from(err)) as BoxError)?;

        Ok(raw_from_output(output))
    }
}
