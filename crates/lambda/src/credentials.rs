use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::imds::credentials::ImdsCredentialsProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use invoke_core::config::CredentialSource;

const STATIC_PROVIDER_NAME: &str = "lambda-invoke-static";

/// Turn the configured source into a provider the SDK can sign with.
pub async fn resolve_provider(source: &CredentialSource) -> SharedCredentialsProvider {
    match source {
        CredentialSource::DefaultChain => {
            tracing::debug!("resolving credentials through the default AWS chain");
            SharedCredentialsProvider::new(DefaultCredentialsChain::builder().build().await)
        }
        CredentialSource::InstanceProfile => {
            tracing::debug!("resolving credentials from instance metadata");
            SharedCredentialsProvider::new(ImdsCredentialsProvider::builder().build())
        }
        CredentialSource::Static {
            access_key_id,
            secret_access_key,
            session_token,
        } => static_provider(access_key_id, secret_access_key, session_token.clone()),
    }
}

pub fn static_provider(
    access_key_id: &str,
    secret_access_key: &str,
    session_token: Option<String>,
) -> SharedCredentialsProvider {
    SharedCredentialsProvider::new(Credentials::new(
        access_key_id,
        secret_access_key,
        session_token,
        None,
        STATIC_PROVIDER_NAME,
    ))
}
