use ::config::{Config, ConfigError as BuilderError, Environment, File};
use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config/lambda-invoke.yaml";
pub const ENV_PREFIX: &str = "LAMBDA_INVOKE";

const REDACTED: &str = "***";

/// Where the AWS credentials used to sign invocations come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialSource {
    /// The standard AWS chain: environment, profile files, web identity, container and instance metadata.
    #[default]
    DefaultChain,
    /// Only the EC2 instance metadata service (host identity).
    InstanceProfile,
    Static {
        access_key_id: String,
        secret_access_key: String,
        #[serde(default)]
        session_token: Option<String>,
    },
}

impl CredentialSource {
    pub fn redacted(&self) -> Self {
        match self {
            CredentialSource::Static {
                access_key_id,
                session_token,
                ..
            } => CredentialSource::Static {
                access_key_id: access_key_id.clone(),
                secret_access_key: REDACTED.to_string(),
                session_token: session_token.as_ref().map(|_| REDACTED.to_string()),
            },
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LambdaConfig {
    #[serde(default)]
    pub region: Option<String>,
    /// Overrides the service endpoint, e.g. a LocalStack URL.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Caps the SDK's own attempt count. `None` keeps the SDK default.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub credentials: CredentialSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub lambda: LambdaConfig,
    /// Function used by the command line tools when none is given.
    #[serde(default)]
    pub default_function: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration load failed: {0}")]
    Load(#[from] BuilderError),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl AppConfig {
    /// Load configuration from `.env` files, the optional YAML file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        preload_env_files();

        let path = env::var(format!("{ENV_PREFIX}_CONFIG_PATH"))
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = Self::from_sources(Path::new(&path), env_source())?;
        config.apply_aws_fallbacks(|key| env_var_non_empty(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Layer the YAML file (if it exists) under the given environment source.
    pub fn from_sources(path: &Path, environment: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        builder = builder.add_source(File::from(path).required(false));

        builder = builder.add_source(environment);

        let config: AppConfig = builder.build()?.try_deserialize()?;

        Ok(config)
    }

    /// Fill unset fields from the well-known AWS variables.
    pub fn apply_aws_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.lambda.region.is_none() {
            self.lambda.region = lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION"));
        }

        if self.lambda.endpoint_url.is_none() {
            self.lambda.endpoint_url = lookup("AWS_ENDPOINT_URL_LAMBDA");
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(attempts) = self.lambda.max_attempts {
            if attempts == 0 {
                return Err(ConfigError::Invalid {
                    key: "lambda.max_attempts",
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        if let CredentialSource::Static {
            access_key_id,
            secret_access_key,
            ..
        } = &self.lambda.credentials
        {
            if access_key_id.trim().is_empty() || secret_access_key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    key: "lambda.credentials",
                    reason: "static credentials need access_key_id and secret_access_key"
                        .to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resolve the function to call: the explicit name wins over `default_function`.
    pub fn require_function_name(&self, explicit: Option<&str>) -> Result<String> {
        let name = explicit
            .map(str::to_string)
            .or_else(|| self.default_function.clone())
            .context(format!(
                "no Lambda function given: pass one explicitly or set {ENV_PREFIX}__DEFAULT_FUNCTION"
            ))?;

        ensure!(
            !name.trim().is_empty(),
            "Lambda function name must not be empty"
        );

        Ok(name)
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.lambda.credentials = self.lambda.credentials.redacted();
        config
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn env_var_non_empty(key: &str) -> Result<String, env::VarError> {
    let value = env::var(key)?;
    if value.trim().is_empty() {
        return Err(env::VarError::NotPresent);
    }
    Ok(value)
}

fn preload_env_files() {
    let _ = dotenv();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_env = manifest_dir.join("../../.env");

    if workspace_env.exists() {
        let _ = dotenvy::from_path(workspace_env);
    }
}
