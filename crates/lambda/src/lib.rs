pub mod blocking;
pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
pub mod transport;

pub use blocking::BlockingInvocationClient;
pub use client::InvocationClient;
pub use error::{BoxError, InvokeError};
pub use models::{InvocationMode, InvocationRequest, InvocationResult, RawInvocation};
pub use transport::{AwsLambdaTransport, InvokeTransport};
