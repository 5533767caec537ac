//! Provider layer: vendor routing, client construction and the
//! OpenAI-compatible HTTP client.

pub mod error;
pub mod factory;
pub mod openai;
pub mod vendor;

pub use error::{map_http_error, ProviderError, ProviderResult};
pub use factory::ClientFactory;
pub use openai::{DeltaStream, LlmClient, StreamEvent};
pub use vendor::{CallMode, ResolvedModel, VendorRegistry};
