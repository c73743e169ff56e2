mod dispatch;
mod error;
mod gateway;
pub mod policy;
mod response;
mod types;

pub use dispatch::DirectiveDispatcher;
pub use error::{Error, Result};
pub use gateway::{DEFAULT_BASE_URL, GatewayConfig, IComfortGateway};
pub use response::{AlexaResponse, CapabilityConfig, DiscoveredEndpoint, ResponseConfig};
pub use types::*;
