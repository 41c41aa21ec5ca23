pub mod accounts;
pub mod auth;
pub mod companies;
pub mod context;
pub mod error;
pub mod events;
pub mod http;
pub mod notifications;
pub mod provider;
pub mod registrations;
pub mod types;

pub use context::Context;
pub use error::PlatformError;
pub use error::Result;
pub use provider::PlatformProvider;
pub use types::ListResponse;
pub use types::ResponseMetadata;
