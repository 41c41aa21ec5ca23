pub mod config;
pub mod http;
pub mod rbac;
pub mod types;

pub use types::ADMIN_ID;
pub use types::DATA_PATH_METADATA;
