pub mod password;
pub mod provider;
pub mod token;

pub use provider::Auth;
pub use provider::Config;
pub use provider::LogInRequest;
pub use provider::SignUpRequest;
pub use provider::TokensResponse;
pub use provider::UpdatePasswordRequest;
pub use provider::UpdateProfileRequest;
