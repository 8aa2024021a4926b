//! Google Workspace collaborators: service-account impersonation, the Admin
//! Directory user listing and Drive file operations.

pub mod credentials;
pub mod directory;
pub mod drive;
pub mod factory;
pub mod http;
pub mod oauth;
pub mod token;

pub use credentials::{CredentialsError, ServiceAccountKey};
pub use directory::GoogleDirectory;
pub use drive::GoogleDrive;
pub use factory::{GoogleClientFactory, GoogleEndpoints};
pub use http::build_http_client;
pub use token::{ImpersonatedTokenSource, TokenSource};

#[doc(hidden)]
pub use token::StaticToken;
