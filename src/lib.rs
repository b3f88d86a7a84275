/// Platform accounts
///
/// Account lifecycle and access-control core of a multi-user content
/// platform: registration and login, per-request authentication, admin
/// authorization, the block / delete / restore state machine with its
/// cascading hard delete, and the profile edit cooldown.

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod server;

pub use context::AppContext;
pub use error::{PlatformError, PlatformResult};
