/// Admin system
///
/// Admin authorization, the account lifecycle state machine and admin
/// profiles. Everything here that changes state requires an [`AdminGrant`].

pub mod lifecycle;
pub mod policy;
pub mod profile;

pub use lifecycle::{AccountLifecycleManager, LifecycleAction};
pub use policy::{AdminGrant, AuthorizationPolicy};
pub use profile::{AdminProfile, AdminProfileChanges, AdminProfileManager};
