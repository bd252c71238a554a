mod bootstrap;
mod session;

pub use bootstrap::bootstrap_handler;
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
pub(super) const SESSION_CREATED_AT_KEY: &str = "session_created_at";
