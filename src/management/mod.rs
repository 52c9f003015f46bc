mod session;
mod token;

pub use session::{SessionManager, SessionState};
pub use token::{EXPIRY_MARGIN_SECS, TokenManager};
