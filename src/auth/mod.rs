//! Cookie-session authentication
//!
//! Handles:
//! - Identifying the caller from the session cookie
//! - Rejecting anonymous callers on protected routes
//! - Issuing and clearing sessions recorded by handlers

mod context;
mod interceptor;
mod session;

pub use context::{AuthContext, CurrentUser, MaybeUser};
pub use interceptor::{AuthInterceptor, SkipAuth};
pub use session::{SessionAction, SessionCookie, SessionStore, generate_session_token};
