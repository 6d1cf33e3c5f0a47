//! Client-side session: tokens, their persistence, and login navigation
//!
//! # Overview
//!
//! The session is the only stateful part of the client. It holds an access
//! token and a refresh token, is hydrated from a persisted cookie at startup,
//! and changes only through two transitions:
//!
//! - **log in** stores new tokens (after login or a silent refresh) and
//!   optionally navigates to the post-login destination
//! - **log out** clears both tokens and navigates to the login page,
//!   optionally carrying a `redirect` target back to where the user was
//!
//! [`AuthenticatedClient`](crate::AuthenticatedClient) consumes the
//! [`SessionStore`] trait; [`CookieSessionStore`] is the default implementation.
//!
//! # Example
//!
//! ```no_run
//! use ldx_insight_client::session::{CookieSessionStore, FileCookieJar, MemoryNavigator};
//! use std::sync::Arc;
//!
//! let navigator = Arc::new(MemoryNavigator::new("/"));
//! let store = CookieSessionStore::hydrate(FileCookieJar::new(), navigator);
//! ```
//!
//! # Storage
//!
//! [`FileCookieJar`] writes the cookie to the platform-specific config
//! directory (e.g. `~/.config/ldx-insight/session.json` on Linux) with
//! user-only permissions (600).

mod cookie;
mod navigation;
mod store;

pub use cookie::{CookieError, CookieJar, FileCookieJar, MemoryCookieJar};
pub use navigation::{
    MemoryNavigator, Navigation, Navigator, NullNavigator, Pages, REDIRECT_PARAM, redirect_param,
};
pub use store::{CookieSessionStore, Session, SessionStore, TokenPair};
