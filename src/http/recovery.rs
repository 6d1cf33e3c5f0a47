//! What to do when a request fails
//!
//! Kept free of I/O so every branch of the refresh protocol can be checked
//! against plain values.

use super::request::PendingRequest;
use crate::config::ClientConfig;
use crate::session::Session;

/// Status that triggers the refresh or logout branch
pub const UNAUTHORIZED: u16 = 401;

/// Recovery step for a failed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Surface the failure unchanged
    Propagate,
    /// An authentication endpoint rejected the user: log out and send them
    /// to the login page with a return target
    Reauthenticate,
    /// Exchange the refresh token once
    Refresh,
    /// Nothing to refresh with: log out
    RefreshUnavailable,
}

/// Decide how to recover from a failed `request` that answered `status`
#[must_use]
pub fn plan_recovery(
    config: &ClientConfig,
    request: &PendingRequest,
    status: u16,
    session: &Session,
) -> Recovery {
    if status != UNAUTHORIZED {
        return Recovery::Propagate;
    }
    if request.is_auth_family(config) {
        return Recovery::Reauthenticate;
    }
    if session.refresh_token.is_none() {
        return Recovery::RefreshUnavailable;
    }
    Recovery::Refresh
}
