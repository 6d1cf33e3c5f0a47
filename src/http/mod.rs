//! Authenticated HTTP layer
//!
//! [`AuthenticatedClient`] resolves a [`PendingRequest`] against the current
//! session, hands the resulting [`Dispatch`] to a [`Transport`], and runs the
//! refresh protocol when the server answers 401. The decision table for failed
//! responses lives in [`plan_recovery`].

mod client;
mod recovery;
mod request;
mod transport;

pub use client::{AuthenticatedClient, Refetch};
pub use recovery::{Recovery, UNAUTHORIZED, plan_recovery};
pub use request::{
    AUTHORIZATION_HEADER, Dispatch, PendingRequest, RawResponse, decode_payload, merge_headers,
};
pub use transport::{ReqwestTransport, Transport};
