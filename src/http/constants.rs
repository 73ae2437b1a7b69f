//! Timeout defaults for the HTTP transport.

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default overall deadline per request (60 seconds), body included.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;
