//! Authentication module for Binance API.
//!
//! This module provides:
//! - Credential management with secure secret storage
//! - Millisecond timestamps for signed requests
//! - HMAC-SHA256 signature generation for signed requests

mod clock;
mod credentials;
mod signature;

pub use clock::{Clock, SystemClock};
pub use credentials::{Credentials, CredentialsProvider, EnvCredentials, StaticCredentials};
pub use signature::sign_payload;
