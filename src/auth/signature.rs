//! HMAC-SHA256 signature generation for Binance API authentication.
//!
//! Binance signed endpoints require a signature computed as:
//! ```text
//! hex(HMAC-SHA256(payload, api_secret))
//! ```
//!
//! For HTTP the payload is the encoded query string immediately followed by the
//! encoded form body. For the WebSocket API it is the canonical encoding of all
//! request parameters, `apiKey` and `timestamp` included. The result is sent as
//! the `signature` parameter.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::Credentials;
use crate::error::BinanceError;

type HmacSha256 = Hmac<Sha256>;

/// Sign a payload with the account secret.
///
/// # Arguments
///
/// * `credentials` - API credentials containing the secret
/// * `payload` - The canonical parameter string to sign (may be empty)
///
/// # Returns
///
/// Lowercase hex-encoded HMAC-SHA256 digest.
///
/// # Example
///
/// ```rust
/// use binance_api_client::auth::{Credentials, sign_payload};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("api_key", "api_secret");
/// let signature = sign_payload(&credentials, "symbol=BTCUSDT&timestamp=1700000000000")?;
/// assert_eq!(signature.len(), 64);
/// # Ok(())
/// # }
/// ```
pub fn sign_payload(credentials: &Credentials, payload: &str) -> Result<String, BinanceError> {
    let mut mac = HmacSha256::new_from_slice(credentials.secret().as_bytes())
        .map_err(|e| BinanceError::Auth(format!("Invalid HMAC key: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
