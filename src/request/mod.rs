//! Request descriptors and canonical parameter encoding.
//!
//! Every service builds a [`Request`] describing one logical call: the HTTP
//! method and endpoint, an optional WebSocket API method name, the parameter
//! set, and the security classification. The client's dispatcher stamps and
//! signs the descriptor for whichever transport it picks.

mod descriptor;
mod options;
mod params;

pub use descriptor::{EncodedHttpRequest, Request, SecurityType};
pub use options::RequestOption;
pub use params::{ParamValue, Params};

/// Parameter key carrying the request signature.
pub const SIGNATURE_KEY: &str = "signature";
/// Parameter key carrying the signed request timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Parameter key carrying the receive window.
pub const RECV_WINDOW_KEY: &str = "recvWindow";
/// Parameter key carrying the API key on signed WebSocket calls.
pub const API_KEY_KEY: &str = "apiKey";
