//! HTTP transport for the REST API.

mod transport;

pub use transport::{HttpTransport, HttpTransportBuilder};
