//! Per-call request mutations.

use crate::request::{Params, Request};

/// An adjustment applied to a [`Request`] by the dispatcher before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOption {
    /// Set the `recvWindow` (milliseconds) for the call.
    RecvWindow(u64),
    /// Set an extra HTTP header.
    Header {
        /// Header name
        name: String,
        /// Header value
        value: String,
    },
    /// Merge extra parameters into the form body.
    ExtraForm(Params),
}

impl RequestOption {
    /// Set the receive window in milliseconds.
    pub fn recv_window(millis: u64) -> Self {
        Self::RecvWindow(millis)
    }

    /// Set an HTTP header.
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Merge extra form parameters.
    pub fn extra_form(params: Params) -> Self {
        Self::ExtraForm(params)
    }

    pub(crate) fn apply(&self, request: &mut Request) {
        match self {
            Self::RecvWindow(millis) => request.set_recv_window(*millis),
            Self::Header { name, value } => request.set_header(name.clone(), value.clone()),
            Self::ExtraForm(params) => request.form_mut().merge(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn test_options_mutate_request() {
        let mut request = Request::new(Method::POST, "/api/v3/order").form("symbol", "BTCUSDT");

        for option in [
            RequestOption::recv_window(5000),
            RequestOption::header("X-Trace", "abc"),
            RequestOption::extra_form(Params::new().with("newOrderRespType", "ACK")),
        ] {
            option.apply(&mut request);
        }

        assert_eq!(request.recv_window_millis(), Some(5000));
        assert_eq!(
            request.headers(),
            &[("X-Trace".to_string(), "abc".to_string())]
        );
        assert_eq!(
            request.form_params().encode_raw(),
            "newOrderRespType=ACK&symbol=BTCUSDT"
        );
    }

    #[test]
    fn test_header_option_replaces_same_name() {
        let mut request = Request::new(Method::GET, "/api/v3/ping");
        RequestOption::header("X-Trace", "a").apply(&mut request);
        RequestOption::header("x-trace", "b").apply(&mut request);

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()[0].1, "b");
    }
}
