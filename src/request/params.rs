//! Canonical parameter sets.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::BinanceError;

/// A scalar request parameter value.
///
/// Serializes to its natural JSON type for WebSocket frames and formats with
/// [`fmt::Display`] for query strings and form bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// String value
    Str(String),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
    /// Boolean, rendered as `true` / `false`
    Bool(bool),
    /// Exact decimal, rendered without exponent
    Decimal(Decimal),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{}", v.normalize()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::UInt(value.into())
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

/// A set of request parameters with unique keys.
///
/// Keys are held in lexicographic order, so the encoded form never depends on
/// the order in which parameters were set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder-style variant of [`Params::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a parameter value.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// Whether a parameter is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a parameter, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    /// Copy every parameter of `other` into this set. Values from `other` win.
    pub fn merge(&mut self, other: &Params) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// URL-encoded canonical form (`a=1&b=2`), used for query strings and
    /// form bodies. An empty set encodes to the empty string.
    pub fn encode(&self) -> Result<String, BinanceError> {
        let pairs: Vec<(&str, String)> = self.iter().map(|(k, v)| (k, v.to_string())).collect();
        serde_urlencoded::to_string(pairs)
            .map_err(|e| BinanceError::InvalidRequest(format!("Failed to encode parameters: {e}")))
    }

    /// Canonical form without percent-escaping, used as the WebSocket API
    /// signature payload.
    pub fn encode_raw(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_encoding_is_sorted_by_key() {
        let mut params = Params::new();
        params.set("symbol", "BTCUSDT").set("side", "BUY");

        assert_eq!(params.encode().unwrap(), "side=BUY&symbol=BTCUSDT");
        assert_eq!(params.encode_raw(), "side=BUY&symbol=BTCUSDT");
    }

    #[test]
    fn test_encoding_ignores_insertion_order() {
        let entries = [
            ("symbol", "LTCBTC"),
            ("side", "BUY"),
            ("type", "LIMIT"),
            ("timeInForce", "GTC"),
        ];
        let expected = "side=BUY&symbol=LTCBTC&timeInForce=GTC&type=LIMIT";

        // Every rotation and its reverse.
        for shift in 0..entries.len() {
            let mut rotated = entries.to_vec();
            rotated.rotate_left(shift);
            let forward: Params = rotated.iter().copied().collect();
            let backward: Params = rotated.iter().rev().copied().collect();

            assert_eq!(forward.encode().unwrap(), expected);
            assert_eq!(backward.encode().unwrap(), expected);
        }
    }

    #[test]
    fn test_empty_params_encode_to_empty_string() {
        let params = Params::new();
        assert_eq!(params.encode().unwrap(), "");
        assert_eq!(params.encode_raw(), "");
    }

    #[test]
    fn test_escaped_and_raw_forms_differ_only_in_escaping() {
        let params = Params::new()
            .with("symbols", "[\"BTCUSDT\",\"ETHUSDT\"]")
            .with("newClientOrderId", "a b");

        assert_eq!(
            params.encode().unwrap(),
            "newClientOrderId=a+b&symbols=%5B%22BTCUSDT%22%2C%22ETHUSDT%22%5D"
        );
        assert_eq!(
            params.encode_raw(),
            "newClientOrderId=a b&symbols=[\"BTCUSDT\",\"ETHUSDT\"]"
        );
    }

    #[test]
    fn test_value_formatting() {
        let params = Params::new()
            .with("a", 5000u64)
            .with("b", -3i64)
            .with("c", true)
            .with("d", 0.1f64)
            .with("e", Decimal::from_str("1.2500").unwrap());

        assert_eq!(params.encode_raw(), "a=5000&b=-3&c=true&d=0.1&e=1.25");
    }

    #[test]
    fn test_set_replaces_existing_key() {
        let mut params = Params::new();
        params.set("limit", 5u32).set("limit", 10u32);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("limit"), Some(&ParamValue::UInt(10)));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = Params::new().with("a", "1").with("b", "2");
        base.merge(&Params::new().with("b", "3").with("c", "4"));

        assert_eq!(base.encode_raw(), "a=1&b=3&c=4");
    }

    #[test]
    fn test_json_serialization_keeps_scalar_types() {
        let params = Params::new()
            .with("symbol", "BTCUSDT")
            .with("limit", 5u32)
            .with("omitZeroBalances", true);

        assert_eq!(
            serde_json::to_string(&params).unwrap(),
            r#"{"limit":5,"omitZeroBalances":true,"symbol":"BTCUSDT"}"#
        );
    }
}
