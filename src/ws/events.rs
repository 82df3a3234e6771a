//! User data push events.
//!
//! Push frames carry an `event` object whose `e` field names the event type.
//! Known types decode into typed payloads; anything else is kept as
//! [`UserDataEvent::Unknown`] so new event types never break the reader.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::BinanceError;
use crate::types::{ExecutionType, OrderSide, OrderStatus, OrderType, TimeInForce};

/// Event type discriminators.
pub mod event_types {
    pub const ACCOUNT_POSITION: &str = "outboundAccountPosition";
    pub const BALANCE_UPDATE: &str = "balanceUpdate";
    pub const EXECUTION_REPORT: &str = "executionReport";
    pub const LIST_STATUS: &str = "listStatus";
    pub const LIST_STATUS_LEGACY: &str = "ListStatus";
    pub const STREAM_TERMINATED: &str = "eventStreamTerminated";
}

/// A decoded user data event.
#[derive(Debug, Clone, PartialEq)]
pub enum UserDataEvent {
    /// Account balances changed.
    AccountPosition(AccountPositionEvent),
    /// Deposit, withdrawal or transfer.
    BalanceUpdate(BalanceUpdateEvent),
    /// Order update.
    ExecutionReport(Box<ExecutionReportEvent>),
    /// Order list update.
    ListStatus(ListStatusEvent),
    /// The subscription ended on the server side.
    StreamTerminated(StreamTerminatedEvent),
    /// Event type this client does not decode.
    Unknown {
        /// Value of `e`, empty if absent
        event_type: String,
        /// Full event object
        payload: serde_json::Value,
    },
}

#[derive(Deserialize)]
struct EventTypeProbe {
    #[serde(default, rename = "e")]
    event_type: Option<String>,
}

impl UserDataEvent {
    /// Decode an event object by its `e` discriminator.
    pub fn from_json(raw: &str) -> Result<Self, BinanceError> {
        let probe: EventTypeProbe = serde_json::from_str(raw)?;
        let event_type = probe.event_type.unwrap_or_default();

        let event = match event_type.as_str() {
            event_types::ACCOUNT_POSITION => Self::AccountPosition(serde_json::from_str(raw)?),
            event_types::BALANCE_UPDATE => Self::BalanceUpdate(serde_json::from_str(raw)?),
            event_types::EXECUTION_REPORT => {
                Self::ExecutionReport(Box::new(serde_json::from_str(raw)?))
            }
            event_types::LIST_STATUS | event_types::LIST_STATUS_LEGACY => {
                Self::ListStatus(serde_json::from_str(raw)?)
            }
            event_types::STREAM_TERMINATED => Self::StreamTerminated(serde_json::from_str(raw)?),
            _ => Self::Unknown {
                event_type,
                payload: serde_json::from_str(raw)?,
            },
        };
        Ok(event)
    }

    /// The `e` discriminator of this event.
    pub fn event_type(&self) -> &str {
        match self {
            Self::AccountPosition(_) => event_types::ACCOUNT_POSITION,
            Self::BalanceUpdate(_) => event_types::BALANCE_UPDATE,
            Self::ExecutionReport(_) => event_types::EXECUTION_REPORT,
            Self::ListStatus(_) => event_types::LIST_STATUS,
            Self::StreamTerminated(_) => event_types::STREAM_TERMINATED,
            Self::Unknown { event_type, .. } => event_type,
        }
    }
}

/// `outboundAccountPosition` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountPositionEvent {
    /// Event time
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Time of last account update
    #[serde(rename = "u")]
    pub last_update_time: i64,
    /// Changed balances
    #[serde(rename = "B")]
    pub balances: Vec<EventBalance>,
}

/// One balance in an [`AccountPositionEvent`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventBalance {
    /// Asset
    #[serde(rename = "a")]
    pub asset: String,
    /// Free amount
    #[serde(rename = "f")]
    pub free: Decimal,
    /// Locked amount
    #[serde(rename = "l")]
    pub locked: Decimal,
}

/// `balanceUpdate` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceUpdateEvent {
    /// Event time
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Asset
    #[serde(rename = "a")]
    pub asset: String,
    /// Balance delta
    #[serde(rename = "d")]
    pub delta: Decimal,
    /// Clear time
    #[serde(rename = "T")]
    pub clear_time: i64,
}

/// `executionReport` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExecutionReportEvent {
    /// Event time
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Symbol
    #[serde(rename = "s")]
    pub symbol: String,
    /// Client order ID
    #[serde(rename = "c")]
    pub client_order_id: String,
    /// Side
    #[serde(rename = "S")]
    pub side: OrderSide,
    /// Order type
    #[serde(rename = "o")]
    pub order_type: OrderType,
    /// Time in force
    #[serde(rename = "f")]
    pub time_in_force: TimeInForce,
    /// Order quantity
    #[serde(rename = "q")]
    pub quantity: Decimal,
    /// Order price
    #[serde(rename = "p")]
    pub price: Decimal,
    /// Stop price
    #[serde(rename = "P", default)]
    pub stop_price: Decimal,
    /// Order list ID, `-1` if not part of a list
    #[serde(rename = "g", default)]
    pub order_list_id: i64,
    /// Original client order ID of a canceled order
    #[serde(rename = "C", default)]
    pub orig_client_order_id: String,
    /// Current execution type
    #[serde(rename = "x")]
    pub execution_type: ExecutionType,
    /// Current order status
    #[serde(rename = "X")]
    pub status: OrderStatus,
    /// Reject reason, `NONE` when accepted
    #[serde(rename = "r")]
    pub reject_reason: String,
    /// Order ID
    #[serde(rename = "i")]
    pub order_id: i64,
    /// Last executed quantity
    #[serde(rename = "l")]
    pub last_executed_quantity: Decimal,
    /// Cumulative filled quantity
    #[serde(rename = "z")]
    pub cumulative_filled_quantity: Decimal,
    /// Last executed price
    #[serde(rename = "L")]
    pub last_executed_price: Decimal,
    /// Commission amount
    #[serde(rename = "n")]
    pub commission: Decimal,
    /// Commission asset
    #[serde(rename = "N", default)]
    pub commission_asset: Option<String>,
    /// Transaction time
    #[serde(rename = "T")]
    pub transaction_time: i64,
    /// Trade ID, `-1` when there is no trade
    #[serde(rename = "t")]
    pub trade_id: i64,
    /// Whether the order is on the book
    #[serde(rename = "w", default)]
    pub is_working: bool,
    /// Whether this trade was the maker side
    #[serde(rename = "m", default)]
    pub is_maker: bool,
    /// Order creation time
    #[serde(rename = "O", default)]
    pub creation_time: i64,
    /// Cumulative quote asset transacted quantity
    #[serde(rename = "Z", default)]
    pub cumulative_quote_quantity: Decimal,
}

/// `listStatus` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListStatusEvent {
    /// Event time
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Symbol
    #[serde(rename = "s")]
    pub symbol: String,
    /// Order list ID
    #[serde(rename = "g")]
    pub order_list_id: i64,
    /// Contingency type, e.g. `OCO`
    #[serde(rename = "c")]
    pub contingency_type: String,
    /// List status type
    #[serde(rename = "l")]
    pub list_status_type: String,
    /// List order status
    #[serde(rename = "L")]
    pub list_order_status: String,
    /// List reject reason
    #[serde(rename = "r")]
    pub list_reject_reason: String,
    /// List client order ID
    #[serde(rename = "C")]
    pub list_client_order_id: String,
    /// Transaction time
    #[serde(rename = "T")]
    pub transaction_time: i64,
    /// Orders in the list
    #[serde(rename = "O", default)]
    pub orders: Vec<ListStatusOrder>,
}

/// One order of a [`ListStatusEvent`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListStatusOrder {
    /// Symbol
    #[serde(rename = "s")]
    pub symbol: String,
    /// Order ID
    #[serde(rename = "i")]
    pub order_id: i64,
    /// Client order ID
    #[serde(rename = "c")]
    pub client_order_id: String,
}

/// `eventStreamTerminated` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamTerminatedEvent {
    /// Event time
    #[serde(rename = "E")]
    pub event_time: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_account_position() {
        let event = UserDataEvent::from_json(
            r#"{"e":"outboundAccountPosition","E":1564034571105,"u":1564034571073,"B":[{"a":"ETH","f":"10000.000000","l":"0.000000"}]}"#,
        )
        .unwrap();

        let UserDataEvent::AccountPosition(position) = event else {
            panic!("unexpected event: {event:?}");
        };
        assert_eq!(position.balances.len(), 1);
        assert_eq!(position.balances[0].asset, "ETH");
        assert_eq!(position.balances[0].free, Decimal::from(10000));
    }

    #[test]
    fn test_execution_report() {
        let event = UserDataEvent::from_json(
            r#"{"e":"executionReport","E":1499405658658,"s":"ETHBTC","c":"mUvoqJxFIILMdfAW5iGSOW","S":"BUY","o":"LIMIT","f":"GTC","q":"1.00000000","p":"0.10264410","P":"0.00000000","F":"0.00000000","g":-1,"C":"","x":"NEW","X":"NEW","r":"NONE","i":4293153,"l":"0.00000000","z":"0.00000000","L":"0.00000000","n":"0","N":null,"T":1499405658657,"t":-1,"I":8641984,"w":true,"m":false,"M":false,"O":1499405658657,"Z":"0.00000000","Y":"0.00000000","Q":"0.00000000"}"#,
        )
        .unwrap();

        let UserDataEvent::ExecutionReport(report) = event else {
            panic!("unexpected event: {event:?}");
        };
        assert_eq!(report.symbol, "ETHBTC");
        assert_eq!(report.side, OrderSide::Buy);
        assert_eq!(report.status, OrderStatus::New);
        assert_eq!(report.execution_type, ExecutionType::New);
        assert_eq!(report.price, Decimal::from_str("0.10264410").unwrap());
        assert_eq!(report.commission_asset, None);
        assert_eq!(report.trade_id, -1);
        assert!(report.is_working);
    }

    #[test]
    fn test_list_status_accepts_both_casings() {
        for kind in ["listStatus", "ListStatus"] {
            let raw = format!(
                r#"{{"e":"{kind}","E":1564035303637,"s":"ETHBTC","g":2,"c":"OCO","l":"EXEC_STARTED","L":"EXECUTING","r":"NONE","C":"F4QN4G8DlFATFlIUQ0cjdD","T":1564035303625,"O":[{{"s":"ETHBTC","i":17,"c":"AJYsMjErWJesZvqlJCTUgL"}}]}}"#
            );
            let event = UserDataEvent::from_json(&raw).unwrap();
            let UserDataEvent::ListStatus(status) = event else {
                panic!("unexpected event: {event:?}");
            };
            assert_eq!(status.orders[0].order_id, 17);
            assert_eq!(status.contingency_type, "OCO");
        }
    }

    #[test]
    fn test_stream_terminated() {
        let event =
            UserDataEvent::from_json(r#"{"e":"eventStreamTerminated","E":1728973001334}"#).unwrap();
        assert_eq!(
            event,
            UserDataEvent::StreamTerminated(StreamTerminatedEvent {
                event_time: 1728973001334
            })
        );
    }

    #[test]
    fn test_unknown_event_type_is_kept() {
        let event =
            UserDataEvent::from_json(r#"{"e":"externalLockUpdate","E":1,"a":"NEWT"}"#).unwrap();

        assert_eq!(event.event_type(), "externalLockUpdate");
        let UserDataEvent::Unknown { payload, .. } = event else {
            panic!("expected unknown event");
        };
        assert_eq!(payload["a"], "NEWT");
    }

    #[test]
    fn test_event_without_discriminator() {
        let event = UserDataEvent::from_json(r#"{"E":1}"#).unwrap();
        assert!(matches!(event, UserDataEvent::Unknown { ref event_type, .. } if event_type.is_empty()));
    }

    #[test]
    fn test_known_type_with_bad_payload_is_an_error() {
        assert!(UserDataEvent::from_json(r#"{"e":"balanceUpdate","E":"soon"}"#).is_err());
    }
}
