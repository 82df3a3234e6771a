//! Common domain types for the Binance API.

use serde::{Deserialize, Serialize};

use crate::request::ParamValue;

/// Implements `as_str`, `Display` and conversion into a request parameter
/// for a wire enum whose variants map to fixed strings.
macro_rules! wire_enum_str {
    ($ty:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// Wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $s,)+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::Str(value.as_str().to_string())
            }
        }
    };
}

/// Buy or sell side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

wire_enum_str!(OrderSide { Buy => "BUY", Sell => "SELL" });

/// Order type for trading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Limit order - execute at specified price or better
    Limit,
    /// Market order - execute immediately at best available price
    Market,
    /// Trigger a market order when the stop price is reached
    StopLoss,
    /// Trigger a limit order when the stop price is reached
    StopLossLimit,
    /// Trigger a market order when the profit target is reached
    TakeProfit,
    /// Trigger a limit order when the profit target is reached
    TakeProfitLimit,
    /// Limit order rejected if it would immediately take liquidity
    LimitMaker,
}

wire_enum_str!(OrderType {
    Limit => "LIMIT",
    Market => "MARKET",
    StopLoss => "STOP_LOSS",
    StopLossLimit => "STOP_LOSS_LIMIT",
    TakeProfit => "TAKE_PROFIT",
    TakeProfitLimit => "TAKE_PROFIT_LIMIT",
    LimitMaker => "LIMIT_MAKER",
});

/// Status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted by the engine
    New,
    /// Part of the order has been filled
    PartiallyFilled,
    /// The order has been completely filled
    Filled,
    /// Canceled by the user
    Canceled,
    /// Currently unused
    PendingCancel,
    /// Not accepted by the engine
    Rejected,
    /// Canceled according to the order type's rules or by the exchange
    Expired,
    /// Expired by self-trade prevention
    ExpiredInMatch,
}

wire_enum_str!(OrderStatus {
    New => "NEW",
    PartiallyFilled => "PARTIALLY_FILLED",
    Filled => "FILLED",
    Canceled => "CANCELED",
    PendingCancel => "PENDING_CANCEL",
    Rejected => "REJECTED",
    Expired => "EXPIRED",
    ExpiredInMatch => "EXPIRED_IN_MATCH",
});

/// Time in force for orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good till canceled (default)
    #[default]
    GTC,
    /// Immediate or cancel - fill what's possible immediately, cancel rest
    IOC,
    /// Fill or kill - fill completely or not at all
    FOK,
}

wire_enum_str!(TimeInForce { GTC => "GTC", IOC => "IOC", FOK => "FOK" });

/// Shape of the order placement acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NewOrderRespType {
    /// Order id and timestamps only
    Ack,
    /// Adds the order state
    Result,
    /// Adds the fills
    Full,
}

wire_enum_str!(NewOrderRespType { Ack => "ACK", Result => "RESULT", Full => "FULL" });

/// Execution type reported by `executionReport` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionType {
    /// The order has been accepted into the engine
    New,
    /// The order has been canceled by the user
    Canceled,
    /// Currently unused
    Replaced,
    /// The order has been rejected
    Rejected,
    /// Part of the order or all of the order's quantity has filled
    Trade,
    /// The order was canceled according to its rules or by the exchange
    Expired,
    /// The order expired due to self-trade prevention
    TradePrevention,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_side_serde() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"BUY\"");
        let side: OrderSide = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(side, OrderSide::Sell);
    }

    #[test]
    fn test_order_type_serde_matches_display() {
        for order_type in [
            OrderType::Limit,
            OrderType::Market,
            OrderType::StopLoss,
            OrderType::StopLossLimit,
            OrderType::TakeProfit,
            OrderType::TakeProfitLimit,
            OrderType::LimitMaker,
        ] {
            assert_eq!(
                serde_json::to_string(&order_type).unwrap(),
                format!("\"{order_type}\"")
            );
        }
    }

    #[test]
    fn test_order_status_deserialize() {
        let status: OrderStatus = serde_json::from_str("\"PARTIALLY_FILLED\"").unwrap();
        assert_eq!(status, OrderStatus::PartiallyFilled);
        assert_eq!(OrderStatus::ExpiredInMatch.as_str(), "EXPIRED_IN_MATCH");
    }

    #[test]
    fn test_enums_as_params() {
        assert_eq!(ParamValue::from(TimeInForce::FOK), ParamValue::Str("FOK".into()));
        assert_eq!(
            ParamValue::from(NewOrderRespType::Full).to_string(),
            "FULL"
        );
    }

    #[test]
    fn test_execution_type_deserialize() {
        let kind: ExecutionType = serde_json::from_str("\"TRADE_PREVENTION\"").unwrap();
        assert_eq!(kind, ExecutionType::TradePrevention);
    }
}
