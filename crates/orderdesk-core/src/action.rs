//! Inbound actions delivered by a transport.
//!
//! A transport hands the desk either free text, a `/command`, or a callback
//! token pressed on a message button. Callback tokens use a dotted grammar,
//! `verb.arg1.arg2...`:
//!
//! ```text
//! add_order | new_orders | in_progress_orders | done_orders | archived_orders
//! continue.<order_id>
//! fill_tracking.<order_id>[.<item_index>]
//! archive.<order_id> | restore.<order_id>
//! receive.<order_id>.(me|customer)
//! ```

use std::fmt;
use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use crate::error::{OrderdeskError, Result};
use crate::order::{OrderId, OrderStatus};
use crate::transport::MessageId;

/// Who received the parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Receiver {
    /// The operator.
    Me,
    /// The end customer.
    Customer,
}

/// Which order list to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderView {
    /// Active orders with the given status.
    Status(OrderStatus),
    /// Archived orders of any status.
    Archived,
}

/// A button press, parsed from its callback token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackAction {
    AddOrder,
    ShowOrders(OrderView),
    Continue(OrderId),
    FillTracking {
        order_id: OrderId,
        item: Option<usize>,
    },
    Archive(OrderId),
    Restore(OrderId),
    Receive {
        order_id: OrderId,
        by: Receiver,
    },
}

impl FromStr for CallbackAction {
    type Err = OrderdeskError;

    fn from_str(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        let action = match parts.as_slice() {
            ["add_order"] => Self::AddOrder,
            ["new_orders"] => Self::ShowOrders(OrderView::Status(OrderStatus::New)),
            ["in_progress_orders"] => Self::ShowOrders(OrderView::Status(OrderStatus::InProgress)),
            ["done_orders"] => Self::ShowOrders(OrderView::Status(OrderStatus::Done)),
            ["archived_orders"] => Self::ShowOrders(OrderView::Archived),
            ["continue", id] => Self::Continue(parse_id(id, token)?),
            ["fill_tracking", id] => Self::FillTracking {
                order_id: parse_id(id, token)?,
                item: None,
            },
            ["fill_tracking", id, idx] => Self::FillTracking {
                order_id: parse_id(id, token)?,
                item: Some(idx.parse().map_err(|_| {
                    OrderdeskError::invalid_action(format!("bad item index in '{}'", token))
                })?),
            },
            ["archive", id] => Self::Archive(parse_id(id, token)?),
            ["restore", id] => Self::Restore(parse_id(id, token)?),
            ["receive", id, by] => Self::Receive {
                order_id: parse_id(id, token)?,
                by: Receiver::from_str(by).map_err(|_| {
                    OrderdeskError::invalid_action(format!("unknown receiver in '{}'", token))
                })?,
            },
            _ => {
                return Err(OrderdeskError::invalid_action(format!(
                    "unrecognized token '{}'",
                    token
                )));
            }
        };
        Ok(action)
    }
}

fn parse_id(raw: &str, token: &str) -> Result<OrderId> {
    raw.parse()
        .map_err(|_| OrderdeskError::invalid_action(format!("bad order id in '{}'", token)))
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddOrder => write!(f, "add_order"),
            Self::ShowOrders(OrderView::Status(status)) => write!(f, "{}_orders", status),
            Self::ShowOrders(OrderView::Archived) => write!(f, "archived_orders"),
            Self::Continue(id) => write!(f, "continue.{}", id),
            Self::FillTracking { order_id, item: None } => write!(f, "fill_tracking.{}", order_id),
            Self::FillTracking {
                order_id,
                item: Some(idx),
            } => write!(f, "fill_tracking.{}.{}", order_id, idx),
            Self::Archive(id) => write!(f, "archive.{}", id),
            Self::Restore(id) => write!(f, "restore.{}", id),
            Self::Receive { order_id, by } => write!(f, "receive.{}.{}", order_id, by),
        }
    }
}

/// A slash command typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Opens the main menu, abandoning any in-flight form.
    Start,
    /// Ends list entry.
    Skip,
    Other(String),
}

/// One inbound action from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Command(Command),
    Text(String),
    Callback {
        action: CallbackAction,
        /// The message carrying the pressed button, when known.
        origin: Option<MessageId>,
    },
}

impl Incoming {
    /// Classifies a typed line: `/word` is a command, anything else is text.
    pub fn from_text(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.strip_prefix('/') {
            Some(name) => {
                let name = name.split_whitespace().next().unwrap_or("").to_lowercase();
                match name.as_str() {
                    "start" => Self::Command(Command::Start),
                    "skip" => Self::Command(Command::Skip),
                    _ => Self::Command(Command::Other(name)),
                }
            }
            None => Self::Text(trimmed.to_string()),
        }
    }

    /// Parses a callback token pressed on `origin`.
    pub fn callback(token: &str, origin: Option<MessageId>) -> Result<Self> {
        Ok(Self::Callback {
            action: token.parse()?,
            origin,
        })
    }
}
