//! Order execution and position query port.

use crate::domain::error::EngineError;
use crate::domain::position::{PendingOrder, Position};
use crate::domain::sizing::TradeIntent;

/// Broker execution gateway. A rejected call returns
/// [`EngineError::GatewayRejected`]; callers never retry within a cycle.
pub trait ExecutionPort {
    /// Submit a market order; returns the new position's ticket.
    fn open(&mut self, intent: &TradeIntent) -> Result<u64, EngineError>;

    fn modify_stop(&mut self, ticket: u64, new_stop: f64) -> Result<(), EngineError>;

    fn close(&mut self, ticket: u64) -> Result<(), EngineError>;

    /// Open positions on the instrument that belong to either strategy.
    fn positions(&self) -> Result<Vec<Position>, EngineError>;

    fn pending_orders(&self) -> Result<Vec<PendingOrder>, EngineError>;
}
