//! Broker-owned position and pending-order snapshots.
//!
//! The engine never stores positions; it reads these snapshots each cycle
//! and issues intents through the execution port.

use crate::domain::bar::Quote;
use crate::domain::signal::{Direction, StrategyId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

impl From<Direction> for Side {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Buy => Side::Long,
            Direction::Sell => Side::Short,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub ticket: u64,
    pub strategy: StrategyId,
    pub side: Side,
    pub volume: f64,
    pub entry_price: f64,
    /// 0.0 means no stop is set.
    pub stop_loss: f64,
    /// 0.0 means no target is set.
    pub take_profit: f64,
    /// Unrealized profit in account currency, as reported by the broker.
    pub profit: f64,
}

impl Position {
    pub fn has_stop(&self) -> bool {
        self.stop_loss != 0.0
    }

    /// Price at which the position would be closed right now.
    pub fn exit_price(&self, quote: &Quote) -> f64 {
        match self.side {
            Side::Long => quote.bid,
            Side::Short => quote.ask,
        }
    }

    /// True if `candidate` gives strictly more protection than the current stop.
    pub fn improves_stop(&self, candidate: f64) -> bool {
        if !self.has_stop() {
            return true;
        }
        match self.side {
            Side::Long => candidate > self.stop_loss,
            Side::Short => candidate < self.stop_loss,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub ticket: u64,
    pub strategy: StrategyId,
}

/// Which strategy identities currently hold a position or a pending order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exposure {
    pub bollinger: bool,
    pub trend_follow: bool,
}

impl Exposure {
    pub fn from_book(positions: &[Position], pending: &[PendingOrder]) -> Self {
        let mut exposure = Exposure::default();
        let ids = positions
            .iter()
            .map(|p| p.strategy)
            .chain(pending.iter().map(|o| o.strategy));
        for id in ids {
            exposure.mark(id);
        }
        exposure
    }

    pub fn mark(&mut self, id: StrategyId) {
        match id {
            StrategyId::Bollinger => self.bollinger = true,
            StrategyId::TrendFollow => self.trend_follow = true,
        }
    }

    pub fn is_occupied(&self, id: StrategyId) -> bool {
        match id {
            StrategyId::Bollinger => self.bollinger,
            StrategyId::TrendFollow => self.trend_follow,
        }
    }
}
