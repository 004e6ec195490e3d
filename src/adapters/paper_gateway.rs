//! In-memory paper account and execution gateway.
//!
//! [`PaperAccount`] answers account queries. [`PaperGateway`] keeps a book
//! of tickets tagged with broker magic numbers; only tickets whose magic
//! maps to a strategy identity are reported to the engine, anything else
//! (manual trades, other systems) stays invisible. Nothing is simulated:
//! stops are never hit and equity never changes.

use crate::domain::bar::Quote;
use crate::domain::error::EngineError;
use crate::domain::instrument::InstrumentSpec;
use crate::domain::params::StrategyToggles;
use crate::domain::position::{PendingOrder, Position, Side};
use crate::domain::signal::{Direction, StrategyId};
use crate::domain::sizing::TradeIntent;
use crate::ports::account_port::AccountPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::execution_port::ExecutionPort;

/// The `[account]` section: paper equity, instrument metadata and spread.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperAccount {
    pub equity: f64,
    pub spec: InstrumentSpec,
    pub spread_points: f64,
}

impl Default for PaperAccount {
    fn default() -> Self {
        Self {
            equity: 10_000.0,
            spec: InstrumentSpec::default(),
            spread_points: 10.0,
        }
    }
}

impl PaperAccount {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, EngineError> {
        let d = Self::default();
        let digits = config.get_int("account", "digits", i64::from(d.spec.digits));
        let digits = u32::try_from(digits)
            .map_err(|_| EngineError::invalid("account", "digits", "digits must be non-negative"))?;

        let account = Self {
            equity: config.get_double("account", "equity", d.equity),
            spec: InstrumentSpec {
                point: config.get_double("account", "point", d.spec.point),
                digits,
                tick_value: config.get_double("account", "tick_value", d.spec.tick_value),
                min_volume: config.get_double("account", "min_volume", d.spec.min_volume),
                volume_step: config.get_double("account", "volume_step", d.spec.volume_step),
                max_volume: config.get_double("account", "max_volume", d.spec.max_volume),
            },
            spread_points: config.get_double("account", "spread_points", d.spread_points),
        };

        if account.spec.point <= 0.0 {
            return Err(EngineError::invalid("account", "point", "point must be positive"));
        }
        if account.spec.min_volume > account.spec.max_volume {
            return Err(EngineError::invalid(
                "account",
                "min_volume",
                "min_volume must not exceed max_volume",
            ));
        }
        if account.spread_points < 0.0 {
            return Err(EngineError::invalid(
                "account",
                "spread_points",
                "spread_points must be non-negative",
            ));
        }
        Ok(account)
    }

    pub fn spread(&self) -> f64 {
        self.spec.points_to_price(self.spread_points)
    }
}

#[derive(Debug, Clone)]
struct Ticket {
    ticket: u64,
    magic: i64,
    side: Side,
    volume: f64,
    entry_price: f64,
    stop_loss: f64,
    take_profit: f64,
    profit: f64,
    comment: String,
}

pub struct PaperGateway {
    account: PaperAccount,
    strategies: StrategyToggles,
    tickets: Vec<Ticket>,
    pending: Vec<(u64, i64)>,
    next_ticket: u64,
}

impl PaperGateway {
    pub fn new(account: PaperAccount, strategies: &StrategyToggles) -> Self {
        Self {
            account,
            strategies: strategies.clone(),
            tickets: Vec::new(),
            pending: Vec::new(),
            next_ticket: 1,
        }
    }

    fn allocate_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    /// Record a position opened outside the engine, e.g. by hand.
    pub fn insert_position(
        &mut self,
        magic: i64,
        side: Side,
        volume: f64,
        entry_price: f64,
        stop_loss: f64,
    ) -> u64 {
        let ticket = self.allocate_ticket();
        self.tickets.push(Ticket {
            ticket,
            magic,
            side,
            volume,
            entry_price,
            stop_loss,
            take_profit: 0.0,
            profit: 0.0,
            comment: String::new(),
        });
        ticket
    }

    pub fn insert_pending(&mut self, magic: i64) -> u64 {
        let ticket = self.allocate_ticket();
        self.pending.push((ticket, magic));
        ticket
    }

    /// Recompute unrealized profit of every ticket from `quote`.
    pub fn revalue(&mut self, quote: &Quote) {
        let spec = self.account.spec.clone();
        for t in self.tickets.iter_mut() {
            let distance = match t.side {
                Side::Long => quote.bid - t.entry_price,
                Side::Short => t.entry_price - quote.ask,
            };
            t.profit = spec.price_to_points(distance) * spec.tick_value * t.volume;
        }
    }

    pub fn comment(&self, ticket: u64) -> Option<&str> {
        self.tickets
            .iter()
            .find(|t| t.ticket == ticket)
            .map(|t| t.comment.as_str())
    }

    fn own_ticket_mut(&mut self, ticket: u64, operation: &str) -> Result<&mut Ticket, EngineError> {
        let strategies = &self.strategies;
        self.tickets
            .iter_mut()
            .find(|t| t.ticket == ticket && StrategyId::from_magic(t.magic, strategies).is_some())
            .ok_or_else(|| EngineError::rejected(operation, format!("unknown ticket {}", ticket)))
    }
}

impl AccountPort for PaperAccount {
    fn equity(&self) -> f64 {
        self.equity
    }

    fn instrument(&self) -> InstrumentSpec {
        self.spec.clone()
    }
}

impl ExecutionPort for PaperGateway {
    fn open(&mut self, intent: &TradeIntent) -> Result<u64, EngineError> {
        let spec = &self.account.spec;
        if intent.volume < spec.min_volume || intent.volume > spec.max_volume {
            return Err(EngineError::rejected(
                "open",
                format!("invalid volume {}", intent.volume),
            ));
        }
        let stops_valid = match intent.direction {
            Direction::Buy => {
                intent.stop_loss < intent.entry_price && intent.take_profit > intent.entry_price
            }
            Direction::Sell => {
                intent.stop_loss > intent.entry_price && intent.take_profit < intent.entry_price
            }
        };
        if !stops_valid {
            return Err(EngineError::rejected("open", "invalid stops"));
        }

        let magic = intent.strategy.magic(&self.strategies);
        let ticket = self.allocate_ticket();
        self.tickets.push(Ticket {
            ticket,
            magic,
            side: Side::from(intent.direction),
            volume: intent.volume,
            entry_price: intent.entry_price,
            stop_loss: intent.stop_loss,
            take_profit: intent.take_profit,
            profit: 0.0,
            comment: intent.label().to_string(),
        });
        Ok(ticket)
    }

    fn modify_stop(&mut self, ticket: u64, new_stop: f64) -> Result<(), EngineError> {
        if new_stop <= 0.0 {
            return Err(EngineError::rejected("modify_stop", "invalid stops"));
        }
        let entry = self.own_ticket_mut(ticket, "modify_stop")?;
        entry.stop_loss = new_stop;
        Ok(())
    }

    fn close(&mut self, ticket: u64) -> Result<(), EngineError> {
        self.own_ticket_mut(ticket, "close")?;
        self.tickets.retain(|t| t.ticket != ticket);
        Ok(())
    }

    fn positions(&self) -> Result<Vec<Position>, EngineError> {
        Ok(self
            .tickets
            .iter()
            .filter_map(|t| {
                StrategyId::from_magic(t.magic, &self.strategies).map(|strategy| Position {
                    ticket: t.ticket,
                    strategy,
                    side: t.side,
                    volume: t.volume,
                    entry_price: t.entry_price,
                    stop_loss: t.stop_loss,
                    take_profit: t.take_profit,
                    profit: t.profit,
                })
            })
            .collect())
    }

    fn pending_orders(&self) -> Result<Vec<PendingOrder>, EngineError> {
        Ok(self
            .pending
            .iter()
            .filter_map(|&(ticket, magic)| {
                StrategyId::from_magic(magic, &self.strategies)
                    .map(|strategy| PendingOrder { ticket, strategy })
            })
            .collect())
    }
}
