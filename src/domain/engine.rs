//! Per-tick orchestration.
//!
//! Every tick runs the lifecycle manager over the broker's open positions.
//! When the forming bar's timestamp differs from the one recorded in the
//! caller-owned [`BarCheckpoint`], the arbiter runs once, and a winning
//! signal is sized and submitted. Failures never abort a cycle; they are
//! collected in the returned [`CycleReport`].

use chrono::NaiveDateTime;

use crate::domain::arbiter::arbitrate;
use crate::domain::config_validation::validate_params;
use crate::domain::error::EngineError;
use crate::domain::lifecycle::{manage_positions, LifecycleAction};
use crate::domain::market::MarketView;
use crate::domain::params::EngineParams;
use crate::domain::position::Exposure;
use crate::domain::signal::Signal;
use crate::domain::sizing::{build_intent, TradeIntent};
use crate::ports::account_port::AccountPort;
use crate::ports::execution_port::ExecutionPort;
use crate::ports::market_data_port::MarketDataPort;

/// Timestamp of the last forming bar the arbiter ran on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BarCheckpoint {
    last_bar_time: Option<NaiveDateTime>,
}

impl BarCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `time`; returns true if it starts a new bar.
    pub fn observe(&mut self, time: NaiveDateTime) -> bool {
        if self.last_bar_time == Some(time) {
            return false;
        }
        self.last_bar_time = Some(time);
        true
    }

    pub fn last_bar_time(&self) -> Option<NaiveDateTime> {
        self.last_bar_time
    }
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub new_bar: bool,
    pub signal: Option<Signal>,
    pub opened: Option<(TradeIntent, u64)>,
    pub actions: Vec<LifecycleAction>,
    pub failures: Vec<EngineError>,
}

pub struct Engine {
    params: EngineParams,
}

impl Engine {
    pub fn new(params: EngineParams) -> Result<Self, EngineError> {
        validate_params(&params)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn on_tick(
        &self,
        checkpoint: &mut BarCheckpoint,
        market_data: &dyn MarketDataPort,
        account: &dyn AccountPort,
        gateway: &mut dyn ExecutionPort,
    ) -> CycleReport {
        let market = MarketView::new(market_data);
        let spec = account.instrument();
        let mut report = CycleReport::default();

        match gateway.positions() {
            Ok(positions) => {
                let lifecycle = manage_positions(positions, &market, &self.params, &spec, gateway);
                report.actions = lifecycle.actions;
                report.failures.extend(lifecycle.failures);
            }
            Err(e) => {
                tracing::warn!("position query failed: {}", e);
                report.failures.push(e);
            }
        }

        let Some(forming) = market.bar(0) else {
            tracing::debug!("no forming bar available");
            return report;
        };
        if !checkpoint.observe(forming.time) {
            return report;
        }
        report.new_bar = true;

        let exposure = match (gateway.positions(), gateway.pending_orders()) {
            (Ok(positions), Ok(pending)) => Exposure::from_book(&positions, &pending),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("order book query failed, skipping entries: {}", e);
                report.failures.push(e);
                return report;
            }
        };

        let Some(signal) = arbitrate(&market, &self.params, &exposure, spec.point) else {
            return report;
        };
        tracing::info!(bar = %forming.time, %signal, "signal");
        report.signal = Some(signal);

        let Some(quote) = market.quote() else {
            tracing::warn!(%signal, "no quote, entry skipped");
            report.failures.push(EngineError::DataUnavailable {
                what: "quote".to_string(),
            });
            return report;
        };

        let atr = market.value(&self.params.atr(), 1);
        let intent = match build_intent(&signal, &quote, atr, account.equity(), &self.params.risk, &spec) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(%signal, "sizing failed, trade skipped: {}", e);
                report.failures.push(e.into());
                return report;
            }
        };

        match gateway.open(&intent) {
            Ok(ticket) => {
                tracing::info!(
                    ticket,
                    label = intent.label(),
                    volume = intent.volume,
                    entry = intent.entry_price,
                    stop = intent.stop_loss,
                    target = intent.take_profit,
                    "opened"
                );
                report.opened = Some((intent, ticket));
            }
            Err(e) => {
                tracing::warn!(label = intent.label(), "open rejected: {}", e);
                report.failures.push(e);
            }
        }

        report
    }
}
