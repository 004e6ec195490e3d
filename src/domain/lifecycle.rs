//! Trade lifecycle management: breakeven, trailing stop and reversal exit.
//!
//! Runs on every tick over the broker's open positions. Each rule is a
//! pure planner; [`manage_positions`] applies them in three passes
//! (breakeven, reversal exit, trailing) and feeds every accepted stop
//! move back into its working copy so later passes compare against it.
//! Stops only ever tighten.

use crate::domain::bar::Quote;
use crate::domain::error::EngineError;
use crate::domain::instrument::InstrumentSpec;
use crate::domain::market::MarketView;
use crate::domain::params::{EngineParams, LifecycleParams};
use crate::domain::position::{Position, Side};
use crate::domain::signal::{ma_crossover, Direction, StrategyId};
use crate::ports::execution_port::ExecutionPort;

/// Slack for point arithmetic on prices that are not exactly representable.
const POINT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Breakeven,
    Trailing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleAction {
    MoveStop {
        ticket: u64,
        reason: StopReason,
        from: f64,
        to: f64,
    },
    CloseOnReversal {
        ticket: u64,
    },
}

#[derive(Debug, Default)]
pub struct LifecycleReport {
    pub actions: Vec<LifecycleAction>,
    pub failures: Vec<EngineError>,
}

/// New stop at entry ± buffer once profit covers the trigger distance.
pub fn plan_breakeven(
    position: &Position,
    params: &LifecycleParams,
    spec: &InstrumentSpec,
) -> Option<f64> {
    if params.breakeven_trigger_points <= 0.0 {
        return None;
    }
    let trigger_money = params.breakeven_trigger_points * spec.tick_value * position.volume;
    if position.profit < trigger_money {
        return None;
    }
    let buffer = spec.points_to_price(params.breakeven_buffer_points);
    let target = match position.side {
        Side::Long => position.entry_price + buffer,
        Side::Short => position.entry_price - buffer,
    };
    let target = spec.normalize_price(target);
    position.improves_stop(target).then_some(target)
}

/// New stop trailing the exit price by the configured distance, once the
/// position is at least that far in profit. Never at or behind entry.
pub fn plan_trailing(
    position: &Position,
    quote: &Quote,
    params: &LifecycleParams,
    spec: &InstrumentSpec,
) -> Option<f64> {
    let distance_points = params.trailing_stop_points;
    if distance_points <= 0.0 {
        return None;
    }
    let price = position.exit_price(quote);
    let profit_points = match position.side {
        Side::Long => spec.price_to_points(price - position.entry_price),
        Side::Short => spec.price_to_points(position.entry_price - price),
    };
    if profit_points < distance_points - POINT_TOLERANCE {
        return None;
    }

    let distance = spec.points_to_price(distance_points);
    let candidate = match position.side {
        Side::Long => spec.normalize_price(price - distance),
        Side::Short => spec.normalize_price(price + distance),
    };
    let beyond_entry = match position.side {
        Side::Long => candidate > position.entry_price,
        Side::Short => candidate < position.entry_price,
    };
    (beyond_entry && position.improves_stop(candidate)).then_some(candidate)
}

/// Trend-follow positions close when the fast/slow averages cross against them.
pub fn plan_reversal_exit(position: &Position, market: &MarketView, params: &EngineParams) -> bool {
    if position.strategy != StrategyId::TrendFollow {
        return false;
    }
    matches!(
        (position.side, ma_crossover(market, params)),
        (Side::Long, Some(Direction::Sell)) | (Side::Short, Some(Direction::Buy))
    )
}

fn apply_stop(
    position: &mut Position,
    new_stop: f64,
    reason: StopReason,
    gateway: &mut dyn ExecutionPort,
    report: &mut LifecycleReport,
) {
    match gateway.modify_stop(position.ticket, new_stop) {
        Ok(()) => {
            tracing::info!(
                ticket = position.ticket,
                ?reason,
                from = position.stop_loss,
                to = new_stop,
                "stop moved"
            );
            report.actions.push(LifecycleAction::MoveStop {
                ticket: position.ticket,
                reason,
                from: position.stop_loss,
                to: new_stop,
            });
            position.stop_loss = new_stop;
        }
        Err(e) => {
            tracing::warn!(ticket = position.ticket, ?reason, "stop modification failed: {}", e);
            report.failures.push(e);
        }
    }
}

pub fn manage_positions(
    positions: Vec<Position>,
    market: &MarketView,
    params: &EngineParams,
    spec: &InstrumentSpec,
    gateway: &mut dyn ExecutionPort,
) -> LifecycleReport {
    let mut report = LifecycleReport::default();
    let mut working = positions;

    for position in working.iter_mut() {
        if let Some(stop) = plan_breakeven(position, &params.lifecycle, spec) {
            apply_stop(position, stop, StopReason::Breakeven, gateway, &mut report);
        }
    }

    let mut open = Vec::with_capacity(working.len());
    for position in working {
        if !plan_reversal_exit(&position, market, params) {
            open.push(position);
            continue;
        }
        match gateway.close(position.ticket) {
            Ok(()) => {
                tracing::info!(ticket = position.ticket, "closed on moving average reversal");
                report.actions.push(LifecycleAction::CloseOnReversal {
                    ticket: position.ticket,
                });
            }
            Err(e) => {
                tracing::warn!(ticket = position.ticket, "reversal close failed: {}", e);
                report.failures.push(e);
                open.push(position);
            }
        }
    }

    let Some(quote) = market.quote() else {
        if params.lifecycle.trailing_stop_points > 0.0 && !open.is_empty() {
            tracing::debug!("no quote available, trailing skipped");
        }
        return report;
    };
    for position in open.iter_mut() {
        if let Some(stop) = plan_trailing(position, &quote, &params.lifecycle, spec) {
            apply_stop(position, stop, StopReason::Trailing, gateway, &mut report);
        }
    }

    report
}
