//! End-to-end engine cycles against fixed market snapshots and the paper
//! gateway.
//!
//! Tests cover:
//! - Mean-reversion entry from a lower-band pierce plus bullish engulfing
//! - Trend-follow entry and its suppression by an open trend position
//! - Breakeven promotion that never moves backward across ticks
//! - Trailing stop ratcheting with price
//! - Reversal exit for trend positions only

mod common;

use approx::assert_relative_eq;
use bandtrader::adapters::paper_gateway::{PaperAccount, PaperGateway};
use bandtrader::domain::bar::Quote;
use bandtrader::domain::engine::{BarCheckpoint, Engine};
use bandtrader::domain::indicator::BandLine;
use bandtrader::domain::lifecycle::{LifecycleAction, StopReason};
use bandtrader::domain::params::EngineParams;
use bandtrader::domain::position::Side;
use bandtrader::domain::signal::{Direction, SignalOrigin, StrategyId};
use bandtrader::ports::execution_port::ExecutionPort;
use common::FixedMarket;

const BOLLINGER_MAGIC: i64 = 1001;
const TREND_MAGIC: i64 = 2002;

fn paper(params: &EngineParams) -> (PaperAccount, PaperGateway) {
    let account = PaperAccount::default();
    let gateway = PaperGateway::new(account.clone(), &params.strategies);
    (account, gateway)
}

fn with_atr(market: FixedMarket, params: &EngineParams, atr: f64) -> FixedMarket {
    market
        .with_value(params.atr(), 1, atr)
        .with_value(params.atr(), 2, atr)
}

mod mean_reversion {
    use super::*;

    /// Prior bar pierces the 1.0960 lower band and closes back above it,
    /// engulfing the bearish bar before it.
    fn market(params: &EngineParams) -> FixedMarket {
        let market = FixedMarket::new()
            .with_bar(2, 1.0964, 1.0966, 1.0960, 1.0962)
            .with_bar(1, 1.0958, 1.0968, 1.0950, 1.0965)
            .with_bar(0, 1.0965, 1.0967, 1.0963, 1.0966)
            .with_quote(1.09660, 1.09670)
            .with_value(params.regime_ema(), 1, 1.10001)
            .with_value(params.regime_ema(), 2, 1.10000)
            .with_value(params.band(BandLine::Upper), 1, 1.1040)
            .with_value(params.band(BandLine::Middle), 1, 1.1000)
            .with_value(params.band(BandLine::Lower), 1, 1.0960);
        with_atr(market, params, 0.0020)
    }

    #[test]
    fn lower_band_pierce_with_engulfing_buys() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        let market = market(engine.params());
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(&mut checkpoint, &market, &account, &mut gateway);

        let signal = report.signal.expect("mean reversion signal");
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.origin, SignalOrigin::MeanReversionBounce);

        let (intent, ticket) = report.opened.expect("trade opened");
        assert_relative_eq!(intent.entry_price, 1.09670);
        assert_relative_eq!(intent.stop_points, 300.0);
        assert_relative_eq!(intent.stop_loss, 1.09370, epsilon = 1e-9);
        assert_relative_eq!(intent.take_profit, 1.10570, epsilon = 1e-9);
        // 100 / 300 points
        assert_relative_eq!(intent.volume, 0.33);
        assert_eq!(gateway.comment(ticket), Some("mean_reversion"));
        assert!(report.failures.is_empty());
    }

    #[test]
    fn trending_market_suppresses_mean_reversion() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        let market = market(engine.params()).with_value(engine.params().regime_ema(), 1, 1.10100);
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(&mut checkpoint, &market, &account, &mut gateway);
        assert!(report.new_bar);
        assert!(report.signal.is_none());
        assert!(gateway.positions().unwrap().is_empty());
    }

    #[test]
    fn open_bollinger_position_blocks_second_entry() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_position(BOLLINGER_MAGIC, Side::Short, 0.1, 1.1000, 1.1030);
        let market = market(engine.params());
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(&mut checkpoint, &market, &account, &mut gateway);
        assert!(report.signal.is_none());
        assert_eq!(gateway.positions().unwrap().len(), 1);
    }

    #[test]
    fn foreign_position_does_not_block_entry() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_position(77, Side::Short, 0.1, 1.1000, 1.1030);
        let market = market(engine.params());
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(&mut checkpoint, &market, &account, &mut gateway);
        assert!(report.opened.is_some());
    }
}

mod trend_follow {
    use super::*;

    fn crossing(params: &EngineParams, bullish: bool) -> FixedMarket {
        let (below, above) = (1.0990, 1.1010);
        let (fast2, fast1) = if bullish { (below, above) } else { (above, below) };
        let market = FixedMarket::new()
            .with_bar(1, 1.0995, 1.1003, 1.0993, 1.1000)
            .with_bar(0, 1.1000, 1.1004, 1.0998, 1.1002)
            .with_quote(1.10020, 1.10030)
            .with_value(params.trend_fast(), 2, fast2)
            .with_value(params.trend_slow(), 2, 1.1000)
            .with_value(params.trend_fast(), 1, fast1)
            .with_value(params.trend_slow(), 1, 1.1000);
        with_atr(market, params, 0.0020)
    }

    #[test]
    fn bullish_cross_buys_with_trend_identity() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(
            &mut checkpoint,
            &crossing(engine.params(), true),
            &account,
            &mut gateway,
        );
        let (intent, _) = report.opened.expect("trend entry");
        assert_eq!(intent.direction, Direction::Buy);
        assert_eq!(intent.strategy, StrategyId::TrendFollow);
        assert_eq!(gateway.positions().unwrap()[0].strategy, StrategyId::TrendFollow);
    }

    #[test]
    fn open_trend_position_suppresses_reentry() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_position(TREND_MAGIC, Side::Long, 0.1, 1.0950, 1.0920);
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(
            &mut checkpoint,
            &crossing(engine.params(), true),
            &account,
            &mut gateway,
        );
        assert!(report.signal.is_none());
        assert_eq!(gateway.positions().unwrap().len(), 1);
    }

    #[test]
    fn pending_trend_order_suppresses_entry() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_pending(TREND_MAGIC);
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(
            &mut checkpoint,
            &crossing(engine.params(), true),
            &account,
            &mut gateway,
        );
        assert!(report.signal.is_none());
    }

    #[test]
    fn bearish_cross_closes_trend_long_but_not_bollinger_long() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        let trend = gateway.insert_position(TREND_MAGIC, Side::Long, 0.1, 1.0950, 1.0920);
        let bollinger = gateway.insert_position(BOLLINGER_MAGIC, Side::Long, 0.1, 1.0950, 1.0920);
        let mut checkpoint = BarCheckpoint::new();

        let report = engine.on_tick(
            &mut checkpoint,
            &crossing(engine.params(), false),
            &account,
            &mut gateway,
        );
        assert!(report
            .actions
            .contains(&LifecycleAction::CloseOnReversal { ticket: trend }));
        let remaining: Vec<u64> = gateway.positions().unwrap().iter().map(|p| p.ticket).collect();
        assert!(remaining.contains(&bollinger));
        assert!(!remaining.contains(&trend));
    }
}

mod lifecycle {
    use super::*;

    fn tick_market(bid: f64) -> FixedMarket {
        FixedMarket::new()
            .with_bar(0, 1.1000, 1.1050, 1.0990, 1.1010)
            .with_quote(bid, bid + 0.0001)
    }

    fn run_tick(
        engine: &Engine,
        account: &PaperAccount,
        gateway: &mut PaperGateway,
        checkpoint: &mut BarCheckpoint,
        bid: f64,
    ) -> Vec<LifecycleAction> {
        gateway.revalue(&Quote {
            bid,
            ask: bid + 0.0001,
        });
        let report = engine.on_tick(checkpoint, &tick_market(bid), account, gateway);
        assert!(report.failures.is_empty(), "{:?}", report.failures);
        report.actions
    }

    fn stop_of(gateway: &PaperGateway) -> f64 {
        gateway.positions().unwrap()[0].stop_loss
    }

    #[test]
    fn breakeven_is_never_moved_backward() {
        let engine = Engine::new(EngineParams::default()).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_position(BOLLINGER_MAGIC, Side::Long, 1.0, 1.10000, 1.09700);
        let mut checkpoint = BarCheckpoint::new();

        assert!(run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10100).is_empty());
        assert_relative_eq!(stop_of(&gateway), 1.09700);

        let actions = run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10250);
        assert!(matches!(
            actions.as_slice(),
            [LifecycleAction::MoveStop {
                reason: StopReason::Breakeven,
                ..
            }]
        ));
        assert_relative_eq!(stop_of(&gateway), 1.10020, epsilon = 1e-9);

        // profit falls back below the trigger: stop holds
        assert!(run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10120).is_empty());
        assert_relative_eq!(stop_of(&gateway), 1.10020, epsilon = 1e-9);

        // profit grows again: breakeven is already in place
        assert!(run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10500).is_empty());
        assert_relative_eq!(stop_of(&gateway), 1.10020, epsilon = 1e-9);
    }

    #[test]
    fn trailing_stop_ratchets_with_price() {
        let mut params = EngineParams::default();
        params.lifecycle.trailing_stop_points = 150.0;
        let engine = Engine::new(params).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_position(TREND_MAGIC, Side::Long, 1.0, 1.10000, 1.09700);
        let mut checkpoint = BarCheckpoint::new();

        let actions = run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10250);
        // breakeven first, then trailing tightens further in the same tick
        assert_eq!(actions.len(), 2);
        assert_relative_eq!(stop_of(&gateway), 1.10100, epsilon = 1e-9);

        run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10400);
        assert_relative_eq!(stop_of(&gateway), 1.10250, epsilon = 1e-9);

        assert!(run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.10300).is_empty());
        assert_relative_eq!(stop_of(&gateway), 1.10250, epsilon = 1e-9);
    }

    #[test]
    fn short_trailing_uses_ask() {
        let mut params = EngineParams::default();
        params.lifecycle.breakeven_trigger_points = 0.0;
        params.lifecycle.breakeven_buffer_points = 0.0;
        params.lifecycle.trailing_stop_points = 100.0;
        let engine = Engine::new(params).unwrap();
        let (account, mut gateway) = paper(engine.params());
        gateway.insert_position(BOLLINGER_MAGIC, Side::Short, 1.0, 1.10000, 1.10300);
        let mut checkpoint = BarCheckpoint::new();

        // ask = 1.09810, 190 points in profit
        run_tick(&engine, &account, &mut gateway, &mut checkpoint, 1.09800);
        assert_relative_eq!(stop_of(&gateway), 1.09910, epsilon = 1e-9);
    }
}
