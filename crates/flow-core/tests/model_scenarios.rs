// crates/flow-core/tests/model_scenarios.rs
use flow_core::cancellation::{opposes_trend, price_deviation};
use flow_core::depth_target::{apply_multiplier_change, refresh, target_from_draw};
use flow_core::planner::{build_quotes, select_cancels, shortfall};
use flow_core::price_level::{level_price, step_size};
use flow_core::price_process::{next_price, step_price};
use flow_core::quantity::{quantity, raw_quantity, time_factor};
use flow_core::rng::seeded;
use flow_core::state::PRICE_HISTORY_LEN;
use flow_core::{
    BookSnapshot, CancelReason, CancellationPolicy, MarketConfig, MarketState, Order, Side, Trend,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn order(id: usize, side: Side, price: &str) -> Order {
    Order {
        order_id: format!("o-{id}"),
        market: "TATA_INR".to_string(),
        price: dec(price),
        quantity: dec("1.00"),
        side,
        account_id: "5".to_string(),
    }
}

// -----------------------------------------------------------------------------
// Level pricing
// -----------------------------------------------------------------------------

#[test]
fn level_zero_bid_rounding_to_reference_moves_one_tick_down() {
    let config = MarketConfig::default();

    let step = step_size(194.0, 0, Side::Buy, Trend::Neutral);
    assert!((step - 0.0194).abs() < 1e-12);

    // 193.9806 rounds to 194.0, which would touch the reference.
    let bid = level_price(194.0, 0, Side::Buy, Trend::Neutral, &config).unwrap();
    assert_eq!(bid, dec("193.9"));

    let ask = level_price(194.0, 0, Side::Sell, Trend::Neutral, &config).unwrap();
    assert_eq!(ask, dec("194.1"));
}

#[test]
fn deeper_tiers_use_wider_steps() {
    let config = MarketConfig {
        price_decimals: 4,
        ..MarketConfig::default()
    };

    // level 9: 0.0001 * 194 * 10 = 0.194
    assert_eq!(
        level_price(194.0, 9, Side::Sell, Trend::Neutral, &config).unwrap(),
        dec("194.194")
    );
    // level 10: 0.0002 * 194 * 11 = 0.4268
    assert_eq!(
        level_price(194.0, 10, Side::Sell, Trend::Neutral, &config).unwrap(),
        dec("194.4268")
    );
    // level 20: 0.0003 * 194 * 21 = 1.2222
    assert_eq!(
        level_price(194.0, 20, Side::Buy, Trend::Neutral, &config).unwrap(),
        dec("192.7778")
    );
}

#[test]
fn uptrend_widens_asks_and_tightens_bids() {
    let neutral_ask = step_size(194.0, 5, Side::Sell, Trend::Neutral);
    let up_ask = step_size(194.0, 5, Side::Sell, Trend::Up);
    let up_bid = step_size(194.0, 5, Side::Buy, Trend::Up);

    assert!((up_ask - neutral_ask * 1.1).abs() < 1e-12);
    assert!((up_bid - neutral_ask * 0.9).abs() < 1e-12);
}

#[test]
fn collapsed_reference_price_yields_no_bid() {
    let config = MarketConfig::default();
    assert_eq!(level_price(0.0, 0, Side::Buy, Trend::Neutral, &config), None);
    assert_eq!(
        level_price(0.0, 0, Side::Sell, Trend::Neutral, &config),
        Some(dec("0.1"))
    );
}

// -----------------------------------------------------------------------------
// Price process
// -----------------------------------------------------------------------------

#[test]
fn price_process_reverts_toward_base() {
    // No noise, no trend: 10% of the gap closes each step.
    let next = step_price(200.0, 194.0, 0.0, Trend::Neutral, 0.0);
    assert!((next - 199.4).abs() < 1e-9);

    let next = step_price(190.0, 194.0, 0.0, Trend::Neutral, 0.0);
    assert!((next - 190.4).abs() < 1e-9);
}

#[test]
fn price_process_is_floored_at_zero() {
    assert_eq!(step_price(1.0, 0.0, 5.0, Trend::Down, -1.0), 0.0);
}

#[test]
fn long_run_stays_near_base() {
    let config = MarketConfig::default();
    let mut state = MarketState::new(&config, 0);
    let mut rng = seeded(7);

    for _ in 0..10_000 {
        next_price(&mut state, &config, &mut rng);
    }

    assert!(state.last_price > 150.0 && state.last_price < 250.0);
    assert_eq!(state.price_history().len(), PRICE_HISTORY_LEN);
}

#[test]
fn price_history_evicts_oldest_first() {
    let config = MarketConfig::default();
    let mut state = MarketState::new(&config, 0);
    assert_eq!(state.price_range(), None);

    for i in 0..(PRICE_HISTORY_LEN + 5) {
        state.record_price(i as f64);
    }

    assert_eq!(state.price_history().front().copied(), Some(5.0));
    assert_eq!(state.price_history().back().copied(), Some(104.0));
    assert_eq!(state.price_range(), Some((5.0, 104.0)));
}

// -----------------------------------------------------------------------------
// Quantity multiplier and depth target
// -----------------------------------------------------------------------------

#[test]
fn multiplier_update_applies_change_and_clamps() {
    assert!((apply_multiplier_change(1.0, 0.3, 0.0) - 1.3).abs() < 1e-12);
    assert_eq!(apply_multiplier_change(1.9, 0.2, 0.1), 2.0);
    assert_eq!(apply_multiplier_change(0.55, -0.2, -0.1), 0.5);
}

#[test]
fn target_draw_is_biased_toward_minimum() {
    assert_eq!(target_from_draw(60, 100, 0.0), 60);
    assert_eq!(target_from_draw(60, 100, 0.5), 70);
    assert_eq!(target_from_draw(60, 100, 0.999_999), 99);
    assert_eq!(target_from_draw(60, 100, 1.0), 100);
    assert_eq!(target_from_draw(5, 5, 0.7), 5);
}

#[test]
fn timers_fire_at_most_once_per_interval() {
    let config = MarketConfig::default();
    let mut state = MarketState::new(&config, 10_000);
    let mut rng = seeded(1);

    let early = refresh(&mut state, &config, 10_500, &mut rng);
    assert!(!early.multiplier_updated);
    assert!(!early.target_updated);

    let quantity_only = refresh(&mut state, &config, 11_000, &mut rng);
    assert!(quantity_only.multiplier_updated);
    assert!(!quantity_only.target_updated);
    assert_eq!(state.last_quantity_update_ms, 11_000);

    let both = refresh(&mut state, &config, 13_000, &mut rng);
    assert!(both.multiplier_updated);
    assert!(both.target_updated);
    assert_eq!(state.last_order_count_update_ms, 13_000);

    let again = refresh(&mut state, &config, 13_100, &mut rng);
    assert!(!again.multiplier_updated);
    assert!(!again.target_updated);
}

// -----------------------------------------------------------------------------
// Quantity model
// -----------------------------------------------------------------------------

#[test]
fn quantity_is_repeatable_for_a_fixed_seed() {
    let config = MarketConfig::default();
    let state = MarketState::new(&config, 0);

    let mut a = seeded(99);
    let mut b = seeded(99);
    for level in 0..40 {
        assert_eq!(
            quantity(level, &state, &config, 1_700_000_000_000, &mut a),
            quantity(level, &state, &config, 1_700_000_000_000, &mut b)
        );
    }
}

#[test]
fn raw_quantity_is_the_product_of_all_five_factors() {
    let config = MarketConfig::default();
    let mut state = MarketState::new(&config, 0);
    state.quantity_multiplier = 1.5;
    state.trend = Trend::Up;

    // t = 0 puts both sine terms at zero, so the time wave is exactly 1.
    assert_eq!(time_factor(0), 1.0);

    // 5 * exp(-3 * 0.08) * 1 * (sqrt(0.25) * 1.5) * 1.5 * (1 + 0.1)
    let expected = 5.0 * (-0.24f64).exp() * 1.0 * 0.75 * 1.5 * 1.1;
    let raw = raw_quantity(3, &state, &config, 0, 0.25);
    assert!((raw - expected).abs() < 1e-12, "raw {raw}, expected {expected}");
    assert!((raw - 4.8673).abs() < 1e-3);

    state.trend = Trend::Down;
    let down = raw_quantity(3, &state, &config, 0, 0.25);
    assert!((down - expected * 0.9 / 1.1).abs() < 1e-12);
}

#[test]
fn time_wave_stays_within_bounds() {
    for t in (0..200_000).step_by(37) {
        let f = time_factor(t);
        assert!((0.5..=1.5).contains(&f));
    }
}

// -----------------------------------------------------------------------------
// Cancellation policy
// -----------------------------------------------------------------------------

#[test]
fn side_at_minimum_is_never_cancelled() {
    let policy = CancellationPolicy::new(60);
    let mut rng = seeded(3);
    // Far from the reference, over target, against a downtrend.
    let stale = order(1, Side::Buy, "100.0");

    for _ in 0..1_000 {
        assert!(!policy.should_cancel(&stale, 194.0, 60, 10, Trend::Down, &mut rng));
        assert!(!policy.should_cancel(&stale, 194.0, 12, 10, Trend::Down, &mut rng));
    }
}

#[test]
fn stale_quotes_are_always_cancelled_above_minimum() {
    let policy = CancellationPolicy::new(60);
    let mut rng = seeded(4);
    let stale = order(1, Side::Sell, "220.0");

    assert!(price_deviation(220.0, 194.0) > 0.08);
    for _ in 0..500 {
        assert!(policy.should_cancel(&stale, 194.0, 61, 100, Trend::Neutral, &mut rng));
    }
}

#[test]
fn trend_opposition_matches_regime() {
    assert!(opposes_trend(Side::Sell, Trend::Up));
    assert!(opposes_trend(Side::Buy, Trend::Down));
    assert!(!opposes_trend(Side::Buy, Trend::Up));
    assert!(!opposes_trend(Side::Sell, Trend::Neutral));
}

#[test]
fn churn_rate_is_roughly_five_percent() {
    let policy = CancellationPolicy::new(0);
    let mut rng = seeded(5);
    let near = order(1, Side::Buy, "193.9");

    let fired = (0..20_000)
        .filter(|_| policy.should_cancel(&near, 194.0, 10, 100, Trend::Neutral, &mut rng))
        .count();

    assert!(fired > 800 && fired < 1_200, "fired {fired}");
}

fn reason_counts(
    policy: &CancellationPolicy,
    order: &Order,
    orders_on_side: usize,
    target: usize,
    trend: Trend,
    seed: u64,
) -> (usize, usize, usize) {
    let mut rng = seeded(seed);
    let (mut churn, mut over_target, mut against_trend) = (0, 0, 0);
    for _ in 0..20_000 {
        match policy.evaluate(order, 194.0, orders_on_side, target, trend, &mut rng) {
            Some(CancelReason::Churn) => churn += 1,
            Some(CancelReason::OverTarget) => over_target += 1,
            Some(CancelReason::AgainstTrend) => against_trend += 1,
            Some(other) => panic!("unexpected reason {other}"),
            None => {}
        }
    }
    (churn, over_target, against_trend)
}

#[test]
fn over_target_side_is_thinned_at_fifteen_percent() {
    let policy = CancellationPolicy::new(0);
    let near = order(1, Side::Buy, "193.9");

    // Reported only when churn did not fire first: 0.95 * 0.15 = 14.25%.
    let (_, over_target, against_trend) =
        reason_counts(&policy, &near, 12, 10, Trend::Neutral, 6);
    assert!(over_target > 2_450 && over_target < 3_250, "over_target {over_target}");
    assert_eq!(against_trend, 0);
}

#[test]
fn over_target_trigger_needs_the_side_above_target() {
    let policy = CancellationPolicy::new(0);
    let near = order(1, Side::Buy, "193.9");

    for orders_on_side in [5, 10] {
        let (churn, over_target, _) =
            reason_counts(&policy, &near, orders_on_side, 10, Trend::Neutral, 7);
        assert_eq!(over_target, 0);
        assert!(churn > 800 && churn < 1_200, "churn {churn}");
    }
}

#[test]
fn asks_are_withdrawn_in_an_uptrend_at_ten_percent() {
    let policy = CancellationPolicy::new(0);
    let ask = order(1, Side::Sell, "194.1");

    // 0.95 * 0.1 = 9.5% once churn has had its turn; the side is under target.
    let (_, over_target, against_trend) = reason_counts(&policy, &ask, 5, 10, Trend::Up, 8);
    assert_eq!(over_target, 0);
    assert!(against_trend > 1_550 && against_trend < 2_250, "against_trend {against_trend}");
}

#[test]
fn no_trend_withdrawal_without_an_opposing_regime() {
    let policy = CancellationPolicy::new(0);
    let ask = order(1, Side::Sell, "194.1");
    let bid = order(2, Side::Buy, "193.9");

    let cases = [
        (&ask, Trend::Neutral),
        (&bid, Trend::Neutral),
        (&bid, Trend::Up),
        (&ask, Trend::Down),
    ];
    for (o, trend) in cases {
        let (_, _, against_trend) = reason_counts(&policy, o, 5, 10, trend, 9);
        assert_eq!(against_trend, 0, "{} in {trend}", o.side);
    }
}

// -----------------------------------------------------------------------------
// Planning
// -----------------------------------------------------------------------------

#[test]
fn select_cancels_never_takes_a_side_below_minimum() {
    let policy = CancellationPolicy::new(3);
    let mut rng = seeded(11);

    // Every bid is stale, so every one is a candidate.
    let bids = (0..8).map(|i| order(i, Side::Buy, "50.0")).collect();
    let snapshot = BookSnapshot {
        bids,
        asks: Vec::new(),
    };

    let flagged = select_cancels(&snapshot, &policy, 194.0, 3, Trend::Neutral, &mut rng);
    assert_eq!(flagged.len(), 5);
    assert!(flagged.iter().all(|(_, r)| *r == CancelReason::StaleQuote || *r == CancelReason::Churn));
}

#[test]
fn partition_drops_foreign_markets_and_accounts() {
    let mut foreign = order(9, Side::Sell, "1.0");
    foreign.market = "OTHER".to_string();

    let mut other_account = order(8, Side::Buy, "193.8");
    other_account.account_id = "99".to_string();

    let snapshot = BookSnapshot::partition(
        vec![
            order(1, Side::Buy, "193.9"),
            order(2, Side::Sell, "194.1"),
            foreign,
            other_account,
        ],
        "TATA_INR",
        "5",
    );

    assert_eq!(snapshot.bids[0].account_id, "5");
    assert_eq!(snapshot.count(Side::Buy), 1);
    assert_eq!(snapshot.count(Side::Sell), 1);
    assert_eq!(snapshot.total(), 2);
}

#[test]
fn quotes_fill_each_side_shortfall_in_level_order() {
    let config = MarketConfig::default();
    let state = MarketState::new(&config, 0);
    let mut rng = seeded(21);

    assert_eq!(shortfall(60, 57), 3);
    assert_eq!(shortfall(60, 75), 0);

    let quotes = build_quotes(194.0, 3, 1, &state, &config, 0, &mut rng);
    let layout: Vec<(usize, Side)> = quotes.iter().map(|q| (q.level, q.side)).collect();
    assert_eq!(
        layout,
        vec![
            (0, Side::Buy),
            (0, Side::Sell),
            (1, Side::Buy),
            (2, Side::Buy),
        ]
    );
    assert!(quotes.iter().all(|q| q.quantity >= dec("0.1")));
}
