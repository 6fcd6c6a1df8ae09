//! Property and scenario tests for the schedule calculator, TWAP assembler,
//! and wellness recompute.

use feedwell::engine::DECAY_INTERVAL_MS;
use feedwell::{
    assemble_twap_descriptor, compute_schedule_parameters, recompute_wellness, Address, Decimal,
    FeedKind, FeedRecord, FeedStatus, Routing, RoutingMode, ScheduleError, ScheduleIntent,
    StopCondition, TimeMs, WellnessReason, WellnessRecord,
};
use std::str::FromStr;

const WALLET: &str = "0x1111111111111111111111111111111111111111";
const USDC: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const WETH: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const T: i64 = 1_700_000_000_000;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn intent(chunk_in: &str, interval_secs: i64, stop: StopCondition) -> ScheduleIntent {
    ScheduleIntent {
        src_token: addr(USDC),
        dst_token: addr(WETH),
        chunk_in: d(chunk_in),
        interval_secs,
        stop_condition: stop,
        slippage_tolerance_percent: d("0.5"),
        quote_amount: Some(d("0.0412")),
        dst_decimals: 18,
    }
}

fn feed(
    id: i64,
    kind: FeedKind,
    status: FeedStatus,
    created_at: i64,
    period_secs: i64,
    executions: u32,
) -> FeedRecord {
    FeedRecord {
        id,
        wallet: addr(WALLET),
        kind,
        src_token: addr(USDC),
        dst_token: addr(WETH),
        src_symbol: Some("USDC".into()),
        dst_symbol: Some("WETH".into()),
        chunk_size: d("100"),
        period_secs,
        status,
        created_at: TimeMs::new(created_at),
        bot_execution_count: executions,
        next_fill_time: None,
        order_hash: None,
    }
}

fn existing(last_fed: i64) -> WellnessRecord {
    WellnessRecord {
        wallet: addr(WALLET),
        current_wellness: d("8"),
        last_fed_time: TimeMs::new(last_fed),
        last_recomputed_at: TimeMs::new(last_fed),
        history: vec![],
    }
}

/// Small deterministic generator so synthetic histories are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn synthetic_feeds(rng: &mut XorShift, count: usize) -> Vec<FeedRecord> {
    let statuses = [
        FeedStatus::Active,
        FeedStatus::Executing,
        FeedStatus::Completed,
        FeedStatus::Cancelled,
        FeedStatus::Failed,
    ];
    (0..count)
        .map(|i| {
            let kind = if rng.below(2) == 0 {
                FeedKind::OneOff
            } else {
                FeedKind::Recurring
            };
            let status = statuses[rng.below(statuses.len() as u64) as usize];
            let created_at = T - (rng.below(30 * 24) as i64) * 3_600_000;
            let period_secs = 60 + rng.below(86_400) as i64;
            let executions = rng.below(25) as u32;
            feed(i as i64, kind, status, created_at, period_secs, executions)
        })
        .collect()
}

// =============================================================================
// Schedule calculator
// =============================================================================

#[test]
fn test_scenario_a_total_amount_counts_whole_chunks() {
    let params = compute_schedule_parameters(
        &intent("100", 86_400, StopCondition::TotalAmount(d("350"))),
        TimeMs::new(T),
    )
    .unwrap();
    assert_eq!(params.total_cycles, 3);
    assert_eq!(params.total_principal, d("300"));
}

#[test]
fn test_calculator_is_idempotent() {
    let i = intent(
        "25.5",
        3_600,
        StopCondition::EndDate(TimeMs::new(T + 7 * 86_400_000)),
    );
    let a = compute_schedule_parameters(&i, TimeMs::new(T)).unwrap();
    let b = compute_schedule_parameters(&i, TimeMs::new(T)).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_vec(&a).unwrap(),
        serde_json::to_vec(&b).unwrap()
    );
}

#[test]
fn test_valid_intents_always_have_at_least_one_cycle() {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    for _ in 0..500 {
        let chunk = Decimal::from(1 + rng.below(1_000) as i64);
        let interval = 60 + rng.below(7 * 86_400) as i64;
        let stop = if rng.below(2) == 0 {
            StopCondition::TotalAmount(Decimal::from(rng.below(5_000) as i64))
        } else {
            StopCondition::EndDate(TimeMs::new(T + rng.below(30 * 86_400_000) as i64))
        };
        let mut i = intent("1", interval, stop);
        i.chunk_in = chunk;

        match compute_schedule_parameters(&i, TimeMs::new(T)) {
            Ok(params) => assert!(params.total_cycles >= 1),
            Err(ScheduleError::Validation(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}

#[test]
fn test_scenario_c_same_token_min_output_is_chunk() {
    for slippage in ["0", "3", "100"] {
        let mut i = intent("42.123456", 3_600, StopCondition::TotalAmount(d("1000")));
        i.dst_token = i.src_token.clone();
        i.dst_decimals = 6;
        i.slippage_tolerance_percent = d(slippage);
        i.quote_amount = None;

        let params = compute_schedule_parameters(&i, TimeMs::new(T)).unwrap();
        assert_eq!(params.min_output_per_cycle, d("42.123456"));

        let desc = assemble_twap_descriptor(
            &params,
            &Routing {
                wallet: addr(WALLET),
                mode: RoutingMode::SelfTransfer,
                decimals_src: 6,
                decimals_dst: 6,
            },
        )
        .unwrap();
        assert_eq!(desc.min_out_amount, desc.chunk_in_amount);
        assert_eq!(desc.min_out_amount, 42_123_456);
    }
}

#[test]
fn test_calculator_to_assembler_exact_units() {
    let params = compute_schedule_parameters(
        &intent("0.1", 600, StopCondition::TotalAmount(d("1"))),
        TimeMs::new(T),
    )
    .unwrap();
    assert_eq!(params.total_cycles, 10);

    let desc = assemble_twap_descriptor(
        &params,
        &Routing {
            wallet: addr(WALLET),
            mode: RoutingMode::ThirdParty(addr(WETH)),
            decimals_src: 18,
            decimals_dst: 18,
        },
    )
    .unwrap();
    assert_eq!(desc.chunk_in_amount, 100_000_000_000_000_000);
    // 0.0412 * 0.995 = 0.040994
    assert_eq!(desc.min_out_amount, 40_994_000_000_000_000);
    assert_eq!(desc.chunk_count, 10);
    assert_eq!(desc.interval_seconds, 600);
    assert_eq!(desc.recipient, addr(WETH));
}

// =============================================================================
// Wellness recompute
// =============================================================================

#[test]
fn test_scenario_b_recurring_with_two_executions() {
    let feeds = [feed(1, FeedKind::Recurring, FeedStatus::Active, T, 3_600, 2)];
    let now = TimeMs::new(T + 10_000_000);

    let record = recompute_wellness(&addr(WALLET), &feeds, None, now);

    // 8.0 + 0.5 (creation) + 2 * 0.5 (executions); 10000s idle is under one decay step.
    assert_eq!(record.current_wellness, d("9.5"));
    assert!(record
        .history
        .iter()
        .all(|e| e.reason != WellnessReason::InactivityDecay));
    assert_eq!(record.history.len(), 3);
    assert_eq!(record.history[0].timestamp, TimeMs::new(T + 3_600_000));
    assert_eq!(record.history[0].reason, WellnessReason::CycleExecuted);
    assert_eq!(record.last_recomputed_at, now);
}

#[test]
fn test_decay_boundary_one_step() {
    let now = T;
    let last = now - DECAY_INTERVAL_MS - 1_000;
    let record = recompute_wellness(&addr(WALLET), &[], Some(&existing(last)), TimeMs::new(now));

    assert_eq!(record.current_wellness, d("7.5"));
    assert_eq!(record.history.len(), 1);
    assert_eq!(record.history[0].reason, WellnessReason::InactivityDecay);
    assert_eq!(record.history[0].delta, d("-0.5"));
    assert_eq!(
        record.history[0].timestamp,
        TimeMs::new(last + DECAY_INTERVAL_MS)
    );
    assert_eq!(record.last_fed_time, TimeMs::new(last));
}

#[test]
fn test_decay_boundary_just_under_one_step() {
    let now = T;
    let last = now - DECAY_INTERVAL_MS + 1;
    let record = recompute_wellness(&addr(WALLET), &[], Some(&existing(last)), TimeMs::new(now));
    assert_eq!(record.current_wellness, d("8"));
    assert!(record.history.is_empty());
}

#[test]
fn test_wellness_always_clamped() {
    let mut rng = XorShift(0xdead_beef_cafe_f00d);
    for round in 0..200 {
        let count = rng.below(12) as usize;
        let feeds = synthetic_feeds(&mut rng, count);
        let prior = if rng.below(2) == 0 {
            None
        } else {
            Some(existing(T - rng.below(20 * DECAY_INTERVAL_MS as u64) as i64))
        };
        let record = recompute_wellness(&addr(WALLET), &feeds, prior.as_ref(), TimeMs::new(T));
        assert!(
            record.current_wellness >= Decimal::zero()
                && record.current_wellness <= Decimal::from(10),
            "round {} produced {}",
            round,
            record.current_wellness
        );
    }
}

#[test]
fn test_recompute_is_commutative() {
    let mut rng = XorShift(0x0123_4567_89ab_cdef);
    for _ in 0..50 {
        let count = 1 + rng.below(8) as usize;
        let feeds = synthetic_feeds(&mut rng, count);
        let prior = existing(T - 40 * DECAY_INTERVAL_MS);
        let now = TimeMs::new(T);

        let baseline = recompute_wellness(&addr(WALLET), &feeds, Some(&prior), now);

        let mut reversed = feeds.clone();
        reversed.reverse();
        let mut rotated = feeds.clone();
        rotated.rotate_left(count / 2);

        for permuted in [reversed, rotated] {
            let record = recompute_wellness(&addr(WALLET), &permuted, Some(&prior), now);
            assert_eq!(record.current_wellness, baseline.current_wellness);
            assert_eq!(record.last_fed_time, baseline.last_fed_time);
            assert_eq!(record.history, baseline.history);
        }
    }
}

#[test]
fn test_history_is_newest_first() {
    let feeds = [
        feed(1, FeedKind::OneOff, FeedStatus::Completed, T - 5_000_000, 0, 0),
        feed(2, FeedKind::Recurring, FeedStatus::Failed, T - 9_000_000, 600, 4),
    ];
    let record = recompute_wellness(
        &addr(WALLET),
        &feeds,
        Some(&existing(T - 3 * DECAY_INTERVAL_MS)),
        TimeMs::new(T + 2 * DECAY_INTERVAL_MS),
    );
    assert!(record
        .history
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
}
