//! SHiP Policy Unit Tests.
//!
//! Verifies signature derivation, SHCT learning through the lifecycle
//! hooks, prediction-driven insertion with the bimodal throttle, and the
//! RRIP victim search underneath it all.

use cache_replacement::config::{PolicyConfig, PolicyKind, SignatureSource};
use cache_replacement::policies::ship::{ShipPolicy, SHCT_ENTRIES, SIGNATURE_BITS};
use cache_replacement::policies::ReplacementPolicy;
use cache_replacement::LineState;

/// Builds a SHiP configuration with the given knobs.
fn ship_config(
    num_rrpv_bits: u32,
    num_shct_bits: u32,
    source: SignatureSource,
    hit_priority: bool,
    btp: u32,
) -> PolicyConfig {
    PolicyConfig {
        kind: PolicyKind::Ship,
        num_rrpv_bits,
        num_shct_bits,
        signature_source: source,
        hit_priority,
        btp,
    }
}

/// Baseline configuration: 2-bit RRPV, 3-bit SHCT, address signatures,
/// hit priority, no throttle.
fn base_config() -> PolicyConfig {
    ship_config(2, 3, SignatureSource::Address, true, 0)
}

/// Runs one full reused tenancy for `addr`: insert, hit, invalidate.
/// Each call bumps the SHCT counter of the address's signature by one.
fn reused_tenancy(policy: &mut ShipPolicy, line: &mut LineState, addr: u64) {
    policy.reset(line, addr);
    policy.touch(line);
    policy.invalidate(line);
}

/// Trains the SHCT counter for `addr` to saturation (3-bit: 7 tenancies).
fn train_to_saturation(policy: &mut ShipPolicy, addr: u64) {
    let mut line = policy.instantiate();
    let signature = policy.signature(addr);
    while policy.shct_value(signature) < 7 {
        reused_tenancy(policy, &mut line, addr);
    }
}

// ══════════════════════════════════════════════════════════
// 1. Signature derivation
// ══════════════════════════════════════════════════════════

/// Address mode takes the low 14 bits of the address verbatim.
#[test]
fn address_signature_is_low_bits() {
    let policy = ShipPolicy::new(&base_config());
    assert_eq!(policy.signature(0x1000), 0x1000);
    assert_eq!(policy.signature(0x3FFF), 0x3FFF);
    assert_eq!(policy.signature(0x4000), 0x0000, "bit 14 must truncate");
    assert_eq!(policy.signature(0xFFFF_FFFF_FFFF_7123), 0x3123);
}

/// PC mode drops the alignment bits before folding: a small PC maps to
/// itself shifted right by two.
#[test]
fn pc_signature_small_pc() {
    let config = ship_config(2, 3, SignatureSource::Pc, true, 0);
    let policy = ShipPolicy::new(&config);
    assert_eq!(policy.signature(0x1234), 0x1234 >> 2);
}

/// PC mode XOR-folds high chunks into the signature.
#[test]
fn pc_signature_folds_high_bits() {
    let config = ship_config(2, 3, SignatureSource::Pc, true, 0);
    let policy = ShipPolicy::new(&config);

    // 0x1_0000_0000 >> 2 = 0x4000_0000; folding 14-bit chunks:
    // 0x4000_0000 & 0x3FFF = 0, next chunk 0x10000 & 0x3FFF = 0,
    // final chunk 0x4. Signature = 4.
    assert_eq!(policy.signature(0x1_0000_0000), 4);

    // Two aligned copies of the same chunk cancel out.
    let pc = (0x1234_u64 << 2) ^ (0x1234_u64 << (2 + SIGNATURE_BITS));
    assert_eq!(policy.signature(pc), 0);
}

/// Signatures always index inside the table.
#[test]
fn signatures_fit_the_table() {
    let config = ship_config(2, 3, SignatureSource::Pc, true, 0);
    let policy = ShipPolicy::new(&config);
    for pc in (0..1_000_000_u64).step_by(4093) {
        let sig = policy.signature(pc.wrapping_mul(0x9E37_79B9));
        assert!((sig as usize) < SHCT_ENTRIES);
    }
}

// ══════════════════════════════════════════════════════════
// 2. Lifecycle hooks
// ══════════════════════════════════════════════════════════

/// Fresh lines are invalid, unsigned, and maximally evictable.
#[test]
fn instantiate_is_cold() {
    let policy = ShipPolicy::new(&base_config());
    let line = policy.instantiate();
    assert!(!line.is_valid());
    assert_eq!(line.rrpv(), Some(3));
    match line {
        LineState::Ship(inner) => {
            assert!(!inner.outcome);
            assert_eq!(inner.signature, 0);
        }
        other => panic!("unexpected line state {other:?}"),
    }
}

/// A cold SHCT predicts no reuse: insertion lands at the distant RRPV.
#[test]
fn cold_table_inserts_distant() {
    let mut policy = ShipPolicy::new(&base_config());
    let mut line = policy.instantiate();
    policy.reset(&mut line, 0x1000);
    assert!(line.is_valid());
    assert_eq!(line.rrpv(), Some(3));
}

/// Touch is monotonically non-increasing on the RRPV; under Hit Priority
/// a single touch reaches 0.
#[test]
fn touch_monotonic_hit_priority() {
    let mut policy = ShipPolicy::new(&base_config());
    let mut line = policy.instantiate();
    policy.reset(&mut line, 0x1000);

    let mut prev = line.rrpv().unwrap();
    policy.touch(&mut line);
    assert_eq!(line.rrpv(), Some(0));
    for _ in 0..5 {
        policy.touch(&mut line);
        let cur = line.rrpv().unwrap();
        assert!(cur <= prev, "touch must never raise the RRPV");
        prev = cur;
    }
}

/// Under Frequency Priority each touch steps down by at most one.
#[test]
fn touch_frequency_priority_steps() {
    let config = ship_config(2, 3, SignatureSource::Address, false, 0);
    let mut policy = ShipPolicy::new(&config);
    let mut line = policy.instantiate();
    policy.reset(&mut line, 0x1000);
    assert_eq!(line.rrpv(), Some(3));

    for expected in [2, 1, 0, 0] {
        policy.touch(&mut line);
        assert_eq!(line.rrpv(), Some(expected));
    }
}

// ══════════════════════════════════════════════════════════
// 3. SHCT learning
// ══════════════════════════════════════════════════════════

/// A reused tenancy increments its signature's counter on invalidation.
#[test]
fn reuse_increments_shct() {
    let mut policy = ShipPolicy::new(&base_config());
    let signature = policy.signature(0x1000);
    assert_eq!(policy.shct_value(signature), 0);

    let mut line = policy.instantiate();
    reused_tenancy(&mut policy, &mut line, 0x1000);
    assert_eq!(policy.shct_value(signature), 1);
}

/// A dead tenancy decrements the counter, saturating at zero.
#[test]
fn dead_tenancy_decrements_shct() {
    let mut policy = ShipPolicy::new(&base_config());
    let signature = policy.signature(0x1000);
    let mut line = policy.instantiate();

    // From zero, a dead tenancy stays at zero.
    policy.reset(&mut line, 0x1000);
    policy.invalidate(&mut line);
    assert_eq!(policy.shct_value(signature), 0);

    // Build up two, then tear one back down.
    reused_tenancy(&mut policy, &mut line, 0x1000);
    reused_tenancy(&mut policy, &mut line, 0x1000);
    assert_eq!(policy.shct_value(signature), 2);

    policy.reset(&mut line, 0x1000);
    policy.invalidate(&mut line);
    assert_eq!(policy.shct_value(signature), 1);
}

/// The counter saturates at `2^bits - 1` and never overflows.
#[test]
fn shct_saturates_at_ceiling() {
    let mut policy = ShipPolicy::new(&base_config());
    let signature = policy.signature(0x1000);
    let mut line = policy.instantiate();

    for _ in 0..20 {
        reused_tenancy(&mut policy, &mut line, 0x1000);
    }
    assert_eq!(policy.shct_value(signature), 7);
}

/// Invalidating an already-invalid line must not train the table again.
#[test]
fn double_invalidate_trains_once() {
    let mut policy = ShipPolicy::new(&base_config());
    let signature = policy.signature(0x1000);
    let mut line = policy.instantiate();

    reused_tenancy(&mut policy, &mut line, 0x1000);
    policy.invalidate(&mut line);
    policy.invalidate(&mut line);
    assert_eq!(policy.shct_value(signature), 1);
}

/// Overwriting a valid line via `reset` (replacement without an explicit
/// invalidate) still feeds the dying tenancy's outcome back.
#[test]
fn overwrite_feeds_back_prior_outcome() {
    let mut policy = ShipPolicy::new(&base_config());
    let first = policy.signature(0x1000);
    let mut line = policy.instantiate();

    policy.reset(&mut line, 0x1000);
    policy.touch(&mut line);

    // Overwrite with a different address: the 0x1000 tenancy was reused.
    policy.reset(&mut line, 0x2000);
    assert_eq!(policy.shct_value(first), 1);
}

/// Distinct signatures learn independently.
#[test]
fn signatures_learn_independently() {
    let mut policy = ShipPolicy::new(&base_config());
    let hot = policy.signature(0x1000);
    let cold = policy.signature(0x2000);
    let mut line = policy.instantiate();

    for _ in 0..3 {
        reused_tenancy(&mut policy, &mut line, 0x1000);
    }
    assert_eq!(policy.shct_value(hot), 3);
    assert_eq!(policy.shct_value(cold), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Prediction-driven insertion and the bimodal throttle
// ══════════════════════════════════════════════════════════

/// A saturated counter with `btp = 0` always inserts one step short of
/// distant.
#[test]
fn saturated_signature_inserts_long() {
    let mut policy = ShipPolicy::new(&base_config());
    train_to_saturation(&mut policy, 0x1000);

    let mut line = policy.instantiate();
    for _ in 0..50 {
        policy.reset(&mut line, 0x1000);
        assert_eq!(line.rrpv(), Some(2));
        policy.touch(&mut line);
        policy.invalidate(&mut line);
    }
}

/// `btp = 100` forces the distant position even for a saturated counter.
#[test]
fn full_throttle_overrides_prediction() {
    let config = ship_config(2, 3, SignatureSource::Address, true, 100);
    let mut policy = ShipPolicy::new(&config);
    train_to_saturation(&mut policy, 0x1000);

    let mut line = policy.instantiate();
    for _ in 0..50 {
        policy.reset(&mut line, 0x1000);
        assert_eq!(line.rrpv(), Some(3));
        policy.touch(&mut line);
        policy.invalidate(&mut line);
    }
}

/// A mid-range throttle forces distant insertion at roughly its
/// percentage. The generator is deterministic, so the band is loose but
/// stable run to run.
#[test]
fn mid_throttle_is_statistical() {
    let config = ship_config(2, 3, SignatureSource::Address, true, 50);
    let mut policy = ShipPolicy::new(&config);
    train_to_saturation(&mut policy, 0x1000);

    let mut line = policy.instantiate();
    let trials = 1000;
    let mut distant = 0;
    for _ in 0..trials {
        policy.reset(&mut line, 0x1000);
        if line.rrpv() == Some(3) {
            distant += 1;
        }
        policy.touch(&mut line);
        policy.invalidate(&mut line);
    }
    assert!(
        (350..=650).contains(&distant),
        "btp=50 forced {distant}/{trials} distant insertions"
    );
}

/// A signature below saturation still predicts no reuse.
#[test]
fn below_saturation_inserts_distant() {
    let mut policy = ShipPolicy::new(&base_config());
    let mut line = policy.instantiate();

    for _ in 0..6 {
        reused_tenancy(&mut policy, &mut line, 0x1000);
    }
    assert_eq!(policy.shct_value(policy.signature(0x1000)), 6);

    policy.reset(&mut line, 0x1000);
    assert_eq!(line.rrpv(), Some(3));
}

// ══════════════════════════════════════════════════════════
// 5. Victim selection
// ══════════════════════════════════════════════════════════

/// The first invalid candidate wins, never a valid one.
#[test]
fn victim_prefers_first_invalid() {
    let mut policy = ShipPolicy::new(&base_config());
    let mut lines: Vec<LineState> = (0..4).map(|_| policy.instantiate()).collect();
    for (i, line) in lines.iter_mut().enumerate() {
        policy.reset(line, (i as u64) << 6);
    }

    policy.invalidate(&mut lines[1]);
    policy.invalidate(&mut lines[3]);
    assert_eq!(policy.select_victim(&mut lines), 1);
}

/// A uniformly young set ages until saturation and breaks the tie to the
/// lowest index; termination takes at most `2^bits` passes.
#[test]
fn uniform_young_set_ages_and_terminates() {
    let mut policy = ShipPolicy::new(&base_config());
    let mut lines: Vec<LineState> = (0..4).map(|_| policy.instantiate()).collect();
    for (i, line) in lines.iter_mut().enumerate() {
        policy.reset(line, (i as u64) << 6);
        policy.touch(line);
    }

    // All valid at rrpv = 0: three aging passes to saturation.
    assert_eq!(policy.select_victim(&mut lines), 0);
    for line in &lines {
        assert_eq!(line.rrpv(), Some(3));
    }
}

/// An empty candidate slice violates the caller contract.
#[test]
#[should_panic(expected = "empty replacement candidate set")]
fn empty_candidates_panics() {
    let mut policy = ShipPolicy::new(&base_config());
    let _ = policy.select_victim(&mut []);
}

/// Handing SHiP a line produced by another policy is a programmer error.
#[test]
#[should_panic(expected = "another policy")]
fn rejects_foreign_line() {
    let mut policy = ShipPolicy::new(&base_config());
    let mut foreign = cache_replacement::policies::LruPolicy::new().instantiate();
    policy.touch(&mut foreign);
}

// ══════════════════════════════════════════════════════════
// 6. End-to-end scenario
// ══════════════════════════════════════════════════════════

/// Full lifecycle walk-through: cold insert lands distant, one hit
/// promotes to 0 under Hit Priority, invalidation trains the table.
#[test]
fn cold_insert_hit_invalidate_scenario() {
    let mut policy = ShipPolicy::new(&base_config());
    let signature = policy.signature(0x1000);
    assert_eq!(signature, 0x1000 & 0x3FFF);

    let mut line = policy.instantiate();
    policy.reset(&mut line, 0x1000);
    assert_eq!(line.rrpv(), Some(3), "cold SHCT inserts distant");

    policy.touch(&mut line);
    assert_eq!(line.rrpv(), Some(0), "hit priority promotes to 0");

    policy.invalidate(&mut line);
    assert_eq!(policy.shct_value(signature), 1, "reuse trains the table");
    assert!(!line.is_valid());
    assert_eq!(line.rrpv(), Some(3));
}
