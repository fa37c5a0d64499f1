use liquify_spammer::policy::{DISCOUNT_RANGE, LIQUIDITY_AMOUNT_RANGE};
use liquify_spammer::{AmountMode, DiscountMode, ParameterPolicy, RotationMode, ValidatorPair};

fn policy(amount: AmountMode, seed: u64) -> ParameterPolicy {
    ParameterPolicy::with_seed(amount, DiscountMode::Fixed(1000), RotationMode::Cycle, seed)
}

fn pool(n: usize) -> Vec<ValidatorPair> {
    (0..n)
        .map(|i| ValidatorPair {
            validator: format!("validator_tdx_2_1v{}", i),
            lsu: format!("resource_tdx_2_1l{}", i),
        })
        .collect()
}

#[test]
fn fixed_amount_is_capped_at_remaining() {
    let mut policy = policy(AmountMode::Fixed(50_000), 7);
    assert_eq!(policy.next_amount(200_000), 50_000);
    assert_eq!(policy.next_amount(30_000), 30_000);
}

#[test]
fn bounded_random_stays_within_bounds_and_cap() {
    let (low, high) = LIQUIDITY_AMOUNT_RANGE;
    let mut policy = policy(AmountMode::BoundedRandom { low, high }, 42);

    for remaining in [high * 3, high, low + 1_234, 60_000] {
        for _ in 0..1_000 {
            let amount = policy.next_amount(remaining);
            assert!(amount >= low);
            assert!(amount <= remaining.min(high));
        }
    }
}

#[test]
fn bounded_random_returns_exact_remainder_below_minimum() {
    let (low, high) = LIQUIDITY_AMOUNT_RANGE;
    let mut policy = policy(AmountMode::BoundedRandom { low, high }, 42);

    // Cap below the configured minimum: the policy finishes the campaign
    // with a sub-minimum final transaction instead of failing.
    assert_eq!(policy.next_amount(low - 1), low - 1);
    assert_eq!(policy.next_amount(1), 1);
}

#[test]
fn stepped_random_discount_lands_on_grid() {
    let (low, high, step) = DISCOUNT_RANGE;
    let mut policy = ParameterPolicy::with_seed(
        AmountMode::Fixed(1),
        DiscountMode::SteppedRandom { low, high, step },
        RotationMode::Cycle,
        9,
    );

    for _ in 0..1_000 {
        let discount = policy.next_discount();
        assert!(discount >= low);
        assert!(discount < high);
        assert_eq!((discount - low) % step, 0);
    }
}

#[test]
fn cycle_rotation_visits_every_pool_entry() {
    let pool = pool(6);
    let mut policy = policy(AmountMode::Fixed(1), 3);

    let mut seen = Vec::new();
    for _ in 0..pool.len() {
        seen.push(policy.next_pair(&pool).clone());
    }
    for pair in &pool {
        assert!(seen.contains(pair));
    }
}

#[test]
fn random_rotation_picks_only_pool_members() {
    let pool = pool(4);
    let mut policy = ParameterPolicy::with_seed(
        AmountMode::Fixed(1),
        DiscountMode::Fixed(1000),
        RotationMode::RandomPick,
        11,
    );

    for _ in 0..200 {
        let pair = policy.next_pair(&pool);
        assert!(pool.contains(pair));
    }
}
