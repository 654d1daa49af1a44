//! # Randomized Queue Scenarios
//!
//! Random enqueue/finalize/claim sequences checked against the queue's
//! conservation properties: locked value moves only through finalization
//! and claims, no claim pays more than requested, and rounding dust never
//! makes the locked pool insolvent.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_types::Address;
    use tp_03_withdrawal_queue::{WithdrawalLedger, PRECISION};

    fn owner(i: u8) -> Address {
        [i; 20]
    }

    #[test]
    fn test_random_sequences_conserve_locked_value() {
        let mut rng = StdRng::seed_from_u64(0x71DE);

        for _ in 0..50 {
            let mut queue = WithdrawalLedger::new();
            let mut expected_locked: u128 = 0;
            let mut unclaimed: Vec<u64> = Vec::new();
            let mut clock: u64 = 0;

            for _ in 0..200 {
                match rng.gen_range(0..3) {
                    // enqueue
                    0 => {
                        clock += rng.gen_range(1..10);
                        let value = rng.gen_range(1..1_000u128);
                        let shares = rng.gen_range(1..1_000u128);
                        queue
                            .enqueue(value, shares, owner(rng.gen_range(1..5)), clock)
                            .unwrap();
                    }
                    // finalize a random prefix at a random solvency ratio
                    1 => {
                        let last = queue.last_request_id();
                        let finalized = queue.last_finalized_request_id();
                        if finalized == last {
                            continue;
                        }
                        let next = rng.gen_range(finalized + 1..=last);
                        let rate = if rng.gen_bool(0.5) {
                            PRECISION
                        } else {
                            PRECISION / rng.gen_range(2..5)
                        };
                        let (value, _) = queue.finalization_batch(next, rate).unwrap();
                        queue.finalize(next, value).unwrap();
                        expected_locked += value;
                        for id in finalized + 1..=next {
                            unclaimed.push(id);
                        }
                    }
                    // claim a random finalized request
                    _ => {
                        if unclaimed.is_empty() {
                            continue;
                        }
                        let id = unclaimed.swap_remove(rng.gen_range(0..unclaimed.len()));
                        let status = queue.status(id).unwrap();
                        let hint = queue
                            .find_checkpoint_hint(id, 0, queue.last_checkpoint_index())
                            .unwrap()
                            .unwrap();
                        let payout = queue.claim(id, hint, &status.owner).unwrap();
                        assert!(payout <= status.value);
                        expected_locked -= payout;
                    }
                }
                assert_eq!(queue.locked_value(), expected_locked);
            }

            // every remaining finalized-unclaimed request is coverable;
            // discount flooring may strand dust but never overdraws
            let remaining: u128 = unclaimed
                .iter()
                .map(|&id| {
                    let status = queue.status(id).unwrap();
                    let hint = queue
                        .find_checkpoint_hint(id, 0, queue.last_checkpoint_index())
                        .unwrap()
                        .unwrap();
                    let mut probe = queue.clone();
                    probe.claim(id, hint, &status.owner).unwrap()
                })
                .sum();
            assert!(remaining <= queue.locked_value());
        }
    }

    #[test]
    fn test_full_rate_sequences_never_append_checkpoints() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut queue = WithdrawalLedger::new();
        let mut clock = 0u64;

        for _ in 0..100 {
            clock += 1;
            // enqueued at the 1:1 rate, so full-rate batches always cover
            // the requested value exactly
            let value = rng.gen_range(1..500u128);
            queue.enqueue(value, value, owner(1), clock).unwrap();
            if rng.gen_bool(0.4) {
                let next = queue.last_request_id();
                let (value, _) = queue.finalization_batch(next, PRECISION).unwrap();
                assert_eq!(queue.finalize(next, value).unwrap(), None);
            }
        }

        // a fully solvent history claims everything through the sentinel
        assert_eq!(queue.last_checkpoint_index(), 0);
        for id in 1..=queue.last_finalized_request_id() {
            let status = queue.status(id).unwrap();
            assert_eq!(queue.claim(id, 0, &owner(1)).unwrap(), status.value);
        }
    }
}
