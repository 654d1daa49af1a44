//! # Withdrawal Lifecycle Tests
//!
//! Request → finalize → claim across the ledger, queue and vault: full
//! payouts when the pool is solvent, discounted payouts after losses, and
//! the escrow/settlement accounting in between.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pool_runtime::adapters::{CashVault, GuardianGateAdapter};
    use pool_runtime::container::PoolConfig;
    use pool_runtime::PoolRuntime;
    use shared_types::{Address, Report};
    use tp_01_share_ledger::{LedgerConfig, ShareLedgerApi, ShareLedgerService};
    use tp_03_withdrawal_queue::{
        QueueConfig, WithdrawalQueueApi, WithdrawalQueueService, PRECISION,
    };

    const ALICE: Address = [0xAA; 20];
    const BOB: Address = [0xBB; 20];
    const RESERVE: Address = [0x77; 20];
    const GUARDIAN: Address = [0x01; 20];

    fn runtime_config() -> PoolConfig {
        let mut config = PoolConfig::default();
        config.runtime.guardians = vec![GUARDIAN];
        config.runtime.guardian_quorum = 1;
        config.runtime.withdrawal_reserve = RESERVE;
        config.queue.planner.min_request_age_secs = 0;
        // accounting-only flows; keep the numbers round
        config.report.fee_policy.fee_basis_points = 0;
        config
    }

    fn inflow_report(ref_period: u64, inflow: u128, at: u64) -> Report {
        Report {
            ref_period,
            reported_at: at,
            reported_validator_balance: 0,
            el_rewards_collected: 0,
            withdrawal_vault_inflow: inflow,
            exited_validator_count: 0,
            burn_requested_shares: 0,
        }
    }

    #[tokio::test]
    async fn test_two_requests_finalize_and_claim_in_any_order() {
        let mut runtime = PoolRuntime::new(runtime_config(), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.submit_deposit(BOB, 1_000).await.unwrap();
        let id_a = handle.request_withdrawal(ALICE, 100, 10).await.unwrap();
        let id_b = handle.request_withdrawal(BOB, 200, 11).await.unwrap();

        // the report wires 300 of exit cash into the vault
        handle
            .submit_report(inflow_report(1, 300, 20), 20)
            .await
            .unwrap();
        let plan = handle.run_finalization(30).await.unwrap().unwrap();
        assert_eq!(plan.next_request_id, id_b);
        assert_eq!(plan.value_to_lock, 300);

        // claim out of order
        assert_eq!(handle.claim(id_b, None, BOB, BOB).await.unwrap(), 200);
        assert_eq!(handle.claim(id_a, None, ALICE, ALICE).await.unwrap(), 100);
        assert_eq!(runtime.container().vault.available(), 0);

        let info = handle.queue_info().await.unwrap();
        assert_eq!(info.locked_value, 0);
        assert_eq!(info.last_finalized_request_id, 2);
    }

    #[tokio::test]
    async fn test_request_escrows_shares_and_settlement_burns_them() {
        let mut runtime = PoolRuntime::new(runtime_config(), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.request_withdrawal(ALICE, 400, 10).await.unwrap();
        // escrowed shares no longer count toward the owner's balance
        assert_eq!(handle.balance_of(ALICE).await.unwrap(), 600);
        assert_eq!(handle.balance_of(RESERVE).await.unwrap(), 400);

        handle
            .submit_report(inflow_report(1, 400, 20), 20)
            .await
            .unwrap();
        handle.run_finalization(30).await.unwrap().unwrap();

        // settlement removed the locked value and burned the reserve shares
        let totals = handle.totals().await.unwrap();
        assert_eq!(totals.total_pooled_value, 1_000);
        assert_eq!(totals.total_shares, 600);
        assert_eq!(handle.balance_of(RESERVE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_loss_before_finalization_discounts_the_claim() {
        // drive the services directly: enqueue at rate 1.0, halve the pool,
        // then finalize at the post-loss rate
        let ledger = ShareLedgerService::new(
            LedgerConfig::default(),
            Arc::new(GuardianGateAdapter::new(vec![GUARDIAN], 1)),
        );
        let vault = Arc::new(CashVault::new());
        let queue = WithdrawalQueueService::new(QueueConfig::default(), Arc::clone(&vault));

        ledger.submit_deposit(ALICE, 1_000).await.unwrap();
        ledger.escrow_shares(ALICE, RESERVE, 400).unwrap();
        queue.request_withdrawal(ALICE, 400, 400, 10).await.unwrap();

        // the pool halves before the batch is priced
        ledger.apply_report(-500, None, &[]).unwrap();
        let rate = ledger.share_rate_e27().await.unwrap();
        assert_eq!(rate, PRECISION / 2);

        vault.credit(1_000);
        let plan = queue
            .plan_finalization(vault.available(), rate, 1_000_000)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(plan.value_to_lock, 200);
        assert_eq!(plan.shares_to_burn, 400);

        let appended = queue
            .finalize(plan.next_request_id, plan.value_to_lock)
            .await
            .unwrap();
        assert_eq!(appended, Some(1));
        ledger
            .settle_withdrawals(RESERVE, plan.shares_to_burn, plan.value_to_lock)
            .unwrap();

        let hint = queue.find_checkpoint_hint(1, 0, 1).await.unwrap().unwrap();
        assert_eq!(queue.claim(1, hint, ALICE, ALICE).await.unwrap(), 200);

        // remaining holders keep their proportional slice
        assert_eq!(ledger.totals().await.total_shares, 600);
        assert_eq!(ledger.totals().await.total_pooled_value, 300);
        assert_eq!(ledger.balance_of(ALICE).await, 300);
    }

    #[tokio::test]
    async fn test_transferred_request_claims_for_new_owner() {
        let mut runtime = PoolRuntime::new(runtime_config(), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        let id = handle.request_withdrawal(ALICE, 300, 10).await.unwrap();
        handle.transfer_request(id, ALICE, BOB).await.unwrap();

        handle
            .submit_report(inflow_report(1, 300, 20), 20)
            .await
            .unwrap();
        handle.run_finalization(30).await.unwrap().unwrap();

        assert!(handle.claim(id, None, ALICE, ALICE).await.is_err());
        assert_eq!(handle.claim(id, None, BOB, BOB).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_min_request_age_defers_finalization() {
        let mut config = runtime_config();
        config.queue.planner.min_request_age_secs = 1_000;
        let mut runtime = PoolRuntime::new(config, Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.request_withdrawal(ALICE, 100, 100).await.unwrap();
        handle
            .submit_report(inflow_report(1, 100, 110), 110)
            .await
            .unwrap();

        // too young at t=500, old enough at t=1200
        assert_eq!(handle.run_finalization(500).await.unwrap(), None);
        assert!(handle.run_finalization(1_200).await.unwrap().is_some());
    }
}
