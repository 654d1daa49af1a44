//! # Rebase Flow Tests
//!
//! Deposits, oracle reports, and fee dilution across the Share Ledger and
//! Report Processing subsystems: balances rebase through the rate while
//! share entries stay untouched, and fee mints dilute instead of inflate.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pool_runtime::adapters::{
        GuardianGateAdapter, LedgerGatewayAdapter, StaticOperatorRegistry,
    };
    use pool_runtime::container::PoolConfig;
    use pool_runtime::PoolRuntime;
    use shared_types::{Address, Report};
    use tp_01_share_ledger::{LedgerConfig, ShareLedgerApi, ShareLedgerService};
    use tp_02_report_processing::{ReportConfig, ReportProcessorApi, ReportProcessorService};

    const ALICE: Address = [0xAA; 20];
    const TREASURY: Address = [0xFE; 20];
    const GUARDIAN: Address = [0x01; 20];

    fn runtime_config() -> PoolConfig {
        let mut config = PoolConfig::default();
        config.runtime.guardians = vec![GUARDIAN];
        config.runtime.guardian_quorum = 1;
        config.runtime.withdrawal_reserve = [0x77; 20];
        config.queue.planner.min_request_age_secs = 0;
        config
    }

    fn report(ref_period: u64, balance: u128, at: u64) -> Report {
        Report {
            ref_period,
            reported_at: at,
            reported_validator_balance: balance,
            el_rewards_collected: 0,
            withdrawal_vault_inflow: 0,
            exited_validator_count: 0,
            burn_requested_shares: 0,
        }
    }

    fn ledger_service() -> ShareLedgerService<GuardianGateAdapter> {
        ShareLedgerService::new(
            LedgerConfig::default(),
            Arc::new(GuardianGateAdapter::new(vec![GUARDIAN], 1)),
        )
    }

    #[tokio::test]
    async fn test_profit_report_rebases_balances() {
        let mut runtime = PoolRuntime::new(runtime_config(), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        assert_eq!(handle.balance_of(ALICE).await.unwrap(), 1_000);

        // +100 profit; 10% fee, all of it minted to treasury (no operators)
        let outcome = handle.submit_report(report(1, 100, 10), 10).await.unwrap();
        assert_eq!(outcome.net_value_change, 100);
        assert_eq!(outcome.total_fee, 10);
        assert_eq!(outcome.total_pooled_value, 1_100);
        // shares = 10 * 1000 / (1100 - 10)
        assert_eq!(outcome.fee_shares_minted, 9);

        // 1000 * 1100 / 1009
        assert_eq!(handle.balance_of(ALICE).await.unwrap(), 1_090);
        assert_eq!(handle.balance_of(TREASURY).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_fee_mints_dilute_instead_of_inflating() {
        let mut runtime = PoolRuntime::new(runtime_config(), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.submit_report(report(1, 100, 10), 10).await.unwrap();

        // holders can never claim more than the pool holds
        let totals = handle.totals().await.unwrap();
        let alice = handle.balance_of(ALICE).await.unwrap();
        let treasury = handle.balance_of(TREASURY).await.unwrap();
        assert!(alice + treasury <= totals.total_pooled_value);
    }

    #[tokio::test]
    async fn test_compounding_reports_and_period_monotonicity() {
        let mut runtime = PoolRuntime::new(runtime_config(), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.submit_report(report(1, 100, 10), 10).await.unwrap();
        let first = handle.balance_of(ALICE).await.unwrap();

        // balance delta measured against the previous report's 100
        let outcome = handle.submit_report(report(2, 250, 20), 20).await.unwrap();
        assert_eq!(outcome.net_value_change, 150);
        let second = handle.balance_of(ALICE).await.unwrap();
        assert!(second > first);

        // replaying an old reference period is rejected
        assert!(handle.submit_report(report(2, 300, 30), 30).await.is_err());
    }

    #[tokio::test]
    async fn test_operator_fee_split() {
        let op_a: Address = [0x10; 20];
        let op_b: Address = [0x11; 20];
        let mut runtime = PoolRuntime::new(runtime_config(), vec![op_a, op_b]);
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        let outcome = handle
            .submit_report(report(1, 1_000, 10), 10)
            .await
            .unwrap();
        assert_eq!(outcome.total_fee, 100);
        assert_eq!(outcome.operator_fee, 50);
        assert_eq!(outcome.treasury_fee, 50);

        let a = handle.balance_of(op_a).await.unwrap();
        let b = handle.balance_of(op_b).await.unwrap();
        let treasury = handle.balance_of(TREASURY).await.unwrap();
        assert!(a > 0 && b > 0);
        // even split, later mint sees a slightly larger supply
        assert!(a.abs_diff(b) <= 1);
        assert!(a + b + treasury <= outcome.total_fee);
    }

    #[tokio::test]
    async fn test_staked_principal_is_not_reported_profit() {
        let gate = Arc::new(GuardianGateAdapter::new(vec![GUARDIAN], 1));
        let ledger = Arc::new(ShareLedgerService::new(
            LedgerConfig::default(),
            Arc::clone(&gate),
        ));
        let processor = ReportProcessorService::new(
            ReportConfig::default(),
            Arc::new(LedgerGatewayAdapter::new(Arc::clone(&ledger))),
            Arc::new(StaticOperatorRegistry::new(Vec::new())),
        );

        ledger.submit_deposit(ALICE, 1_000).await.unwrap();
        gate.approve(GUARDIAN).unwrap();
        ledger.stake_buffered(600).await.unwrap();

        // the oracle sees the freshly staked 600 with the validators;
        // nothing was earned, so nothing rebases and no fee is minted
        let outcome = processor
            .process_report(report(1, 600, 10), 10)
            .await
            .unwrap();
        assert_eq!(outcome.net_value_change, 0);
        assert_eq!(outcome.total_fee, 0);
        assert_eq!(ledger.totals().await.total_pooled_value, 1_000);
        assert_eq!(ledger.balance_of(ALICE).await, 1_000);

        // the next report measures profit against the moved baseline
        let outcome = processor
            .process_report(report(2, 700, 20), 20)
            .await
            .unwrap();
        assert_eq!(outcome.net_value_change, 100);
        assert_eq!(outcome.total_fee, 10);
        assert_eq!(ledger.totals().await.total_pooled_value, 1_100);
    }

    #[tokio::test]
    async fn test_loss_rebases_down_and_floors_at_zero() {
        let svc = ledger_service();
        svc.submit_deposit(ALICE, 1_000).await.unwrap();

        svc.apply_report(-200, None, &[]).unwrap();
        assert_eq!(svc.balance_of(ALICE).await, 800);
        assert_eq!(svc.shares_of(ALICE).await, 1_000);

        // losses beyond the pool clamp to empty rather than underflow
        svc.apply_report(-900, None, &[]).unwrap();
        assert_eq!(svc.totals().await.total_pooled_value, 0);
        assert_eq!(svc.balance_of(ALICE).await, 0);
    }

    #[tokio::test]
    async fn test_burn_redistributes_to_remaining_holders() {
        let burner: Address = [0xFD; 20];
        let svc = ledger_service();
        svc.submit_deposit(ALICE, 1_000).await.unwrap();
        svc.escrow_shares(ALICE, burner, 200).unwrap();
        assert_eq!(svc.balance_of(ALICE).await, 800);

        // burning the escrowed shares leaves the pool value with the rest
        svc.apply_report(0, Some((burner, 200)), &[]).unwrap();
        assert_eq!(svc.totals().await.total_shares, 800);
        assert_eq!(svc.totals().await.total_pooled_value, 1_000);
        assert_eq!(svc.balance_of(ALICE).await, 1_000);
    }
}
