//! # Deposit Gate Tests
//!
//! Guardian quorum controlling the movement of buffered deposits toward
//! the validator set.

#[cfg(test)]
mod tests {
    use pool_runtime::container::PoolConfig;
    use pool_runtime::PoolRuntime;
    use shared_types::Address;

    const ALICE: Address = [0xAA; 20];
    const G1: Address = [0x01; 20];
    const G2: Address = [0x02; 20];

    fn runtime_config(guardians: Vec<Address>, quorum: usize) -> PoolConfig {
        let mut config = PoolConfig::default();
        config.runtime.guardians = guardians;
        config.runtime.guardian_quorum = quorum;
        config.runtime.withdrawal_reserve = [0x77; 20];
        config
    }

    #[tokio::test]
    async fn test_staking_requires_guardian_approval() {
        let mut runtime = PoolRuntime::new(runtime_config(vec![G1], 1), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        assert!(handle.stake_buffered(500).await.is_err());
        assert_eq!(handle.totals().await.unwrap().buffered_value, 1_000);

        handle.approve_deposit(G1).await.unwrap();
        assert_eq!(handle.stake_buffered(500).await.unwrap(), 500);
        assert_eq!(handle.totals().await.unwrap().buffered_value, 500);
        // staking changes buckets, not the pool total
        assert_eq!(handle.totals().await.unwrap().total_pooled_value, 1_000);
    }

    #[tokio::test]
    async fn test_quorum_of_two_needs_both_guardians() {
        let mut runtime = PoolRuntime::new(runtime_config(vec![G1, G2], 2), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.approve_deposit(G1).await.unwrap();
        assert!(handle.stake_buffered(500).await.is_err());

        handle.approve_deposit(G2).await.unwrap();
        assert_eq!(handle.stake_buffered(500).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_unknown_guardian_rejected() {
        let mut runtime = PoolRuntime::new(runtime_config(vec![G1], 1), Vec::new());
        runtime.start().await.unwrap();
        assert!(runtime.handle().approve_deposit([0xEE; 20]).await.is_err());
    }

    #[tokio::test]
    async fn test_each_batch_consumes_the_quorum() {
        let mut runtime = PoolRuntime::new(runtime_config(vec![G1], 1), Vec::new());
        runtime.start().await.unwrap();
        let handle = runtime.handle();

        handle.submit_deposit(ALICE, 1_000).await.unwrap();
        handle.approve_deposit(G1).await.unwrap();
        handle.stake_buffered(400).await.unwrap();

        // the approval was spent by the first batch
        assert!(handle.stake_buffered(400).await.is_err());
        handle.approve_deposit(G1).await.unwrap();
        assert_eq!(handle.stake_buffered(400).await.unwrap(), 400);
    }
}
