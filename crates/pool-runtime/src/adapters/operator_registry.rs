//! # Operator Registry Adapter
//!
//! Static operator set splitting the operator fee evenly. A production
//! deployment would back this with the registry subsystem; the runtime
//! only needs the allocation contract.

use async_trait::async_trait;
use shared_types::Address;
use tp_02_report_processing::ports::outbound::{FeeAllocation, OperatorRegistry};
use tp_02_report_processing::ReportResult;

/// Even-split allocation over a fixed operator list.
pub struct StaticOperatorRegistry {
    operators: Vec<Address>,
}

impl StaticOperatorRegistry {
    pub fn new(operators: Vec<Address>) -> Self {
        Self { operators }
    }
}

#[async_trait]
impl OperatorRegistry for StaticOperatorRegistry {
    async fn distribute_fees(&self, total_operator_fee: u128) -> ReportResult<Vec<FeeAllocation>> {
        if self.operators.is_empty() || total_operator_fee == 0 {
            return Ok(Vec::new());
        }
        // integer division; the processor routes the remainder to treasury
        let per_operator = total_operator_fee / self.operators.len() as u128;
        if per_operator == 0 {
            return Ok(Vec::new());
        }
        Ok(self
            .operators
            .iter()
            .map(|operator| FeeAllocation {
                recipient: *operator,
                value: per_operator,
            })
            .collect())
    }
}
