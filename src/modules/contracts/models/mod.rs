pub mod commission_split;
pub mod contract;
pub mod installment_commission;

pub use commission_split::{CommissionBreakdown, CommissionSplit, CommissionSummary};
pub use contract::Contract;
pub use installment_commission::{
    InstallmentCommissionSummary, InstallmentCommissionTotals, ReceivableCommission,
    ReceivedCommission,
};
