use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core::dates::inclusive_month_span;
use crate::core::{AppError, Result};
use crate::modules::contracts::models::{CommissionBreakdown, CommissionSplit, Contract};

/// How the flat fee component is earned over the supply window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeStrategy {
    /// Whole fee earned once supply starts
    #[default]
    WholeAtStart,
    /// Half earned at supply start, half at supply end
    SplitStartEnd,
}

impl FromStr for FeeStrategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "whole_at_start" => Ok(Self::WholeAtStart),
            "split_start_end" => Ok(Self::SplitStartEnd),
            other => Err(AppError::Configuration(format!("Unknown fee strategy: {}", other))),
        }
    }
}

/// Splits contract commission into received and receivable at an instant
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractProrator {
    fee_strategy: FeeStrategy,
}

impl ContractProrator {
    pub fn new(fee_strategy: FeeStrategy) -> Self {
        Self { fee_strategy }
    }

    /// Received vs receivable for one contract, all enabled components summed
    pub fn compute(&self, contract: &Contract, now: DateTime<Utc>) -> CommissionSplit {
        self.breakdown(contract, now).total()
    }

    /// Per-component split for one contract; disabled components are zero
    pub fn breakdown(&self, contract: &Contract, now: DateTime<Utc>) -> CommissionBreakdown {
        CommissionBreakdown {
            fee: if contract.fee {
                self.fee_component(contract, now)
            } else {
                CommissionSplit::default()
            },
            one_time: if contract.one_time_payment {
                CommissionSplit::binary(
                    contract.value * contract.one_time_fraction,
                    contract.has_started(now),
                )
            } else {
                CommissionSplit::default()
            },
            monthly: if contract.monthly_payment {
                Self::monthly_component(contract, now)
            } else {
                CommissionSplit::default()
            },
        }
    }

    /// Component splits summed over every contract
    pub fn aggregate(&self, contracts: &[Contract], now: DateTime<Utc>) -> CommissionBreakdown {
        contracts.iter().map(|c| self.breakdown(c, now)).sum()
    }

    /// Whole contract value as settled: at supply start when the contract is
    /// paid in full, at supply end otherwise
    pub fn settlement_split(contract: &Contract, now: DateTime<Utc>) -> CommissionSplit {
        let settled = if contract.full_value {
            contract.has_started(now)
        } else {
            contract.has_ended(now)
        };
        CommissionSplit::binary(contract.value, settled)
    }

    fn fee_component(&self, contract: &Contract, now: DateTime<Utc>) -> CommissionSplit {
        let amount = contract.value * contract.fee_fraction;

        match self.fee_strategy {
            FeeStrategy::WholeAtStart => CommissionSplit::binary(amount, contract.has_started(now)),
            FeeStrategy::SplitStartEnd => {
                let half = amount / Decimal::TWO;
                CommissionSplit::binary(half, contract.has_started(now))
                    + CommissionSplit::binary(amount - half, contract.has_ended(now))
            }
        }
    }

    fn monthly_component(contract: &Contract, now: DateTime<Utc>) -> CommissionSplit {
        let value = contract.value;

        if !contract.has_started(now) {
            return CommissionSplit::all_receivable(value);
        }
        if contract.has_ended(now) {
            return CommissionSplit::all_received(value);
        }

        let months = inclusive_month_span(contract.supply_start, contract.supply_end).max(1);
        let elapsed = inclusive_month_span(contract.supply_start, now).min(months);
        let received = value / Decimal::from(months) * Decimal::from(elapsed);

        CommissionSplit::new(received, value - received)
    }
}
