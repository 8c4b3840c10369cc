use std::iter::Sum;
use std::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Commission already earned vs still owed at a given instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSplit {
    #[serde(rename = "comissoesRecebidas")]
    pub received: Decimal,
    #[serde(rename = "comissoesAReceber")]
    pub receivable: Decimal,
}

impl CommissionSplit {
    pub fn new(received: Decimal, receivable: Decimal) -> Self {
        Self { received, receivable }
    }

    pub fn all_received(amount: Decimal) -> Self {
        Self::new(amount, Decimal::ZERO)
    }

    pub fn all_receivable(amount: Decimal) -> Self {
        Self::new(Decimal::ZERO, amount)
    }

    /// Whole amount on one side of `due`
    pub fn binary(amount: Decimal, due: bool) -> Self {
        if due {
            Self::all_received(amount)
        } else {
            Self::all_receivable(amount)
        }
    }

    pub fn total(&self) -> Decimal {
        self.received + self.receivable
    }
}

impl Add for CommissionSplit {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.received + other.received, self.receivable + other.receivable)
    }
}

impl AddAssign for CommissionSplit {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for CommissionSplit {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Per-component proration of one or more contracts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBreakdown {
    pub fee: CommissionSplit,
    #[serde(rename = "unipay")]
    pub one_time: CommissionSplit,
    #[serde(rename = "monPay")]
    pub monthly: CommissionSplit,
}

impl CommissionBreakdown {
    /// Sum of every component
    pub fn total(&self) -> CommissionSplit {
        self.fee + self.one_time + self.monthly
    }
}

impl Add for CommissionBreakdown {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            fee: self.fee + other.fee,
            one_time: self.one_time + other.one_time,
            monthly: self.monthly + other.monthly,
        }
    }
}

impl Sum for CommissionBreakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Commission dashboard for one consultant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionSummary {
    #[serde(rename = "consultorId")]
    pub consultant_id: i64,
    #[serde(rename = "contratosFechados")]
    pub contract_count: usize,
    /// Component proration summed over every contract
    #[serde(rename = "totais")]
    pub totals: CommissionSplit,
    #[serde(rename = "detalhamento")]
    pub breakdown: CommissionBreakdown,
    /// Whole contract value settled at supply start or end
    #[serde(rename = "comissaoRecebida")]
    pub settled: Decimal,
    #[serde(rename = "comissaoAReceber")]
    pub outstanding: Decimal,
}
