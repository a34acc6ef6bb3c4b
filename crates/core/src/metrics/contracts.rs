use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::contract::{Contract, RiskLevel};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub contract_count: usize,
    pub total_value: Decimal,
    pub renewals_due: usize,
    pub renewals_due_value: Decimal,
    pub high_risk: usize,
    pub overdue_installments: usize,
    pub overdue_amount: Decimal,
}

pub fn contract_summary(
    contracts: &[Contract],
    as_of: DateTime<Utc>,
    renewal_window_days: i64,
) -> ContractSummary {
    let mut summary = ContractSummary::default();

    for contract in contracts {
        summary.contract_count += 1;
        summary.total_value = summary.total_value.saturating_add(contract.value);

        if contract.renews_within(as_of, renewal_window_days) {
            summary.renewals_due += 1;
            summary.renewals_due_value = summary.renewals_due_value.saturating_add(contract.value);
        }
        if contract.risk == RiskLevel::High {
            summary.high_risk += 1;
        }
        for installment in contract.installments.iter().filter(|item| item.is_overdue(as_of)) {
            summary.overdue_installments += 1;
            summary.overdue_amount = summary.overdue_amount.saturating_add(installment.amount);
        }
    }

    summary
}
