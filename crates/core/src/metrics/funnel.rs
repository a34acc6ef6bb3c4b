use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{percentage, BucketTotal};
use crate::domain::deal::Deal;
use crate::domain::stage::{Stage, PIPELINE_STAGES};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunnelStage {
    pub stage: Stage,
    pub count: usize,
    pub value: Decimal,
    pub weighted_value: Decimal,
    /// Deals currently in this stage or past it on the way to won.
    pub reached: usize,
    /// `reached` as a share of the previous stage's `reached`. `None` for the
    /// first stage and for lost.
    pub pass_through_rate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunnelReport {
    pub stages: Vec<FunnelStage>,
    /// Deals whose stage label could not be mapped to a pipeline stage.
    pub unrecognized: BucketTotal,
}

/// Pipeline funnel in canonical stage order.
///
/// Every deal entered as a lead, so lost deals count toward the lead stage's
/// `reached` only. Unrecognized stages are reported separately and do not
/// contribute to pass-through rates.
pub fn pipeline_funnel(deals: &[Deal]) -> FunnelReport {
    let mut stages: Vec<FunnelStage> = PIPELINE_STAGES
        .iter()
        .map(|stage| FunnelStage {
            stage: stage.clone(),
            count: 0,
            value: Decimal::ZERO,
            weighted_value: Decimal::ZERO,
            reached: 0,
            pass_through_rate: None,
        })
        .collect();
    let mut unrecognized = BucketTotal::default();

    for deal in deals {
        match stages.iter_mut().find(|row| row.stage == deal.stage) {
            Some(row) => {
                row.count += 1;
                row.value = row.value.saturating_add(deal.value);
                row.weighted_value = row.weighted_value.saturating_add(deal.weighted_value());
            }
            None => unrecognized.add(deal.value),
        }
    }

    let progression =
        stages.iter().position(|row| row.stage == Stage::Lost).unwrap_or(stages.len());
    let lost_count = stages.get(progression).map(|row| row.count).unwrap_or(0);

    let mut running = 0;
    for index in (0..progression).rev() {
        running += stages[index].count;
        stages[index].reached = running;
    }
    if let Some(lead) = stages.first_mut() {
        lead.reached += lost_count;
    }
    if let Some(lost) = stages.get_mut(progression) {
        lost.reached = lost.count;
    }

    for index in 1..progression {
        let previous = stages[index - 1].reached;
        stages[index].pass_through_rate = Some(percentage(stages[index].reached, previous));
    }

    FunnelReport { stages, unrecognized }
}
