use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ComponentScores, RepPerformance, ScoreCalculator};
use crate::config::AnalyticsThresholds;
use crate::domain::deal::Deal;
use crate::domain::snapshot::Snapshot;
use crate::domain::stage::StageBucket;
use crate::metrics::{to_f64, UNASSIGNED_OWNER_KEY};

/// Calendar months covered by each leaderboard trend series.
pub const TREND_MONTHS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    TopPerformer,
    Podium,
    Sharpshooter,
    BigHitter,
    OnFire,
}

impl Badge {
    pub fn key(&self) -> &'static str {
        match self {
            Self::TopPerformer => "badge.top_performer",
            Self::Podium => "badge.podium",
            Self::Sharpshooter => "badge.sharpshooter",
            Self::BigHitter => "badge.big_hitter",
            Self::OnFire => "badge.on_fire",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub owner_key: String,
    pub name: String,
    pub revenue: Decimal,
    /// Share of the team's won revenue, in percent.
    pub revenue_share: f64,
    pub win_rate: f64,
    pub deal_count: usize,
    pub won_count: usize,
    pub components: ComponentScores,
    pub score: f64,
    pub streak: u32,
    pub trend: Vec<MonthlyPoint>,
    pub badges: Vec<Badge>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub rep_count: usize,
    pub deal_count: usize,
    pub won_count: usize,
    pub revenue: Decimal,
    pub win_rate: f64,
}

pub fn team_totals(deals: &[Deal]) -> TeamTotals {
    let performance = RepPerformance::from_deals(deals);
    let mut owners: Vec<&str> = deals.iter().map(owner_key).collect();
    owners.sort_unstable();
    owners.dedup();

    TeamTotals {
        rep_count: owners.len(),
        deal_count: performance.deal_count,
        won_count: performance.won_count,
        revenue: performance.revenue,
        win_rate: performance.win_rate,
    }
}

/// Ranks every deal owner by composite score, best first, cut to the leaderboard limit.
///
/// Equal scores fall back to revenue (descending) and then name (ascending).
pub fn build_leaderboard(
    snapshot: &Snapshot,
    thresholds: &AnalyticsThresholds,
) -> Vec<LeaderboardEntry> {
    let calculator = ScoreCalculator::new(thresholds);
    let team = team_totals(&snapshot.deals);

    let mut by_owner: BTreeMap<&str, Vec<&Deal>> = BTreeMap::new();
    for deal in &snapshot.deals {
        by_owner.entry(owner_key(deal)).or_default().push(deal);
    }

    let mut entries: Vec<LeaderboardEntry> = by_owner
        .into_iter()
        .map(|(key, deals)| {
            let performance = RepPerformance::from_deals(deals.iter().copied());
            let (components, score) = calculator.score(&performance);
            let name = snapshot.user_name(deals.first().and_then(|deal| deal.owner_id.as_ref()));

            LeaderboardEntry {
                rank: 0,
                owner_key: key.to_string(),
                name,
                revenue: performance.revenue,
                revenue_share: share(performance.revenue, team.revenue),
                win_rate: performance.win_rate,
                deal_count: performance.deal_count,
                won_count: performance.won_count,
                components,
                score,
                streak: win_streak(&deals),
                trend: monthly_trend(&deals, snapshot.as_of),
                badges: Vec::new(),
            }
        })
        .collect();

    entries.sort_by(compare_entries);
    entries.truncate(thresholds.leaderboard_limit);

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
        entry.badges = badges_for(entry, thresholds);
    }

    entries
}

fn owner_key(deal: &Deal) -> &str {
    deal.owner_id.as_ref().map(|id| id.0.as_str()).unwrap_or(UNASSIGNED_OWNER_KEY)
}

fn share(part: Decimal, whole: Decimal) -> f64 {
    if whole <= Decimal::ZERO {
        return 0.0;
    }
    to_f64(part / whole) * 100.0
}

fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.revenue.cmp(&a.revenue))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.owner_key.cmp(&b.owner_key))
}

fn badges_for(entry: &LeaderboardEntry, thresholds: &AnalyticsThresholds) -> Vec<Badge> {
    let mut badges = Vec::new();
    match entry.rank {
        1 => badges.push(Badge::TopPerformer),
        2 | 3 => badges.push(Badge::Podium),
        _ => {}
    }
    if entry.win_rate > thresholds.badge_win_rate_above {
        badges.push(Badge::Sharpshooter);
    }
    if entry.revenue > thresholds.badge_revenue_above {
        badges.push(Badge::BigHitter);
    }
    if entry.streak > thresholds.badge_streak_above {
        badges.push(Badge::OnFire);
    }
    badges
}

fn close_date(deal: &Deal) -> DateTime<Utc> {
    deal.closed_at.or(deal.stage_entered_at).unwrap_or(deal.created_at)
}

/// Consecutive wins counted back from the most recently closed deal.
fn win_streak(deals: &[&Deal]) -> u32 {
    let mut closed: Vec<&Deal> =
        deals.iter().copied().filter(|deal| deal.bucket() != StageBucket::Open).collect();
    closed.sort_by(|a, b| close_date(b).cmp(&close_date(a)).then_with(|| a.id.cmp(&b.id)));

    closed.iter().take_while(|deal| deal.bucket() == StageBucket::Won).count() as u32
}

/// Won revenue per calendar month for the months ending at `as_of`, oldest first.
fn monthly_trend(deals: &[&Deal], as_of: DateTime<Utc>) -> Vec<MonthlyPoint> {
    let current = month_index(as_of);
    let first = current - (TREND_MONTHS as i32 - 1);
    let mut buckets = vec![Decimal::ZERO; TREND_MONTHS];

    for deal in deals.iter().filter(|deal| deal.bucket() == StageBucket::Won) {
        let index = month_index(close_date(deal));
        if (first..=current).contains(&index) {
            let bucket = &mut buckets[(index - first) as usize];
            *bucket = bucket.saturating_add(deal.value);
        }
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(offset, revenue)| {
            let index = first + offset as i32;
            MonthlyPoint {
                month: format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1),
                revenue,
            }
        })
        .collect()
}

fn month_index(date: DateTime<Utc>) -> i32 {
    date.year() * 12 + date.month0() as i32
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{build_leaderboard, team_totals, Badge, TREND_MONTHS};
    use crate::config::AnalyticsThresholds;
    use crate::domain::snapshot::Snapshot;
    use crate::domain::stage::Stage;
    use crate::fixtures::{as_of, deal, user};

    fn snapshot() -> Snapshot {
        let mut deals = Vec::new();
        // Ada: 5 straight wins, 4.0M revenue
        for index in 0..5 {
            deals.push(
                deal(&format!("a{index}"))
                    .owner("ada")
                    .stage(Stage::Won)
                    .value(800_000)
                    .closed_days_ago(index * 10)
                    .build(),
            );
        }
        // Bora: 1 win out of 4, older loss streak
        deals.push(
            deal("b1").owner("bora").stage(Stage::Won).value(200_000).closed_days_ago(5).build(),
        );
        deals.push(deal("b2").owner("bora").stage(Stage::Lost).closed_days_ago(40).build());
        deals.push(deal("b3").owner("bora").stage(Stage::Proposal).build());
        deals.push(deal("b4").owner("bora").stage(Stage::Lost).closed_days_ago(60).build());
        // Unassigned open deal
        deals.push(deal("x1").stage(Stage::Lead).build());

        Snapshot::new(as_of())
            .with_deals(deals)
            .with_users(vec![user("ada", "Ada"), user("bora", "Bora")])
    }

    #[test]
    fn ranks_by_composite_and_assigns_badges() {
        let thresholds = AnalyticsThresholds::default();
        let board = build_leaderboard(&snapshot(), &thresholds);

        assert_eq!(board.len(), 3);
        assert_eq!(board[0].name, "Ada");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].streak, 5);
        assert_eq!(
            board[0].badges,
            vec![Badge::TopPerformer, Badge::Sharpshooter, Badge::BigHitter, Badge::OnFire]
        );

        assert_eq!(board[1].name, "Bora");
        assert_eq!(board[1].streak, 1);
        assert_eq!(board[1].badges, vec![Badge::Podium]);
        assert_eq!(board[1].win_rate, 25.0);

        assert_eq!(board[2].name, "unknown");
        assert_eq!(board[2].score, 0.0);
        assert!(board.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn revenue_share_and_trend_cover_the_team() {
        let board = build_leaderboard(&snapshot(), &AnalyticsThresholds::default());
        let ada = &board[0];

        assert!((ada.revenue_share - 4_000_000.0 / 4_200_000.0 * 100.0).abs() < 1e-6);
        assert_eq!(ada.trend.len(), TREND_MONTHS);
        assert_eq!(ada.trend.last().map(|point| point.month.as_str()), Some("2024-06"));
        assert_eq!(ada.trend.first().map(|point| point.month.as_str()), Some("2024-01"));
        let trend_total: Decimal = ada.trend.iter().map(|point| point.revenue).sum();
        assert_eq!(trend_total, Decimal::from(4_000_000));
    }

    #[test]
    fn limit_truncates_and_ranks_stay_contiguous() {
        let thresholds = AnalyticsThresholds { leaderboard_limit: 2, ..Default::default() };
        let board = build_leaderboard(&snapshot(), &thresholds);

        assert_eq!(board.len(), 2);
        assert_eq!(board.iter().map(|entry| entry.rank).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn empty_snapshot_has_empty_board_and_zero_team() {
        let snapshot = Snapshot::new(as_of());
        assert!(build_leaderboard(&snapshot, &AnalyticsThresholds::default()).is_empty());

        let team = team_totals(&snapshot.deals);
        assert_eq!(team.rep_count, 0);
        assert_eq!(team.win_rate, 0.0);
    }

    #[test]
    fn team_totals_count_distinct_owners() {
        let team = team_totals(&snapshot().deals);
        assert_eq!(team.rep_count, 3);
        assert_eq!(team.deal_count, 10);
        assert_eq!(team.won_count, 6);
        assert_eq!(team.revenue, Decimal::from(4_200_000));
    }
}
