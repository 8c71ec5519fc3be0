//! Portfolio summary over a listing of opportunities

use crate::Opportunity;
use serde::Serialize;

/// Totals printed under an opportunity listing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PortfolioSummary {
    /// Number of opportunities
    pub count: usize,

    /// Sum of amounts; a missing amount counts as zero
    pub total_amount: f64,

    /// Opportunities whose stage name contains "won"
    pub won: usize,

    /// Opportunities whose stage name contains "lost"
    pub lost: usize,

    /// Everything else
    pub other: usize,
}

impl PortfolioSummary {
    /// Summarize a listing
    ///
    /// # Examples
    ///
    /// ```
    /// use dealscan_domain::{Opportunity, PortfolioSummary};
    ///
    /// let mut opp = Opportunity::new("006A", "Deal", "Closed Won");
    /// opp.amount = Some(1200.0);
    /// let summary = PortfolioSummary::from_opportunities(&[opp]);
    /// assert_eq!(summary.won, 1);
    /// assert_eq!(summary.total_amount, 1200.0);
    /// ```
    pub fn from_opportunities(opportunities: &[Opportunity]) -> Self {
        let mut summary = Self {
            count: opportunities.len(),
            ..Self::default()
        };

        for opp in opportunities {
            summary.total_amount += opp.amount.unwrap_or(0.0);

            let stage = opp.stage_name.to_lowercase();
            if stage.contains("won") {
                summary.won += 1;
            } else if stage.contains("lost") {
                summary.lost += 1;
            } else {
                summary.other += 1;
            }
        }

        summary
    }
}
