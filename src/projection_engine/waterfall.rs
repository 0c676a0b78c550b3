//! Margin radar: P&L waterfall from revenue down to net profit.

use serde::Serialize;

use crate::config::PnlBaseline;

/// How a bar contributes to the running total.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BarMeasure {
    /// Adds its (signed) amount to the running total.
    Relative,
    /// Shows the running total at this point.
    Total,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WaterfallBar {
    pub label: &'static str,
    pub measure: BarMeasure,
    /// Signed amount for relative bars, the running total for total bars.
    pub amount: f64,
    pub running_total: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarginWaterfall {
    pub bars: Vec<WaterfallBar>,
    pub gross_profit: f64,
    pub gross_margin_pct: f64,
    pub net_profit: f64,
    pub net_margin_pct: f64,
}

/// Build the revenue → gross profit → net profit waterfall.
pub fn build_waterfall(pnl: &PnlBaseline) -> MarginWaterfall {
    let steps: [(&'static str, BarMeasure, f64); 7] = [
        ("Net Revenue", BarMeasure::Relative, pnl.revenue),
        ("Raw Material", BarMeasure::Relative, -pnl.raw_material),
        ("Power & Fuel", BarMeasure::Relative, -pnl.power_fuel),
        ("Gross Profit", BarMeasure::Total, 0.0),
        ("Distribution", BarMeasure::Relative, -pnl.distribution),
        ("Fixed Costs", BarMeasure::Relative, -pnl.fixed_costs),
        ("Net Profit", BarMeasure::Total, 0.0),
    ];

    let mut running_total = 0.0;
    let bars: Vec<WaterfallBar> = steps
        .into_iter()
        .map(|(label, measure, amount)| {
            let amount = match measure {
                BarMeasure::Relative => {
                    running_total += amount;
                    amount
                }
                BarMeasure::Total => running_total,
            };
            WaterfallBar {
                label,
                measure,
                amount,
                running_total,
            }
        })
        .collect();

    let gross_profit = pnl.revenue - pnl.raw_material - pnl.power_fuel;
    let net_profit = gross_profit - pnl.distribution - pnl.fixed_costs;

    MarginWaterfall {
        bars,
        gross_profit,
        gross_margin_pct: gross_profit / pnl.revenue * 100.0,
        net_profit,
        net_margin_pct: net_profit / pnl.revenue * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pilot_waterfall() {
        let w = build_waterfall(&PnlBaseline::default());
        assert_eq!(w.bars.len(), 7);
        assert_eq!(w.gross_profit, 1_972.0);
        assert!((w.gross_margin_pct - 23.2).abs() < 0.01);
        assert_eq!(w.net_profit, 572.0);

        let gross = &w.bars[3];
        assert_eq!(gross.measure, BarMeasure::Total);
        assert_eq!(gross.amount, 1_972.0);

        let last = w.bars.last().expect("net profit bar");
        assert_eq!(last.label, "Net Profit");
        assert_eq!(last.running_total, w.net_profit);
    }
}
