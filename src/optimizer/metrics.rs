use serde::Serialize;

use crate::config::MetricsConfig;

/// Metrics derived from a solved operating point. Pure computation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DerivedMetrics {
    /// Squared supply/demand gap, MW².
    pub losses_mw2: f64,
    /// 0-100, decreasing in losses relative to supply.
    pub efficiency_percent: f64,
    /// Currency units, relative to the configured baseline loss.
    pub cost_savings: f64,
    /// 0 when losses meet or exceed the baseline; no negative improvement.
    pub loss_reduction_percent: f64,
}

pub fn derive_metrics(
    optimized_supply_mw: f64,
    optimized_demand_mw: f64,
    cfg: &MetricsConfig,
) -> DerivedMetrics {
    let losses_mw2 = (optimized_supply_mw - optimized_demand_mw).powi(2);

    let efficiency_percent = if optimized_supply_mw > 0.0 {
        (100.0 * (1.0 - losses_mw2 / optimized_supply_mw)).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let avoided_mw2 = (cfg.baseline_losses_mw2 - losses_mw2).max(0.0);
    let loss_reduction_percent = if cfg.baseline_losses_mw2 > 0.0 {
        (avoided_mw2 / cfg.baseline_losses_mw2) * 100.0
    } else {
        0.0
    };
    let cost_savings = avoided_mw2 * cfg.cost_per_mw2;

    DerivedMetrics {
        losses_mw2,
        efficiency_percent,
        cost_savings,
        loss_reduction_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cfg() -> MetricsConfig {
        MetricsConfig::default()
    }

    #[test]
    fn balanced_point_is_fully_efficient() {
        let m = derive_metrics(1000.0, 1000.0, &cfg());
        assert_eq!(m.losses_mw2, 0.0);
        assert_eq!(m.efficiency_percent, 100.0);
        assert_eq!(m.loss_reduction_percent, 100.0);
        assert_eq!(m.cost_savings, 25_000.0);
    }

    #[test]
    fn losses_are_squared_gap() {
        let m = derive_metrics(1010.0, 1000.0, &cfg());
        assert!((m.losses_mw2 - 100.0).abs() < 1e-9);
        // 100.0 * (1 - 100/1010) ~= 90.1%
        assert!((m.efficiency_percent - 90.0990099).abs() < 1e-4);
    }

    #[test]
    fn efficiency_clamps_to_zero_for_huge_gaps() {
        // Gap of 200 MW against 210 MW supply: losses dwarf supply.
        let m = derive_metrics(210.0, 10.0, &cfg());
        assert_eq!(m.efficiency_percent, 0.0);
    }

    #[test]
    fn zero_supply_reports_zero_efficiency() {
        let m = derive_metrics(0.0, 0.0, &cfg());
        assert_eq!(m.efficiency_percent, 0.0);
        assert_eq!(m.losses_mw2, 0.0);
    }

    #[test]
    fn no_negative_improvement_when_losses_exceed_baseline() {
        let config = MetricsConfig {
            baseline_losses_mw2: 50.0,
            ..MetricsConfig::default()
        };
        let m = derive_metrics(1020.0, 1000.0, &config); // losses 400 > baseline 50
        assert_eq!(m.loss_reduction_percent, 0.0);
        assert_eq!(m.cost_savings, 0.0);
    }

    #[test]
    fn savings_scale_linearly_with_avoided_losses() {
        let config = MetricsConfig {
            baseline_losses_mw2: 100.0,
            cost_per_mw2: 3.0,
            ..MetricsConfig::default()
        };
        let m = derive_metrics(1005.0, 1000.0, &config); // losses 25, avoided 75
        assert!((m.cost_savings - 225.0).abs() < 1e-9);
        assert!((m.loss_reduction_percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_baseline_yields_no_reduction() {
        let config = MetricsConfig {
            baseline_losses_mw2: 0.0,
            ..MetricsConfig::default()
        };
        let m = derive_metrics(1000.0, 1000.0, &config);
        assert_eq!(m.loss_reduction_percent, 0.0);
        assert_eq!(m.cost_savings, 0.0);
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_operating_point(
            supply in -10_000.0..10_000.0_f64,
            demand in -10_000.0..10_000.0_f64,
        ) {
            let m = derive_metrics(supply, demand, &cfg());
            prop_assert!(m.losses_mw2 >= 0.0);
            prop_assert!((0.0..=100.0).contains(&m.efficiency_percent));
            prop_assert!((0.0..=100.0).contains(&m.loss_reduction_percent));
            prop_assert!(m.cost_savings >= 0.0);
        }
    }
}
