//! Recovery state of a position under its take-profit strategy.
//!
//! Capital above the configured exposure is recovered first; once it is back, every
//! further sell counts toward the next full cycle of `recup_tp_x`.

use crate::domain::{Decimal, Platform, Strategy, StrategyName, Symbol};

/// Relative tolerance applied to every cycle threshold.
pub fn error_allowed() -> Decimal {
    Decimal::scaled(5, 2)
}

/// Smallest exposure and smallest recovery target considered meaningful.
pub fn min_exposition() -> Decimal {
    Decimal::scaled(505, 2)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub strat: StrategyName,
    /// Exposure configured for the platform.
    pub strat_expo: Decimal,
    /// Capital considered at risk.
    pub max_exposition: Decimal,
    pub ratio_shad: Decimal,
    /// Recovery target of one full take-profit cycle.
    pub recup_tp_x: Decimal,
    /// Principal recovered beyond the excess exposure.
    pub recup_shad: Decimal,
    /// Amount still to recover before the next take-profit fires.
    pub recup_tp1: Decimal,
    /// Completed cycles; -1 while the excess exposure is not yet recovered.
    pub total_shad: i64,
}

pub fn calculate_recovery(
    asset: &Symbol,
    platform: &Platform,
    total_buy: Decimal,
    total_sell: Decimal,
    strategy: Option<&Strategy>,
) -> Recovery {
    let (strat, strat_expo) = match strategy {
        Some(s) => (s.strategy_for(platform), s.max_exposure_for(platform)),
        None => (
            StrategyName::NoStrategy,
            Decimal::from(crate::domain::DEFAULT_MAX_EXPOSURE),
        ),
    };

    let tolerance = Decimal::one() - error_allowed();
    let max_exposition = min_exposition().max(total_buy.min(strat_expo));
    let ratio_shad = strat.ratio();
    let excess = total_buy - max_exposition;

    let recup_shad = if !total_sell.is_positive() {
        Decimal::zero()
    } else if max_exposition < total_buy && total_sell < excess {
        Decimal::zero()
    } else {
        total_sell - excess
    };

    let recup_tp_x = (max_exposition * ratio_shad * Decimal::scaled(5, 1)).round_dp(2);

    let total_shad = if max_exposition < tolerance * total_buy && total_sell < tolerance * excess
    {
        -1
    } else if recup_shad >= tolerance * recup_tp_x {
        let cycles = recup_shad
            .checked_div(recup_tp_x)
            .map(|ratio| Decimal::one() + error_allowed() + ratio)
            .and_then(|x| x.round_to_i64())
            .unwrap_or(1);
        cycles - 1
    } else {
        0
    };

    let shad = Decimal::from(total_shad);
    let next = Decimal::from(total_shad + 1);
    let mut recup_tp1 = if max_exposition < total_buy {
        if total_sell < excess {
            excess - total_sell
        } else {
            (total_sell - excess)
                .checked_div(max_exposition)
                .map(|cycles| cycles.fract() * max_exposition)
                .unwrap_or(recup_tp_x)
        }
    } else if next * total_buy > total_sell && shad * total_buy < tolerance * total_sell {
        recup_tp_x - next * total_buy - total_sell
    } else {
        recup_tp_x
    };
    if recup_tp1 <= min_exposition() {
        recup_tp1 = recup_tp_x;
    }

    tracing::debug!(
        "Recovery {}@{}: buy={} sell={} expo={} tpx={} shad={} tp1={}",
        asset,
        platform,
        total_buy,
        total_sell,
        max_exposition,
        recup_tp_x,
        total_shad,
        recup_tp1
    );

    Recovery {
        strat,
        strat_expo,
        max_exposition,
        ratio_shad,
        recup_tp_x,
        recup_shad,
        recup_tp1,
        total_shad,
    }
}
