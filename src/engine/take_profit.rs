//! Five-tranche take-profit schedule.
//!
//! tp1 either recovers the excess exposure or the remainder of the current cycle;
//! tp2..tp5 each sell half of what is left, priced so that the tranche brings back
//! one full cycle (`recup_tp_x`). Sell prices carry the platform fee.

use crate::domain::{Decimal, Platform};

/// Share of the remaining balance sold by each tranche.
pub fn factor_sell_shad() -> Decimal {
    Decimal::scaled(5, 1)
}

pub const TAKE_PROFIT_COUNT: usize = 5;

/// Amount/price of one tranche; `None` when an input needed for it is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TakeProfitTarget {
    pub amount: Option<Decimal>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct TakeProfitInput<'a> {
    pub recup_tp1: Decimal,
    /// Units currently held.
    pub balance: Decimal,
    pub total_shad: i64,
    pub recup_tp_x: Decimal,
    pub average_entry_price: Option<Decimal>,
    pub max_exposition: Decimal,
    pub platform: &'a Platform,
}

/// Inputs are not validated; unknown values propagate as `None` tranches.
pub fn allocate_take_profits(input: &TakeProfitInput<'_>) -> [TakeProfitTarget; TAKE_PROFIT_COUNT] {
    let fee = input.platform.exchange().fee_multiplier();
    let half = factor_sell_shad();
    let mut targets = [TakeProfitTarget::default(); TAKE_PROFIT_COUNT];

    targets[0] = if input.total_shad > -1 {
        let amount = input
            .recup_tp1
            .checked_div(input.recup_tp_x)
            .map(|share| half * share * input.balance);
        let price = amount
            .and_then(|a| input.recup_tp1.checked_div(a))
            .map(|p| p * fee);
        TakeProfitTarget { amount, price }
    } else {
        // Sell down to the units that cover the capped exposure at entry price.
        let amount = input
            .average_entry_price
            .and_then(|avg| input.max_exposition.checked_div(avg))
            .map(|kept| input.balance - kept);
        let price = input.average_entry_price.map(|avg| avg * fee);
        TakeProfitTarget { amount, price }
    };

    let mut remaining = targets[0].amount.map(|a| input.balance - a);
    for target in targets.iter_mut().skip(1) {
        let amount = remaining.map(|r| half * r);
        let price = amount
            .and_then(|a| input.recup_tp_x.checked_div(a))
            .map(|p| p * fee);
        remaining = remaining.zip(amount).map(|(r, a)| r - a);
        *target = TakeProfitTarget { amount, price };
    }

    targets
}
