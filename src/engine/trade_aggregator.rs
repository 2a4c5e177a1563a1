//! Fee-adjusted buy/sell totals per asset.

use crate::domain::{Decimal, Side, Symbol, Trade};

/// Aggregate of every buy fill of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuyTotals {
    /// Units acquired.
    pub total_amount: Decimal,
    /// USD spent including fees.
    pub total_buy: Decimal,
    /// `total_buy / total_amount`; `None` when nothing was bought.
    pub average_entry_price: Option<Decimal>,
}

/// Fee of a fill expressed in its quote currency.
///
/// A fee paid in the quote is used as is (floored at zero). A fee paid in another
/// coin is converted with the fill price, and counts as zero when either is not positive.
pub fn fee_in_quote(trade: &Trade) -> Decimal {
    if trade.feecoin == trade.quote {
        trade.fee.max(Decimal::zero())
    } else if trade.price.is_positive() && trade.fee.is_positive() {
        trade.fee * trade.price
    } else {
        Decimal::zero()
    }
}

fn trades_of<'a>(
    symbol: &'a Symbol,
    side: Side,
    trades: &'a [Trade],
) -> impl Iterator<Item = &'a Trade> + 'a {
    trades
        .iter()
        .filter(move |t| &t.base == symbol && t.side == side)
}

pub fn get_total_amount_and_buy(symbol: &Symbol, trades: &[Trade]) -> BuyTotals {
    let mut totals = BuyTotals::default();

    for trade in trades_of(symbol, Side::Buy, trades) {
        totals.total_buy += trade.total_usdt + fee_in_quote(trade);
        totals.total_amount += trade.amount.max(Decimal::zero());
    }

    totals.average_entry_price = totals.total_buy.checked_div(totals.total_amount);
    totals
}

/// USD proceeds of every sell fill, net of fees.
pub fn get_total_sell(symbol: &Symbol, trades: &[Trade]) -> Decimal {
    trades_of(symbol, Side::Sell, trades)
        .map(|trade| trade.total_usdt - fee_in_quote(trade))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConversionRates, Platform, TimeMs};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn trade(base: &str, side: Side, price: &str, amount: &str, fee: &str, feecoin: &str) -> Trade {
        Trade::new(
            TimeMs::new(1000),
            Platform::new("binance"),
            Symbol::new(base),
            Symbol::new("USDT"),
            side,
            d(price),
            d(amount),
            d(fee),
            Symbol::new(feecoin),
            &ConversionRates::new(),
        )
    }

    #[test]
    fn test_single_buy_without_fee() {
        let trades = vec![trade("ETH", Side::Buy, "100", "1", "0", "USDT")];
        let totals = get_total_amount_and_buy(&Symbol::new("ETH"), &trades);
        assert_eq!(totals.total_amount, d("1"));
        assert_eq!(totals.total_buy, d("100"));
        assert_eq!(totals.average_entry_price, Some(d("100")));
    }

    #[test]
    fn test_fee_in_quote_is_added() {
        let trades = vec![trade("ETH", Side::Buy, "100", "1", "1", "USDT")];
        let totals = get_total_amount_and_buy(&Symbol::new("ETH"), &trades);
        assert_eq!(totals.total_buy, d("101"));
    }

    #[test]
    fn test_fee_in_other_coin_converted_with_price() {
        let trades = vec![trade("ETH", Side::Buy, "50", "2", "1", "ETH")];
        let totals = get_total_amount_and_buy(&Symbol::new("ETH"), &trades);
        assert_eq!(totals.total_buy, d("150"));
        assert_eq!(totals.average_entry_price, Some(d("75")));
    }

    #[test]
    fn test_negative_quote_fee_floored() {
        let t = trade("ETH", Side::Buy, "100", "1", "-3", "USDT");
        assert_eq!(fee_in_quote(&t), Decimal::zero());
    }

    #[test]
    fn test_weighted_average_across_buys() {
        let trades = vec![
            trade("ETH", Side::Buy, "100", "1", "0", "USDT"),
            trade("ETH", Side::Buy, "200", "3", "0", "USDT"),
            trade("BTC", Side::Buy, "50000", "1", "0", "USDT"),
            trade("ETH", Side::Sell, "300", "1", "0", "USDT"),
        ];
        let totals = get_total_amount_and_buy(&Symbol::new("ETH"), &trades);
        assert_eq!(totals.total_amount, d("4"));
        assert_eq!(totals.total_buy, d("700"));
        assert_eq!(totals.average_entry_price, Some(d("175")));
    }

    #[test]
    fn test_no_buys_means_no_position() {
        let trades = vec![trade("ETH", Side::Sell, "300", "1", "0", "USDT")];
        let totals = get_total_amount_and_buy(&Symbol::new("ETH"), &trades);
        assert_eq!(totals.total_amount, Decimal::zero());
        assert_eq!(totals.average_entry_price, None);
    }

    #[test]
    fn test_total_sell_subtracts_fees() {
        let trades = vec![
            trade("ETH", Side::Sell, "300", "1", "1", "USDT"),
            trade("ETH", Side::Sell, "400", "1", "0.001", "BNB"),
            trade("ETH", Side::Buy, "100", "5", "0", "USDT"),
        ];
        assert_eq!(get_total_sell(&Symbol::new("ETH"), &trades), d("698.6"));
    }
}
