//! Joins snapshots for one asset/platform pair into its metrics record.

use crate::domain::{
    Asset, AssetTag, CmcData, Decimal, LiveData, MarketCap, OpenOrder, OpenOrdersData, Platform,
    Side, StratData, Strategy, Symbol, TakeProfit, TakeProfits, Ticker, Trade, TradeData,
};
use crate::engine::recovery::calculate_recovery;
use crate::engine::tags::tags_for;
use crate::engine::take_profit::{
    allocate_take_profits, TakeProfitInput, TakeProfitTarget, TAKE_PROFIT_COUNT,
};
use crate::engine::trade_aggregator::{get_total_amount_and_buy, get_total_sell};

/// Relative tolerance used to recognise an open order as a placed tranche.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMatchTolerance {
    pub amount_rel: Decimal,
    pub price_rel: Decimal,
}

impl Default for OrderMatchTolerance {
    fn default() -> Self {
        Self {
            amount_rel: Decimal::scaled(1, 2),
            price_rel: Decimal::scaled(1, 2),
        }
    }
}

fn within(actual: Decimal, target: Decimal, rel: Decimal) -> bool {
    (actual - target).abs() <= rel * target.abs()
}

impl OrderMatchTolerance {
    pub fn matches(&self, order: &OpenOrder, target: &TakeProfitTarget) -> bool {
        match (target.amount, target.price) {
            (Some(amount), Some(price)) => {
                within(order.amount, amount, self.amount_rel)
                    && within(order.price, price, self.price_rel)
            }
            _ => false,
        }
    }
}

/// Snapshots relevant to one asset on one platform.
#[derive(Debug, Clone, Copy)]
pub struct AssetInputs<'a> {
    pub base: &'a Symbol,
    pub platform: &'a Platform,
    pub balance: Decimal,
    pub market_cap: Option<&'a MarketCap>,
    pub trades: &'a [Trade],
    pub open_orders: &'a [OpenOrder],
    pub strategy: Option<&'a Strategy>,
    pub tickers: &'a [Ticker],
}

/// Live `BASE/USDT` price on the platform, else the reference price for stablecoins, else zero.
pub fn resolve_current_price(
    base: &Symbol,
    platform: &Platform,
    tickers: &[Ticker],
    market_cap: Option<&MarketCap>,
) -> Decimal {
    let pair = base.usdt_pair();
    let live = tickers
        .iter()
        .find(|t| &t.platform == platform && t.symbol.eq_ignore_ascii_case(&pair))
        .map(|t| t.last);

    live.or_else(|| {
        if crate::engine::tags::is_stablecoin(base) {
            market_cap.map(|cap| cap.price)
        } else {
            None
        }
    })
    .unwrap_or_default()
}

/// One flag per tranche: 1 when an open sell order already covers it.
pub fn order_status(
    targets: &[TakeProfitTarget; TAKE_PROFIT_COUNT],
    sell_orders: &[OpenOrder],
    tolerance: &OrderMatchTolerance,
) -> [u8; TAKE_PROFIT_COUNT] {
    (*targets).map(|target| {
        let placed = sell_orders
            .iter()
            .any(|order| order.side == Side::Sell && tolerance.matches(order, &target));
        u8::from(placed)
    })
}

/// Percent the price must rise to reach `target_price`.
pub fn percent_to_target(
    current_price: Option<Decimal>,
    target_price: Option<Decimal>,
) -> Option<Decimal> {
    let current = current_price.filter(|p| p.is_positive())?;
    let target = target_price?;
    (target - current)
        .checked_div(current)
        .map(|ratio| (ratio * Decimal::hundred()).round_dp(2))
}

pub fn compose_asset_metrics(inputs: &AssetInputs<'_>) -> Asset {
    compose_asset_metrics_with(inputs, &OrderMatchTolerance::default())
}

pub fn compose_asset_metrics_with(
    inputs: &AssetInputs<'_>,
    tolerance: &OrderMatchTolerance,
) -> Asset {
    let base = inputs.base;
    let platform = inputs.platform;
    let balance = inputs.balance;

    let mut asset = Asset::new(base.clone(), platform.clone());
    asset.tags = tags_for(base);

    if let Some(cap) = inputs.market_cap {
        asset.name = cap.name.clone();
        asset.icon_url = cap.icon_url();
        asset.cmc = CmcData {
            price: cap.price,
            rank: cap.cmc_rank,
            change_24h: cap.percent_change_24h,
            change_7d: cap.percent_change_7d,
            change_30d: cap.percent_change_30d,
            change_60d: cap.percent_change_60d,
            change_90d: cap.percent_change_90d,
        };
    }

    let current_price = resolve_current_price(base, platform, inputs.tickers, inputs.market_cap);
    let total_sell = get_total_sell(base, inputs.trades);
    let buys = get_total_amount_and_buy(base, inputs.trades);

    let (buy_orders, sell_orders): (Vec<OpenOrder>, Vec<OpenOrder>) = inputs
        .open_orders
        .iter()
        .filter(|o| &o.platform == platform && &o.base() == base)
        .cloned()
        .partition(|o| o.side == Side::Buy);
    asset.orders.open = open_orders_data(buy_orders, sell_orders);

    asset.orders.trade = TradeData {
        total_buy: buys.total_buy,
        total_sell,
        total_amount: buys.total_amount,
        average_entry_price: buys.average_entry_price,
    };
    asset.live_data = LiveData {
        balance,
        current_price,
        current_possession: Some((current_price * balance).round_dp(2)),
    };

    if asset.has_tag(AssetTag::Stablecoin) {
        return asset;
    }

    asset.profit = Some(current_price * balance + total_sell - buys.total_buy);

    let strategy = inputs
        .strategy
        .filter(|s| s.is_configured_for(platform));
    let strategy = match strategy {
        Some(s) if !balance.is_zero() => s,
        _ => return asset,
    };

    let recovery = calculate_recovery(base, platform, buys.total_buy, total_sell, Some(strategy));
    let targets = allocate_take_profits(&TakeProfitInput {
        recup_tp1: recovery.recup_tp1,
        balance,
        total_shad: recovery.total_shad,
        recup_tp_x: recovery.recup_tp_x,
        average_entry_price: buys.average_entry_price,
        max_exposition: recovery.max_exposition,
        platform,
    });
    let status = order_status(&targets, &asset.orders.open.sell_orders, tolerance);
    let tranches = targets.map(|t| TakeProfit {
        price: t.price,
        amount: t.amount,
        percent_to_next_tp: percent_to_target(Some(current_price), t.price),
    });

    asset.strat = StratData {
        strategy: recovery.strat,
        max_exposition: Some(recovery.max_exposition),
        take_profits: TakeProfits::from_tranches(tranches, status),
    };
    asset
}

fn open_orders_data(buy_orders: Vec<OpenOrder>, sell_orders: Vec<OpenOrder>) -> OpenOrdersData {
    OpenOrdersData {
        nb_open_buy_orders: buy_orders.len(),
        nb_open_sell_orders: sell_orders.len(),
        buy_orders,
        sell_orders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn sell_order(amount: &str, price: &str) -> OpenOrder {
        OpenOrder {
            o_id: "o1".to_string(),
            platform: Platform::new("binance"),
            symbol: "ETH/USDT".to_string(),
            order_type: "limit".to_string(),
            side: Side::Sell,
            amount: d(amount),
            price: d(price),
        }
    }

    fn target(amount: &str, price: &str) -> TakeProfitTarget {
        TakeProfitTarget {
            amount: Some(d(amount)),
            price: Some(d(price)),
        }
    }

    #[test]
    fn test_order_within_one_percent_matches() {
        let mut targets = [TakeProfitTarget::default(); TAKE_PROFIT_COUNT];
        targets[0] = target("10", "100");
        let status = order_status(
            &targets,
            &[sell_order("10.05", "100.5")],
            &OrderMatchTolerance::default(),
        );
        assert_eq!(status, [1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_order_with_wrong_amount_does_not_match() {
        let mut targets = [TakeProfitTarget::default(); TAKE_PROFIT_COUNT];
        targets[0] = target("10", "100");
        let status = order_status(
            &targets,
            &[sell_order("20", "100")],
            &OrderMatchTolerance::default(),
        );
        assert_eq!(status[0], 0);
    }

    #[test]
    fn test_percent_to_target() {
        assert_eq!(percent_to_target(Some(d("100")), Some(d("150"))), Some(d("50")));
        assert_eq!(percent_to_target(Some(d("3")), Some(d("4"))), Some(d("33.33")));
        assert_eq!(percent_to_target(Some(Decimal::zero()), Some(d("4"))), None);
        assert_eq!(percent_to_target(None, Some(d("4"))), None);
        assert_eq!(percent_to_target(Some(d("3")), None), None);
    }

    #[test]
    fn test_price_prefers_platform_ticker() {
        let base = Symbol::new("ETH");
        let binance = Platform::new("binance");
        let tickers = vec![
            Ticker {
                symbol: "ETH/USDT".to_string(),
                time_ms: crate::domain::TimeMs::new(1),
                last: d("2000"),
                platform: Platform::new("kucoin"),
            },
            Ticker {
                symbol: "ETH/USDT".to_string(),
                time_ms: crate::domain::TimeMs::new(1),
                last: d("2100"),
                platform: binance.clone(),
            },
        ];
        assert_eq!(resolve_current_price(&base, &binance, &tickers, None), d("2100"));
        assert_eq!(
            resolve_current_price(&base, &Platform::new("okx"), &tickers, None),
            Decimal::zero()
        );
    }

    #[test]
    fn test_stablecoin_without_ticker_or_cap_prices_at_zero() {
        let price = resolve_current_price(&Symbol::new("USDC"), &Platform::new("okx"), &[], None);
        assert_eq!(price, Decimal::zero());
    }

    fn buy(price: &str, amount: &str) -> Trade {
        Trade::new(
            crate::domain::TimeMs::new(1_000),
            Platform::new("binance"),
            Symbol::new("ETH"),
            Symbol::new("USDT"),
            Side::Buy,
            d(price),
            d(amount),
            Decimal::zero(),
            Symbol::new("USDT"),
            &crate::domain::ConversionRates::new(),
        )
    }

    fn sell(price: &str, amount: &str) -> Trade {
        Trade::new(
            crate::domain::TimeMs::new(2_000),
            Platform::new("binance"),
            Symbol::new("ETH"),
            Symbol::new("USDT"),
            Side::Sell,
            d(price),
            d(amount),
            Decimal::zero(),
            Symbol::new("USDT"),
            &crate::domain::ConversionRates::new(),
        )
    }

    #[test]
    fn test_held_asset_without_ticker_values_at_zero() {
        let base = Symbol::new("ETH");
        let binance = Platform::new("binance");
        let trades = vec![buy("1000", "2")];
        let asset = compose_asset_metrics(&AssetInputs {
            base: &base,
            platform: &binance,
            balance: d("2"),
            market_cap: None,
            trades: &trades,
            open_orders: &[],
            strategy: None,
            tickers: &[],
        });

        assert_eq!(asset.live_data.current_price, Decimal::zero());
        assert_eq!(asset.live_data.current_possession, Some(Decimal::zero()));
        assert_eq!(asset.profit, Some(d("-2000")));
    }

    #[test]
    fn test_sold_out_asset_without_ticker_reports_realized_loss() {
        let base = Symbol::new("ETH");
        let binance = Platform::new("binance");
        let trades = vec![buy("1000", "1"), sell("300", "1")];
        let strategy = Strategy::new(base.clone()).with_platform(
            binance.clone(),
            crate::domain::StrategyName::Shad,
            Some(d("500")),
        );
        let asset = compose_asset_metrics(&AssetInputs {
            base: &base,
            platform: &binance,
            balance: Decimal::zero(),
            market_cap: None,
            trades: &trades,
            open_orders: &[],
            strategy: Some(&strategy),
            tickers: &[],
        });

        assert_eq!(asset.live_data.current_possession, Some(Decimal::zero()));
        assert_eq!(asset.profit, Some(d("-700")));
    }
}
