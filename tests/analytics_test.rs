mod common;

use anyhow::Result;
use common::{exec, insert_item, insert_order, test_db};
use justoo_inventory::analytics::{
    self, category, financial, orders, payments, performance, riders, stock, DateRange,
    PriceBands,
};
use justoo_inventory::analytics::performance::StockStatus;
use justoo_inventory::config::{AnalyticsConfig, PriceBandConfig};
use rust_decimal::Decimal;

#[tokio::test]
async fn empty_item_lands_in_two_buckets() -> Result<()> {
    let (_dir, db) = test_db().await?;

    let empty = insert_item(&db, "Toor Dal", 10_000, 0, 10, Some("grains")).await?;
    let low = insert_item(&db, "Ghee", 55_000, 5, 10, Some("dairy")).await?;
    let over = insert_item(&db, "Salt", 2_000, 100, 10, Some("grains")).await?;
    insert_item(&db, "Milk", 3_000, 20, 10, Some("dairy")).await?;
    let retired = insert_item(&db, "Old Stock", 1_000, 0, 10, None).await?;
    exec(&db, &format!("UPDATE items SET is_active = 0 WHERE id = {retired}")).await?;

    let levels = stock::stock_levels(&db, 5).await?;

    assert_eq!(levels.total_items, 4);
    assert_eq!(levels.out_of_stock.count, 1);
    assert_eq!(levels.low_stock.count, 2);
    assert_eq!(levels.overstock.count, 1);
    assert_eq!(levels.out_of_stock.items[0].id, empty);
    assert!(levels.low_stock.items.iter().any(|i| i.id == empty));
    assert!(levels.low_stock.items.iter().any(|i| i.id == low));
    assert_eq!(levels.overstock.items[0].id, over);

    // Milk is the one normal item, but the empty item is subtracted twice.
    assert_eq!(levels.normal.count, 0);
    assert_eq!(levels.reconciliation_gap(), 1);
    assert_eq!(levels.normal.count + levels.reconciliation_gap(), 1);

    assert_eq!(levels.low_stock.percentage, 50.0);
    assert_eq!(levels.out_of_stock.percentage, 25.0);
    Ok(())
}

#[tokio::test]
async fn overstock_multiplier_comes_from_the_caller() -> Result<()> {
    let (_dir, db) = test_db().await?;
    insert_item(&db, "Sugar", 4_500, 30, 10, None).await?;

    assert_eq!(stock::stock_levels(&db, 5).await?.overstock.count, 0);
    assert_eq!(stock::stock_levels(&db, 2).await?.overstock.count, 1);
    Ok(())
}

#[tokio::test]
async fn financial_on_empty_inventory_is_all_zeros() -> Result<()> {
    let (_dir, db) = test_db().await?;
    let bands = PriceBands::from_config(&PriceBandConfig::default());

    let financial = financial::financial_analytics(&db, &bands, 5).await?;

    assert_eq!(financial.total_items, 0);
    assert_eq!(financial.total_inventory_value, Decimal::ZERO);
    assert_eq!(financial.average_item_price, Decimal::ZERO);
    assert_eq!(financial.highest_price, Decimal::ZERO);
    assert_eq!(financial.lowest_price, Decimal::ZERO);
    assert!(financial.most_expensive.is_empty());
    assert_eq!(financial.price_distribution.len(), 4);
    assert!(financial.price_distribution.iter().all(|b| b.count == 0));
    Ok(())
}

#[tokio::test]
async fn financial_totals_and_price_bands() -> Result<()> {
    let (_dir, db) = test_db().await?;
    insert_item(&db, "Chips", 5_000, 10, 5, None).await?; // 50.00
    insert_item(&db, "Paneer", 10_000, 2, 5, None).await?; // 100.00, band edge
    insert_item(&db, "Honey", 25_000, 4, 5, None).await?; // 250.00
    insert_item(&db, "Saffron", 500_000, 1, 1, None).await?; // 5000.00
    let bands = PriceBands::from_config(&PriceBandConfig::default());

    let financial = financial::financial_analytics(&db, &bands, 2).await?;

    // 500 + 200 + 1000 + 5000
    assert_eq!(financial.total_inventory_value.to_string(), "6700.00");
    assert_eq!(financial.total_items, 4);
    assert_eq!(financial.average_item_price.to_string(), "1350.00");
    assert_eq!(financial.highest_price.to_string(), "5000.00");
    assert_eq!(financial.lowest_price.to_string(), "50.00");

    let most: Vec<&str> = financial.most_expensive.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(most, ["Saffron", "Honey"]);
    let least: Vec<&str> = financial.least_expensive.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(least, ["Chips", "Paneer"]);

    let counts: Vec<(&str, i64)> = financial
        .price_distribution
        .iter()
        .map(|b| (b.range.as_str(), b.count))
        .collect();
    assert_eq!(
        counts,
        [
            ("Under ₹100", 2),
            ("₹100 - ₹500", 1),
            ("₹500 - ₹2000", 0),
            ("Over ₹2000", 1),
        ]
    );
    assert_eq!(financial.price_distribution[0].total_value.to_string(), "700.00");
    Ok(())
}

#[tokio::test]
async fn overflowing_inventory_value_is_an_error_not_a_saturated_total() -> Result<()> {
    let (_dir, db) = test_db().await?;
    // 99,999,999.99 x i32::MAX does not fit in i64 minor units
    insert_item(&db, "Bullion", 9_999_999_999, 2_147_483_647, 0, None).await?;
    let bands = PriceBands::from_config(&PriceBandConfig::default());

    assert!(financial::financial_analytics(&db, &bands, 5).await.is_err());
    assert!(analytics::inventory_analytics(&db, &AnalyticsConfig::default())
        .await
        .is_err());
    Ok(())
}

#[tokio::test]
async fn schema_rejects_out_of_range_stock() -> Result<()> {
    let (_dir, db) = test_db().await?;

    assert!(insert_item(&db, "Too Many", 1_000, 2_147_483_648, 10, None).await.is_err());
    assert!(insert_item(&db, "Too Dear", 10_000_000_000, 1, 10, None).await.is_err());
    Ok(())
}

#[tokio::test]
async fn equal_sales_are_ranked_by_item_id() -> Result<()> {
    let (_dir, db) = test_db().await?;
    let first = insert_item(&db, "Bread", 4_000, 0, 10, None).await?;
    let second = insert_item(&db, "Butter", 5_000, 50, 10, None).await?;
    let best = insert_item(&db, "Eggs", 8_400, 8, 10, None).await?;
    let unsold = insert_item(&db, "Jam", 12_000, 30, 10, None).await?;

    insert_order(
        &db,
        "delivered",
        "2024-03-01T10:00:00Z",
        &[(second, 3, 5_000), (first, 3, 4_000), (best, 9, 8_400)],
    )
    .await?;

    let perf = performance::performance_analytics(&db, 10, 10).await?;

    let by_quantity: Vec<i64> = perf.top_selling_by_quantity.iter().map(|i| i.item_id).collect();
    assert_eq!(by_quantity, [best, first, second]);
    assert_eq!(perf.top_selling_by_quantity[1].stock_status, StockStatus::OutOfStock);
    assert_eq!(perf.top_selling_by_quantity[0].stock_status, StockStatus::LowStock);
    assert_eq!(perf.top_selling_by_quantity[2].stock_status, StockStatus::InStock);

    let by_revenue: Vec<i64> = perf.top_selling_by_revenue.iter().map(|i| i.item_id).collect();
    assert_eq!(by_revenue, [best, second, first]);
    assert_eq!(perf.top_selling_by_revenue[0].total_revenue.to_string(), "756.00");

    assert_eq!(perf.slow_moving_items[0].id, unsold);
    assert_eq!(perf.slow_moving_items[0].total_sold, 0);
    assert_eq!(perf.slow_moving_items[1].id, first);
    assert_eq!(perf.slow_moving_items[2].id, second);
    assert!(perf.slow_moving_items[0].days_in_inventory >= 0);
    Ok(())
}

#[tokio::test]
async fn category_percentages_sum_to_one_hundred() -> Result<()> {
    let (_dir, db) = test_db().await?;
    insert_item(&db, "Milk", 3_000, 20, 10, Some("dairy")).await?;
    insert_item(&db, "Curd", 4_000, 0, 10, Some("dairy")).await?;
    insert_item(&db, "Rice", 9_000, 5, 10, Some("grains")).await?;
    insert_item(&db, "Unsorted", 1_000, 1, 10, None).await?;
    insert_item(&db, "Biscuits", 2_000, 40, 10, Some("snacks")).await?;
    insert_item(&db, "Namkeen", 2_500, 40, 10, Some("snacks")).await?;

    let categories = category::category_analytics(&db).await?;

    assert_eq!(categories.total_categories, 4);
    assert_eq!(categories.summary.total_items, 6);
    assert_eq!(categories.categories[0].category.as_deref(), Some("dairy"));
    assert_eq!(categories.categories[0].item_count, 2);
    assert_eq!(categories.categories[0].low_stock_count, 1);
    assert_eq!(categories.categories[0].out_of_stock_count, 1);
    assert_eq!(categories.categories[1].category.as_deref(), Some("snacks"));
    assert!((categories.item_percentage_sum() - 100.0).abs() <= 0.05);

    let value_sum: f64 = categories.categories.iter().map(|c| c.value_percentage).sum();
    assert!((value_sum - 100.0).abs() <= 0.05);
    Ok(())
}

#[tokio::test]
async fn merged_report_contains_every_section() -> Result<()> {
    let (_dir, db) = test_db().await?;
    insert_item(&db, "Milk", 3_000, 20, 10, Some("dairy")).await?;

    let report = analytics::inventory_analytics(&db, &AnalyticsConfig::default()).await?;
    let json = serde_json::to_value(&report)?;

    for key in ["stockLevels", "financial", "performance", "categories", "timestamp"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["stockLevels"]["totalItems"], 1);
    assert_eq!(json["financial"]["priceDistribution"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[tokio::test]
async fn order_analytics_covers_every_status() -> Result<()> {
    let (_dir, db) = test_db().await?;
    let item = insert_item(&db, "Atta", 30_000, 50, 10, None).await?;

    insert_order(&db, "delivered", "2024-03-01T09:00:00Z", &[(item, 1, 30_000)]).await?;
    insert_order(&db, "delivered", "2024-03-02T23:30:00Z", &[(item, 2, 30_000)]).await?;
    insert_order(&db, "cancelled", "2024-03-02T12:00:00Z", &[(item, 5, 30_000)]).await?;
    insert_order(&db, "placed", "2024-04-15T12:00:00Z", &[(item, 1, 30_000)]).await?;

    let all = orders::order_analytics(&db, None, 30).await?;
    assert_eq!(all.total_orders, 4);
    assert_eq!(all.orders_by_status.len(), 7);
    assert_eq!(all.orders_by_status["delivered"], 2);
    assert_eq!(all.orders_by_status["ready"], 0);
    assert_eq!(all.revenue.total.to_string(), "900.00");
    assert_eq!(all.revenue.highest.to_string(), "600.00");
    assert_eq!(all.revenue.lowest.to_string(), "300.00");
    assert_eq!(all.revenue.average.to_string(), "450.00");

    // the end day is included in full
    let range = DateRange::from_params(Some("2024-03-02"), Some("2024-03-02"))?;
    let march = orders::order_analytics(&db, range, 30).await?;
    assert_eq!(march.total_orders, 2);
    assert_eq!(march.orders_by_status["cancelled"], 1);
    assert_eq!(march.revenue.total.to_string(), "600.00");
    Ok(())
}

#[tokio::test]
async fn daily_trend_only_counts_recent_deliveries() -> Result<()> {
    let (_dir, db) = test_db().await?;
    exec(
        &db,
        "INSERT INTO orders (customer_id, status, total_amount_cents, item_count, created_at) VALUES \
         (1, 'delivered', 18000, 1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-1 day')), \
         (1, 'delivered', 36000, 1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-1 day')), \
         (1, 'delivered', 18000, 1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-90 days')), \
         (1, 'placed', 18000, 1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now'));",
    )
    .await?;

    let report = orders::order_analytics(&db, None, 30).await?;
    assert_eq!(report.daily_trend.len(), 1);
    assert_eq!(report.daily_trend[0].order_count, 2);
    assert_eq!(report.daily_trend[0].revenue.to_string(), "540.00");
    Ok(())
}

#[tokio::test]
async fn payments_count_only_completed_and_list_every_method() -> Result<()> {
    let (_dir, db) = test_db().await?;
    let item = insert_item(&db, "Atta", 30_000, 50, 10, None).await?;
    let first = insert_order(&db, "delivered", "2024-03-01T09:00:00Z", &[(item, 1, 30_000)]).await?;
    let second = insert_order(&db, "delivered", "2024-03-02T09:00:00Z", &[(item, 2, 30_000)]).await?;
    let third = insert_order(&db, "cancelled", "2024-03-03T09:00:00Z", &[(item, 1, 30_000)]).await?;
    exec(
        &db,
        &format!(
            "INSERT INTO justoo_payments (order_id, amount_cents, method, status) VALUES \
             ({first}, 30000, 'upi', 'completed'), \
             ({second}, 60000, 'upi', 'completed'), \
             ({third}, 30000, 'card', 'refunded');"
        ),
    )
    .await?;

    let report = payments::payment_analytics(&db).await?;

    let methods: Vec<(&str, i64, String)> = report
        .payment_methods
        .iter()
        .map(|m| (m.method.as_str(), m.count, m.total.to_string()))
        .collect();
    assert_eq!(
        methods,
        [
            ("cash", 0, "0.00".to_string()),
            ("upi", 2, "900.00".to_string()),
            ("card", 0, "0.00".to_string()),
            ("wallet", 0, "0.00".to_string()),
        ]
    );

    assert_eq!(report.order_status.len(), 7);
    let delivered = report
        .order_status
        .iter()
        .find(|s| s.status == "delivered")
        .expect("delivered status listed");
    assert_eq!(delivered.count, 2);
    assert_eq!(delivered.total_amount.to_string(), "900.00");
    let cancelled = report
        .order_status
        .iter()
        .find(|s| s.status == "cancelled")
        .expect("cancelled status listed");
    assert_eq!(cancelled.total_amount.to_string(), "300.00");
    assert_eq!(report.order_status[0].status, "placed");
    assert_eq!(report.order_status[0].count, 0);
    Ok(())
}

#[tokio::test]
async fn rider_statistics_split_active_and_recent() -> Result<()> {
    let (_dir, db) = test_db().await?;

    let empty = riders::rider_statistics(&db, 30).await?;
    assert_eq!(empty.total_riders, 0);
    assert_eq!(empty.active_riders.percentage, 0.0);

    exec(
        &db,
        "INSERT INTO justoo_riders (name, phone, vehicle_type, vehicle_number, is_active, created_at) VALUES \
         ('Ravi', '900001', 'bike', 'KA01A1', 1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-2 days')), \
         ('Asha', '900002', 'bike', 'KA01A2', 1, strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-60 days')), \
         ('Imran', '900003', 'scooter', 'KA01A3', 0, strftime('%Y-%m-%dT%H:%M:%SZ', 'now', '-90 days'));",
    )
    .await?;

    let stats = riders::rider_statistics(&db, 30).await?;
    assert_eq!(stats.total_riders, 3);
    assert_eq!(stats.active_riders.count, 2);
    assert_eq!(stats.active_riders.percentage, 66.67);
    assert_eq!(stats.inactive_riders.count, 1);
    assert_eq!(stats.inactive_riders.percentage, 33.33);
    assert_eq!(stats.recent_registrations, 1);

    assert_eq!(riders::rider_statistics(&db, 365).await?.recent_registrations, 3);
    Ok(())
}
