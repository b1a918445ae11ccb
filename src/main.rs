use bookstore_stock_fulfillment::adapter::driven::console_logger::ConsoleLogger;
use bookstore_stock_fulfillment::adapter::driven::console_notifier::ConsoleStockNotifier;
use bookstore_stock_fulfillment::adapter::driven::mysql_store::MySqlUnitOfWork;
use bookstore_stock_fulfillment::adapter::database_config::DatabaseConfig;
use bookstore_stock_fulfillment::adapter::database_migration::DatabaseMigration;
use bookstore_stock_fulfillment::application::error::ApplicationError;
use bookstore_stock_fulfillment::application::service::{FulfillmentService, SalesReportService};
use bookstore_stock_fulfillment::domain::error::DomainError;
use bookstore_stock_fulfillment::domain::model::{
    BatchId, CustomerId, Demand, Money, Product, ProductId, StockBatch,
};
use bookstore_stock_fulfillment::domain::port::{Logger, NullStockNotifier, StockStore, UnitOfWork};
use bookstore_stock_fulfillment::domain::service::StockLedger;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// シミュレーション対象のデモ商品。再実行しても重複しないよう固定IDを使う
const DEMO_PRODUCT_ID: &str = "7f2a9c41-55e3-4b8a-9f10-3d6c8e21a0b4";

/// 在庫消費シミュレーター
/// デモ商品に対して1点ずつ注文を繰り返し、FIFO引き当て・低在庫検知・
/// 在庫切れによる販売停止までの一連の流れをログで観察する
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== FIFOバッチ在庫引き当てエンジン ===");
    println!("在庫消費シミュレーター");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;

    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());
    let notifier = Arc::new(ConsoleStockNotifier::new(logger.clone()));

    let uow = MySqlUnitOfWork::new(pool.clone());
    let product_id = ProductId::from_string(DEMO_PRODUCT_ID)?;

    seed_demo_catalog(&uow, product_id).await?;

    let service = FulfillmentService::new(MySqlUnitOfWork::new(pool.clone()), notifier);
    let customer_id = CustomerId::new();

    // 1点ずつ注文し、在庫が尽きるまで消費する
    loop {
        let demand = Demand::new(product_id, 1)?;
        match service.place_order(customer_id, vec![demand]).await {
            Ok(order) => {
                let mut context = HashMap::new();
                context.insert("order_number".to_string(), order.order_number().to_string());
                context.insert("total".to_string(), order.total().to_string());
                if let Some(product) = fetch_product(&uow, product_id).await? {
                    context.insert(
                        "available_stock".to_string(),
                        product.available_stock().to_string(),
                    );
                }
                logger.info("Simulator", "注文を作成しました", Some(context));
            }
            Err(ApplicationError::Domain(DomainError::InsufficientStock { .. })) => {
                logger.info("Simulator", "在庫が尽きたため終了します", None);
                break;
            }
            Err(e) => return Err(e.into()),
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    // 当日の売上サマリーを出力
    let report = SalesReportService::new(MySqlUnitOfWork::new(pool.clone()));
    let summary = report.daily_summary(Utc::now().date_naive()).await?;
    println!();
    println!("=== 本日の売上サマリー ({}) ===", summary.date);
    println!("注文件数: {}", summary.order_count);
    println!("販売点数: {}", summary.units_sold);
    println!("売上合計: {}", summary.total_revenue);
    println!("割引合計: {}", summary.total_discount);

    Ok(())
}

/// デモ商品を取得する
async fn fetch_product(
    uow: &MySqlUnitOfWork,
    product_id: ProductId,
) -> Result<Option<Product>, ApplicationError> {
    let store = uow.begin().await?;
    let result = store.find_product(product_id).await;
    uow.commit(store).await?;
    Ok(result?)
}

/// デモ商品と3つの入荷バッチを投入する
/// すでに投入済みの場合は何もしない
async fn seed_demo_catalog(
    uow: &MySqlUnitOfWork,
    product_id: ProductId,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = uow.begin().await?;

    if store.find_product(product_id).await?.is_some() {
        uow.commit(store).await?;
        println!("デモ商品は投入済みです");
        return Ok(());
    }

    let product = Product::new(
        product_id,
        "Dark Fantasy Vol. 1".to_string(),
        Money::usd(Decimal::new(3999, 2)), // 39.99
        Decimal::from(10),
        5,
    )?;
    store.save_product(&product).await?;

    // 受領日の異なる3バッチ。古いものから順に消費されていく
    let batches = [
        ("BATCH-2025-001", NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(), 5u32),
        ("BATCH-2025-002", NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(), 8u32),
        ("BATCH-2025-003", NaiveDate::from_ymd_opt(2025, 3, 20).unwrap(), 7u32),
    ];
    for (batch_number, received_date, quantity) in batches {
        let batch = StockBatch::new(
            BatchId::new(),
            product_id,
            batch_number.to_string(),
            received_date,
            None,
            Money::usd(Decimal::new(1850, 2)),
            quantity,
        )?;
        store.save_batch(&batch).await?;
    }

    // 集約カウンタを初期化する
    let notifier = NullStockNotifier;
    let ledger = StockLedger::new(&store, &notifier);
    let mut product = product;
    ledger.recompute_aggregates(&mut product).await?;

    uow.commit(store).await?;
    println!(
        "デモ商品を投入しました: {} (在庫{}個)",
        product.title(),
        product.available_stock()
    );
    Ok(())
}
