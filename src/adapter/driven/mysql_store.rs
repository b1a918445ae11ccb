use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    BatchId, CartId, CustomerId, Money, Order, OrderId, OrderLine, OrderNumber, OrderStatus,
    Product, ProductId, StockBatch,
};
use crate::domain::port::{RepositoryError, StockStore, UnitOfWork};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{MySql, Pool, Row, Transaction};
use tokio::sync::Mutex;

/// MySQLトランザクション境界
/// beginごとに1つのデータベーストランザクションを開き、
/// その内部で動作するストアを払い出す
pub struct MySqlUnitOfWork {
    pool: Pool<MySql>,
}

impl MySqlUnitOfWork {
    /// 新しいMySQLトランザクション境界を作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for MySqlUnitOfWork {
    type Store = MySqlStockStore;

    async fn begin(&self) -> Result<MySqlStockStore, RepositoryError> {
        let tx = self.pool.begin().await.map_err(|e| {
            RepositoryError::from(DatabaseError::ConnectionError(format!(
                "トランザクション開始に失敗しました: {}",
                e
            )))
        })?;
        Ok(MySqlStockStore { tx: Mutex::new(tx) })
    }

    async fn commit(&self, store: MySqlStockStore) -> Result<(), RepositoryError> {
        store.tx.into_inner().commit().await.map_err(|e| {
            RepositoryError::from(DatabaseError::QueryError(format!(
                "トランザクションのコミットに失敗しました: {}",
                e
            )))
        })
    }

    async fn rollback(&self, store: MySqlStockStore) -> Result<(), RepositoryError> {
        store.tx.into_inner().rollback().await.map_err(|e| {
            RepositoryError::from(DatabaseError::QueryError(format!(
                "トランザクションのロールバックに失敗しました: {}",
                e
            )))
        })
    }
}

/// MySQL在庫ストア
/// 1つのトランザクションの内部で商品・バッチ・注文を読み書きする
/// 変更対象の行は SELECT ... FOR UPDATE で悲観ロックを取る
pub struct MySqlStockStore {
    tx: Mutex<Transaction<'static, MySql>>,
}

impl MySqlStockStore {
    /// データベースの行から商品集約を再構築する
    fn product_from_row(row: &sqlx::mysql::MySqlRow) -> Result<Product, RepositoryError> {
        let id = ProductId::from_string(&row.get::<String, _>("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
        })?;

        let currency: String = row.get("currency");
        let base_price = Money::new(row.get::<Decimal, _>("base_price"), currency.clone())
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("基準価格の構築に失敗しました: {}", e))
            })?;
        let final_price = Money::new(row.get::<Decimal, _>("final_price"), currency)
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("最終価格の構築に失敗しました: {}", e))
            })?;

        Product::reconstruct(
            id,
            row.get("title"),
            row.get("author"),
            row.get("description"),
            base_price,
            row.get::<Decimal, _>("discount_percentage"),
            final_price,
            row.get::<u32, _>("total_stock"),
            row.get::<u32, _>("available_stock"),
            row.get::<u32, _>("low_stock_threshold"),
            row.get::<bool, _>("is_active"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("商品集約の再構築に失敗しました: {}", e)))
    }

    /// データベースの行から入荷バッチを再構築する
    fn batch_from_row(row: &sqlx::mysql::MySqlRow) -> Result<StockBatch, RepositoryError> {
        let id = BatchId::from_string(&row.get::<String, _>("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("バッチIDの解析に失敗しました: {}", e))
        })?;
        let product_id =
            ProductId::from_string(&row.get::<String, _>("product_id")).map_err(|e| {
                RepositoryError::FetchFailed(format!("商品IDの解析に失敗しました: {}", e))
            })?;

        let cost_per_unit = Money::new(
            row.get::<Decimal, _>("cost_per_unit"),
            row.get::<String, _>("currency"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("仕入れ単価の構築に失敗しました: {}", e))
        })?;

        StockBatch::reconstruct(
            id,
            product_id,
            row.get("batch_number"),
            row.get::<NaiveDate, _>("received_date"),
            row.get::<Option<NaiveDate>, _>("expiry_date"),
            cost_per_unit,
            row.get::<u32, _>("initial_quantity"),
            row.get::<u32, _>("remaining_quantity"),
        )
        .map_err(|e| RepositoryError::FetchFailed(format!("バッチの再構築に失敗しました: {}", e)))
    }

    /// JOINされた結果から注文集約のリストを再構築する
    /// 注文IDごとにグループ化し、注文日時の降順で並べて返す
    fn orders_from_rows(rows: &[sqlx::mysql::MySqlRow]) -> Result<Vec<Order>, RepositoryError> {
        use std::collections::HashMap;

        let mut order_groups: HashMap<String, Vec<&sqlx::mysql::MySqlRow>> = HashMap::new();
        for row in rows {
            let order_id: String = row.get("id");
            order_groups.entry(order_id).or_default().push(row);
        }

        let mut orders = Vec::new();
        for (order_id_str, order_rows) in order_groups {
            let first_row = order_rows[0];

            let order_id = OrderId::from_string(&order_id_str).map_err(|e| {
                RepositoryError::FetchFailed(format!("注文IDの解析に失敗しました: {}", e))
            })?;
            let customer_id = CustomerId::from_string(first_row.get("customer_id")).map_err(
                |e| RepositoryError::FetchFailed(format!("顧客IDの解析に失敗しました: {}", e)),
            )?;
            let order_number = OrderNumber::from_string(first_row.get("order_number"));
            let status = OrderStatus::from_string(first_row.get("status")).map_err(|e| {
                RepositoryError::FetchFailed(format!(
                    "注文ステータスの解析に失敗しました: {}",
                    e
                ))
            })?;

            let currency: String = first_row.get("currency");
            let subtotal = Money::new(first_row.get::<Decimal, _>("subtotal"), currency.clone())
                .map_err(|e| {
                    RepositoryError::FetchFailed(format!("小計の構築に失敗しました: {}", e))
                })?;
            let discount = Money::new(first_row.get::<Decimal, _>("discount"), currency.clone())
                .map_err(|e| {
                    RepositoryError::FetchFailed(format!("割引額の構築に失敗しました: {}", e))
                })?;
            let total = Money::new(first_row.get::<Decimal, _>("total"), currency).map_err(
                |e| RepositoryError::FetchFailed(format!("合計金額の構築に失敗しました: {}", e)),
            )?;

            let placed_at: DateTime<Utc> = first_row.get("placed_at");

            // 注文明細を再構築（明細のない注文はLEFT JOINでNULL行になる）
            let mut lines = Vec::new();
            for row in &order_rows {
                if let (Some(product_id_str), Some(quantity), Some(unit_price), Some(line_currency)) = (
                    row.get::<Option<String>, _>("line_product_id"),
                    row.get::<Option<u32>, _>("quantity"),
                    row.get::<Option<Decimal>, _>("unit_price"),
                    row.get::<Option<String>, _>("line_currency"),
                ) {
                    let product_id = ProductId::from_string(&product_id_str).map_err(|e| {
                        RepositoryError::FetchFailed(format!(
                            "商品IDの解析に失敗しました: {}",
                            e
                        ))
                    })?;

                    let batch_id = match row.get::<Option<String>, _>("line_batch_id") {
                        Some(s) => Some(BatchId::from_string(&s).map_err(|e| {
                            RepositoryError::FetchFailed(format!(
                                "バッチIDの解析に失敗しました: {}",
                                e
                            ))
                        })?),
                        None => None,
                    };

                    let unit_price = Money::new(unit_price, line_currency).map_err(|e| {
                        RepositoryError::FetchFailed(format!("単価の構築に失敗しました: {}", e))
                    })?;

                    let line = OrderLine::new(
                        product_id,
                        batch_id,
                        quantity,
                        unit_price,
                        row.get::<Option<Decimal>, _>("line_discount_percentage")
                            .unwrap_or(Decimal::ZERO),
                    )
                    .map_err(|e| {
                        RepositoryError::FetchFailed(format!(
                            "注文明細の構築に失敗しました: {}",
                            e
                        ))
                    })?;

                    lines.push(line);
                }
            }

            let order = Order::reconstruct(
                order_id,
                customer_id,
                order_number,
                lines,
                subtotal,
                discount,
                total,
                status,
                placed_at,
            )
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("注文集約の再構築に失敗しました: {}", e))
            })?;

            orders.push(order);
        }

        // グループ化で行順が失われるため、ここで並べ直す
        orders.sort_by(|a, b| b.placed_at().cmp(&a.placed_at()));
        Ok(orders)
    }
}

// 注文と明細をJOINで取得するときの共通SELECT句
const ORDER_SELECT: &str = r#"
    SELECT
        o.id, o.customer_id, o.order_number,
        o.subtotal, o.discount, o.total, o.currency, o.status, o.placed_at,
        ol.product_id AS line_product_id, ol.batch_id AS line_batch_id,
        ol.quantity, ol.unit_price, ol.currency AS line_currency,
        ol.discount_percentage AS line_discount_percentage
    FROM orders o
    LEFT JOIN order_lines ol ON o.id = ol.order_id
"#;

#[async_trait]
impl StockStore for MySqlStockStore {
    async fn find_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let row = sqlx::query(
            r#"
            SELECT id, title, author, description,
                   base_price, discount_percentage, final_price, currency,
                   total_stock, available_stock, low_stock_threshold, is_active
            FROM products
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(product_id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品の取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        row.as_ref().map(Self::product_from_row).transpose()
    }

    async fn save_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut tx = self.tx.lock().await;
        sqlx::query(
            r#"
            INSERT INTO products (
                id, title, author, description,
                base_price, discount_percentage, final_price, currency,
                total_stock, available_stock, low_stock_threshold, is_active
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                title = VALUES(title),
                author = VALUES(author),
                description = VALUES(description),
                base_price = VALUES(base_price),
                discount_percentage = VALUES(discount_percentage),
                final_price = VALUES(final_price),
                currency = VALUES(currency),
                total_stock = VALUES(total_stock),
                available_stock = VALUES(available_stock),
                low_stock_threshold = VALUES(low_stock_threshold),
                is_active = VALUES(is_active)
            "#,
        )
        .bind(product.id().to_string())
        .bind(product.title())
        .bind(product.author())
        .bind(product.description())
        .bind(product.base_price().amount())
        .bind(product.discount_percentage())
        .bind(product.final_price().amount())
        .bind(product.base_price().currency())
        .bind(product.total_stock())
        .bind(product.available_stock())
        .bind(product.low_stock_threshold())
        .bind(product.is_active())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("商品の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_low_stock_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let rows = sqlx::query(
            r#"
            SELECT id, title, author, description,
                   base_price, discount_percentage, final_price, currency,
                   total_stock, available_stock, low_stock_threshold, is_active
            FROM products
            WHERE available_stock <= low_stock_threshold
            ORDER BY available_stock ASC
            "#,
        )
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            DatabaseError::QueryError(format!("低在庫商品の取得に失敗しました: {}", e))
        })
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::product_from_row).collect()
    }

    async fn find_batches(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StockBatch>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, batch_number, received_date, expiry_date,
                   cost_per_unit, currency, initial_quantity, remaining_quantity
            FROM stock_batches
            WHERE product_id = ?
            ORDER BY received_date ASC, id ASC
            FOR UPDATE
            "#,
        )
        .bind(product_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("バッチの取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::batch_from_row).collect()
    }

    async fn find_available_batches(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StockBatch>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        // FIFO順: 受領日の昇順、同日はバッチIDの昇順
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, batch_number, received_date, expiry_date,
                   cost_per_unit, currency, initial_quantity, remaining_quantity
            FROM stock_batches
            WHERE product_id = ? AND remaining_quantity > 0
            ORDER BY received_date ASC, id ASC
            FOR UPDATE
            "#,
        )
        .bind(product_id.to_string())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("バッチの取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::batch_from_row).collect()
    }

    async fn find_batch(&self, batch_id: BatchId) -> Result<Option<StockBatch>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let row = sqlx::query(
            r#"
            SELECT id, product_id, batch_number, received_date, expiry_date,
                   cost_per_unit, currency, initial_quantity, remaining_quantity
            FROM stock_batches
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(batch_id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("バッチの取得に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        row.as_ref().map(Self::batch_from_row).transpose()
    }

    async fn save_batch(&self, batch: &StockBatch) -> Result<(), RepositoryError> {
        let mut tx = self.tx.lock().await;
        sqlx::query(
            r#"
            INSERT INTO stock_batches (
                id, product_id, batch_number, received_date, expiry_date,
                cost_per_unit, currency, initial_quantity, remaining_quantity
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                remaining_quantity = VALUES(remaining_quantity)
            "#,
        )
        .bind(batch.id().to_string())
        .bind(batch.product_id().to_string())
        .bind(batch.batch_number())
        .bind(batch.received_date())
        .bind(batch.expiry_date())
        .bind(batch.cost_per_unit().amount())
        .bind(batch.cost_per_unit().currency())
        .bind(batch.initial_quantity())
        .bind(batch.remaining_quantity())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("バッチの保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tx = self.tx.lock().await;

        // 注文データをordersテーブルにUPSERT
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, order_number,
                subtotal, discount, total, currency, status, placed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                subtotal = VALUES(subtotal),
                discount = VALUES(discount),
                total = VALUES(total),
                currency = VALUES(currency),
                status = VALUES(status)
            "#,
        )
        .bind(order.id().to_string())
        .bind(order.customer_id().to_string())
        .bind(order.order_number().as_str())
        .bind(order.subtotal().amount())
        .bind(order.discount().amount())
        .bind(order.total().amount())
        .bind(order.subtotal().currency())
        .bind(order.status().to_string())
        .bind(order.placed_at())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::QueryError(format!("注文の保存に失敗しました: {}", e)))
        .map_err(RepositoryError::from)?;

        // 既存の注文明細を削除してから入れ直す
        sqlx::query("DELETE FROM order_lines WHERE order_id = ?")
            .bind(order.id().to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("注文明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        for line in order.lines() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    order_id, product_id, batch_id,
                    quantity, unit_price, currency, discount_percentage
                )
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(order.id().to_string())
            .bind(line.product_id().to_string())
            .bind(line.batch_id().map(|id| id.to_string()))
            .bind(line.quantity())
            .bind(line.unit_price().amount())
            .bind(line.unit_price().currency())
            .bind(line.discount_percentage())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("注文明細の保存に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;
        }

        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let sql = format!("{} WHERE o.id = ? FOR UPDATE", ORDER_SELECT);
        let rows = sqlx::query(&sql)
            .bind(order_id.to_string())
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| DatabaseError::QueryError(format!("注文の取得に失敗しました: {}", e)))
            .map_err(RepositoryError::from)?;

        if rows.is_empty() {
            return Ok(None);
        }

        let mut orders = Self::orders_from_rows(&rows)?;
        Ok(orders.pop())
    }

    async fn find_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let sql = format!("{} WHERE o.status = ?", ORDER_SELECT);
        let rows = sqlx::query(&sql)
            .bind(status.to_string())
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "ステータス別注文一覧の取得に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Self::orders_from_rows(&rows)
    }

    async fn find_orders_placed_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut tx = self.tx.lock().await;
        let sql = format!("{} WHERE DATE(o.placed_at) = ?", ORDER_SELECT);
        let rows = sqlx::query(&sql)
            .bind(date)
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("日別注文一覧の取得に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Self::orders_from_rows(&rows)
    }

    async fn clear_cart(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        let mut tx = self.tx.lock().await;
        sqlx::query("DELETE FROM cart_lines WHERE cart_id = ?")
            .bind(cart_id.to_string())
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!("カート明細の削除に失敗しました: {}", e))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}
