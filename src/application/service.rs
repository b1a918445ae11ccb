// アプリケーションサービス
// ユースケースごとにトランザクション境界を張り、ドメインサービスを組み合わせる

use crate::application::error::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::model::{
    Cart, CustomerId, Demand, Money, Order, OrderId, OrderLine, OrderNumber, OrderStatus, Product,
    ProductId,
};
use crate::domain::port::{StockNotifier, StockStore, UnitOfWork};
use crate::domain::service::{FifoAllocator, StockLedger};
use chrono::NaiveDate;
use std::sync::Arc;

/// 注文遂行サービス
/// 注文の組み立て・カート注文・キャンセルを1注文=1トランザクションで実行する
pub struct FulfillmentService<U: UnitOfWork> {
    uow: U,
    notifier: Arc<dyn StockNotifier>,
}

impl<U: UnitOfWork> FulfillmentService<U> {
    /// 新しい注文遂行サービスを作成
    ///
    /// # Arguments
    /// * `uow` - トランザクション境界
    /// * `notifier` - 低在庫・販売停止の通知先
    pub fn new(uow: U, notifier: Arc<dyn StockNotifier>) -> Self {
        Self { uow, notifier }
    }

    /// 注文を作成する
    /// 全要求の検証 → 注文作成 → 要求ごとのFIFO引き当て → 合計確定 を
    /// 1つのトランザクションで行い、途中で失敗したらすべて巻き戻す
    ///
    /// # Arguments
    /// * `customer_id` - 顧客ID
    /// * `demands` - 注文要求のリスト（空は不可）
    ///
    /// # Returns
    /// * `Ok(Order)` - 作成された注文（ステータスはPending）
    /// * `Err(ApplicationError::Domain(DomainError::InsufficientStock))` - 最初に不足した商品
    pub async fn place_order(
        &self,
        customer_id: CustomerId,
        demands: Vec<Demand>,
    ) -> Result<Order, ApplicationError> {
        if demands.is_empty() {
            return Err(DomainError::EmptyOrder.into());
        }

        let store = self.uow.begin().await?;
        match self.assemble_order(&store, customer_id, &demands).await {
            Ok(order) => {
                self.uow.commit(store).await?;
                Ok(order)
            }
            Err(e) => {
                let _ = self.uow.rollback(store).await;
                Err(e)
            }
        }
    }

    /// カートから注文を作成する
    /// 注文の組み立てと同一トランザクション内の最終ステップとして
    /// カートを空にする。失敗時はカートも元のまま残る
    ///
    /// # Arguments
    /// * `cart` - 注文要求の元になるカート（空は不可）
    pub async fn place_order_from_cart(&self, cart: &Cart) -> Result<Order, ApplicationError> {
        if cart.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }
        let demands = cart.demands()?;

        let store = self.uow.begin().await?;
        let result = async {
            let order = self
                .assemble_order(&store, cart.customer_id(), &demands)
                .await?;
            store.clear_cart(cart.id()).await?;
            Ok(order)
        }
        .await;

        match result {
            Ok(order) => {
                self.uow.commit(store).await?;
                Ok(order)
            }
            Err(e) => {
                let _ = self.uow.rollback(store).await;
                Err(e)
            }
        }
    }

    /// 注文の組み立て本体
    /// 呼び出し側が開いたトランザクションの内部で動作する
    async fn assemble_order(
        &self,
        store: &U::Store,
        customer_id: CustomerId,
        demands: &[Demand],
    ) -> Result<Order, ApplicationError> {
        // バッチに触れる前に全要求を検証する
        // 最初に不足した商品のエラーを返す
        let mut products: Vec<Product> = Vec::with_capacity(demands.len());
        for demand in demands {
            let product = store
                .find_product(demand.product_id())
                .await?
                .ok_or_else(|| ApplicationError::NotFound(format!(
                    "商品が見つかりません: {}",
                    demand.product_id()
                )))?;
            if !product.has_stock(demand.quantity()) {
                return Err(DomainError::InsufficientStock {
                    product_id: product.id(),
                    requested: demand.quantity(),
                    available: product.available_stock(),
                }
                .into());
            }
            products.push(product);
        }

        let mut order = Order::new(OrderId::new(), customer_id, OrderNumber::generate());

        let allocator = FifoAllocator::new(store, self.notifier.as_ref());
        let mut subtotal = Money::zero();
        let mut discount = Money::zero();

        for (demand, product) in demands.iter().zip(products.iter_mut()) {
            let allocations = allocator.allocate(product, demand.quantity()).await?;

            for allocation in allocations {
                let line = OrderLine::new(
                    product.id(),
                    Some(allocation.batch_id()),
                    allocation.quantity(),
                    product.final_price(),
                    product.discount_percentage(),
                )?;
                subtotal = subtotal.add(&line.subtotal())?;
                order.add_line(line);
            }

            // 節約額 = 基準価格 × 数量 × 割引率 / 100（報告用）
            let saved = product
                .base_price()
                .multiply(demand.quantity())
                .percentage(product.discount_percentage());
            discount = discount.add(&saved)?;
        }

        order.set_totals(subtotal, discount);
        store.save_order(&order).await?;

        Ok(order)
    }

    /// 注文をキャンセルし、引き当てた在庫をバッチ単位で復元する
    /// Pendingの注文のみキャンセルできる。明細は監査証跡として残る
    ///
    /// # Arguments
    /// * `order_id` - キャンセルする注文のID
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, ApplicationError> {
        let store = self.uow.begin().await?;
        match self.cancel_order_in_tx(&store, order_id).await {
            Ok(order) => {
                self.uow.commit(store).await?;
                Ok(order)
            }
            Err(e) => {
                let _ = self.uow.rollback(store).await;
                Err(e)
            }
        }
    }

    async fn cancel_order_in_tx(
        &self,
        store: &U::Store,
        order_id: OrderId,
    ) -> Result<Order, ApplicationError> {
        let mut order = store
            .find_order(order_id)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("注文が見つかりません: {}", order_id))
            })?;

        // 状態ガードを最初に通す。在庫には一切触れない
        order.cancel()?;

        // 明細ごとに引き当て元バッチへ数量を戻す
        let mut touched_products: Vec<ProductId> = Vec::new();
        for line in order.lines().to_vec() {
            if let Some(batch_id) = line.batch_id() {
                let mut batch = store.find_batch(batch_id).await?.ok_or_else(|| {
                    ApplicationError::NotFound(format!("バッチが見つかりません: {}", batch_id))
                })?;
                batch.restore(line.quantity())?;
                store.save_batch(&batch).await?;
            }
            if !touched_products.contains(&line.product_id()) {
                touched_products.push(line.product_id());
            }
        }

        // 商品ごとに1回だけ再集計する
        let ledger = StockLedger::new(store, self.notifier.as_ref());
        for product_id in touched_products {
            let mut product = store.find_product(product_id).await?.ok_or_else(|| {
                ApplicationError::NotFound(format!("商品が見つかりません: {}", product_id))
            })?;
            ledger.recompute_aggregates(&mut product).await?;
        }

        store.save_order(&order).await?;
        Ok(order)
    }

    /// 注文IDで注文を取得する
    pub async fn order_by_id(&self, order_id: OrderId) -> Result<Order, ApplicationError> {
        let store = self.uow.begin().await?;
        let result = store.find_order(order_id).await;
        self.uow.commit(store).await?;
        result?.ok_or_else(|| {
            ApplicationError::NotFound(format!("注文が見つかりません: {}", order_id))
        })
    }

    /// 指定されたステータスの注文を取得する
    pub async fn orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, ApplicationError> {
        let store = self.uow.begin().await?;
        let result = store.find_orders_by_status(status).await;
        self.uow.commit(store).await?;
        Ok(result?)
    }

    /// 低在庫の商品を取得する
    pub async fn low_stock_products(&self) -> Result<Vec<Product>, ApplicationError> {
        let store = self.uow.begin().await?;
        let result = store.find_low_stock_products().await;
        self.uow.commit(store).await?;
        Ok(result?)
    }
}

/// 日次売上サマリー
/// キャンセル済みを含む、その日に作成された全注文の集計
#[derive(Debug, Clone, PartialEq)]
pub struct DailySalesSummary {
    /// 集計対象日
    pub date: NaiveDate,
    /// 注文件数
    pub order_count: usize,
    /// 販売点数（全明細の数量の合計）
    pub units_sold: u32,
    /// 売上合計
    pub total_revenue: Money,
    /// 割引合計（報告用の節約額）
    pub total_discount: Money,
}

/// 売上レポートサービス
pub struct SalesReportService<U: UnitOfWork> {
    uow: U,
}

impl<U: UnitOfWork> SalesReportService<U> {
    /// 新しい売上レポートサービスを作成
    pub fn new(uow: U) -> Self {
        Self { uow }
    }

    /// 指定された日の売上サマリーを集計する
    ///
    /// # Arguments
    /// * `date` - 集計対象日
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySalesSummary, ApplicationError> {
        let store = self.uow.begin().await?;
        let result = store.find_orders_placed_on(date).await;
        self.uow.commit(store).await?;
        let orders = result?;

        let mut units_sold = 0u32;
        let mut total_revenue = Money::zero();
        let mut total_discount = Money::zero();
        for order in &orders {
            units_sold += order.units();
            total_revenue = total_revenue.add(&order.total())?;
            total_discount = total_discount.add(&order.discount())?;
        }

        Ok(DailySalesSummary {
            date,
            order_count: orders.len(),
            units_sold,
            total_revenue,
            total_discount,
        })
    }
}
