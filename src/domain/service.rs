// ドメインサービス
// 在庫台帳とFIFOアロケータ。複数の集約（商品とバッチ）にまたがる中核ロジック

use crate::domain::error::DomainError;
use crate::domain::event::{LowStockDetected, ProductDeactivated, StockEvent};
use crate::domain::model::{Allocation, Product};
use crate::domain::port::{StockNotifier, StockStore};

/// 在庫台帳
/// 商品の集約カウンタ（総在庫・利用可能在庫）をバッチ残量の合計と一致させる
pub struct StockLedger<'a, S: StockStore> {
    store: &'a S,
    notifier: &'a dyn StockNotifier,
}

impl<'a, S: StockStore> StockLedger<'a, S> {
    /// 新しい在庫台帳を作成
    ///
    /// # Arguments
    /// * `store` - トランザクション内で動作する在庫ストア
    /// * `notifier` - 低在庫・販売停止の通知先
    pub fn new(store: &'a S, notifier: &'a dyn StockNotifier) -> Self {
        Self { store, notifier }
    }

    /// 商品の集約カウンタを再集計して保存する
    /// 総在庫 = 全バッチの初期数量の合計、利用可能在庫 = 全バッチの残量の合計
    /// バッチを変更した呼び出し側が、商品ごとに1回だけ呼ぶ責任を持つ
    ///
    /// 再集計の事後条件:
    /// - 利用可能在庫がしきい値以上からしきい値以下に転じたら低在庫イベントを通知する
    /// - 利用可能在庫がゼロに達し販売中なら、売り越し防止のため販売停止にして通知する
    pub async fn recompute_aggregates(&self, product: &mut Product) -> Result<(), DomainError> {
        let batches = self
            .store
            .find_batches(product.id())
            .await
            .map_err(|e| DomainError::Repository(format!("バッチの取得に失敗: {}", e)))?;

        let total_stock = batches.iter().map(|b| b.initial_quantity()).sum();
        let available_stock = batches.iter().map(|b| b.remaining_quantity()).sum();

        let was_low = product.is_low_stock();
        product.apply_stock_counts(total_stock, available_stock);

        let deactivated = if product.available_stock() == 0 && product.is_active() {
            product.deactivate();
            true
        } else {
            false
        };

        self.store
            .save_product(product)
            .await
            .map_err(|e| DomainError::Repository(format!("商品の保存に失敗: {}", e)))?;

        if !was_low && product.is_low_stock() {
            self.notifier.notify(&StockEvent::LowStockDetected(LowStockDetected::new(
                product.id(),
                product.title().to_string(),
                product.available_stock(),
                product.low_stock_threshold(),
            )));
        }

        if deactivated {
            self.notifier.notify(&StockEvent::ProductDeactivated(ProductDeactivated::new(
                product.id(),
                product.title().to_string(),
            )));
        }

        Ok(())
    }
}

/// FIFOアロケータ
/// 1つの（商品, 数量）要求を、受領日の古いバッチから順に引き当てる
pub struct FifoAllocator<'a, S: StockStore> {
    store: &'a S,
    notifier: &'a dyn StockNotifier,
}

impl<'a, S: StockStore> FifoAllocator<'a, S> {
    /// 新しいFIFOアロケータを作成
    ///
    /// # Arguments
    /// * `store` - トランザクション内で動作する在庫ストア
    /// * `notifier` - 再集計の通知先
    pub fn new(store: &'a S, notifier: &'a dyn StockNotifier) -> Self {
        Self { store, notifier }
    }

    /// 要求数量をバッチ引き当ての列に分解する
    ///
    /// 1. 集約カウンタで事前チェックし、不足ならバッチに触れる前に失敗する
    /// 2. 残量のあるバッチを (受領日 ASC, バッチID ASC) で取得する
    /// 3. 各バッチから min(残要求, バッチ残量) を引き落として保存し、結果に追加する
    /// 4. バッチを使い切っても残要求が残る場合は集約カウンタとバッチ行の
    ///    不整合なので、StockInconsistency で失敗しトランザクションを破棄させる
    /// 5. 成功時は商品ごとに1回だけ集約カウンタを再集計する
    ///
    /// # Arguments
    /// * `product` - 対象商品（集約カウンタが再集計される）
    /// * `quantity` - 要求数量（1以上）
    ///
    /// # Returns
    /// * `Ok(Vec<Allocation>)` - FIFO順の引き当て結果
    /// * `Err(DomainError::InsufficientStock)` - 在庫不足（バッチは未変更）
    /// * `Err(DomainError::StockInconsistency)` - 台帳の不整合（致命的）
    pub async fn allocate(
        &self,
        product: &mut Product,
        quantity: u32,
    ) -> Result<Vec<Allocation>, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        if !product.has_stock(quantity) {
            return Err(DomainError::InsufficientStock {
                product_id: product.id(),
                requested: quantity,
                available: product.available_stock(),
            });
        }

        let batches = self
            .store
            .find_available_batches(product.id())
            .await
            .map_err(|e| DomainError::Repository(format!("バッチの取得に失敗: {}", e)))?;

        let mut remaining_to_allocate = quantity;
        let mut allocations = Vec::new();

        for mut batch in batches {
            if remaining_to_allocate == 0 {
                break;
            }

            let quantity_from_batch = remaining_to_allocate.min(batch.remaining_quantity());
            batch.deduct(quantity_from_batch)?;
            self.store
                .save_batch(&batch)
                .await
                .map_err(|e| DomainError::Repository(format!("バッチの保存に失敗: {}", e)))?;

            allocations.push(Allocation::new(batch.id(), quantity_from_batch));
            remaining_to_allocate -= quantity_from_batch;
        }

        if remaining_to_allocate > 0 {
            // 事前チェックは通ったのにバッチが足りない
            // 集約カウンタが実際のバッチ行からずれている
            return Err(DomainError::StockInconsistency {
                product_id: product.id(),
            });
        }

        StockLedger::new(self.store, self.notifier)
            .recompute_aggregates(product)
            .await?;

        Ok(allocations)
    }
}
