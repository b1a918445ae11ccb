use crate::domain::error::DomainError;
use crate::domain::model::{BatchId, Money, ProductId};
use chrono::{NaiveDate, Utc};

/// 入荷バッチ
/// 1回の入荷に対応する在庫の単位。受領日がFIFO順序を定める
/// 初期数量は不変、残量は引き当てと返却でのみ増減する
#[derive(Debug, Clone, PartialEq)]
pub struct StockBatch {
    id: BatchId,
    product_id: ProductId,
    batch_number: String,
    received_date: NaiveDate,
    expiry_date: Option<NaiveDate>,
    cost_per_unit: Money,
    initial_quantity: u32,
    remaining_quantity: u32,
}

impl StockBatch {
    /// 新しい入荷バッチを作成
    /// 残量は初期数量と等しい状態で始まる
    ///
    /// # Arguments
    /// * `id` - バッチID
    /// * `product_id` - 対象商品のID
    /// * `batch_number` - カタログ側が採番する一意のバッチ番号
    /// * `received_date` - 受領日（FIFO順序の基準）
    /// * `expiry_date` - 賞味期限（任意）
    /// * `cost_per_unit` - 仕入れ単価
    /// * `initial_quantity` - 初期数量（1以上）
    pub fn new(
        id: BatchId,
        product_id: ProductId,
        batch_number: String,
        received_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
        cost_per_unit: Money,
        initial_quantity: u32,
    ) -> Result<Self, DomainError> {
        if initial_quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            id,
            product_id,
            batch_number,
            received_date,
            expiry_date,
            cost_per_unit,
            initial_quantity,
            remaining_quantity: initial_quantity,
        })
    }

    /// データベースから取得したデータでバッチを再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BatchId,
        product_id: ProductId,
        batch_number: String,
        received_date: NaiveDate,
        expiry_date: Option<NaiveDate>,
        cost_per_unit: Money,
        initial_quantity: u32,
        remaining_quantity: u32,
    ) -> Result<Self, DomainError> {
        if remaining_quantity > initial_quantity {
            return Err(DomainError::InvalidValue(format!(
                "バッチ残量が初期数量を超えています: {} > {}",
                remaining_quantity, initial_quantity
            )));
        }
        Ok(Self {
            id,
            product_id,
            batch_number,
            received_date,
            expiry_date,
            cost_per_unit,
            initial_quantity,
            remaining_quantity,
        })
    }

    /// バッチIDを取得
    pub fn id(&self) -> BatchId {
        self.id
    }

    /// 対象商品のIDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// バッチ番号を取得
    pub fn batch_number(&self) -> &str {
        &self.batch_number
    }

    /// 受領日を取得
    pub fn received_date(&self) -> NaiveDate {
        self.received_date
    }

    /// 賞味期限を取得
    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    /// 仕入れ単価を取得
    pub fn cost_per_unit(&self) -> Money {
        self.cost_per_unit
    }

    /// 初期数量を取得
    pub fn initial_quantity(&self) -> u32 {
        self.initial_quantity
    }

    /// 残量を取得
    pub fn remaining_quantity(&self) -> u32 {
        self.remaining_quantity
    }

    /// 残量があるかチェック
    pub fn has_stock(&self) -> bool {
        self.remaining_quantity > 0
    }

    /// 賞味期限切れかどうかチェック
    pub fn is_expired(&self) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry < Utc::now().date_naive(),
            None => false,
        }
    }

    /// 残量を引き当てる（アロケータからのみ呼ばれる）
    /// 残量は0未満にならない
    ///
    /// # Arguments
    /// * `quantity` - 引き当てる数量（1以上、残量以下）
    pub fn deduct(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 || quantity > self.remaining_quantity {
            return Err(DomainError::InvalidQuantity);
        }
        self.remaining_quantity -= quantity;
        Ok(())
    }

    /// 残量を返却する（キャンセル時の戻し入れ）
    /// 残量は初期数量を超えない
    ///
    /// # Arguments
    /// * `quantity` - 返却する数量（1以上、初期数量との差以下）
    pub fn restore(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 || self.remaining_quantity + quantity > self.initial_quantity {
            return Err(DomainError::InvalidQuantity);
        }
        self.remaining_quantity += quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn batch(initial: u32) -> StockBatch {
        StockBatch::new(
            BatchId::new(),
            ProductId::new(),
            "BATCH-0001".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            None,
            Money::usd(Decimal::new(1250, 2)),
            initial,
        )
        .unwrap()
    }

    #[test]
    fn test_new_batch_starts_full() {
        let batch = batch(50);
        assert_eq!(batch.initial_quantity(), 50);
        assert_eq!(batch.remaining_quantity(), 50);
        assert!(batch.has_stock());
    }

    #[test]
    fn test_zero_initial_quantity_rejected() {
        let result = StockBatch::new(
            BatchId::new(),
            ProductId::new(),
            "BATCH-0002".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            None,
            Money::usd(Decimal::ONE),
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_deduct_success() {
        let mut batch = batch(50);
        batch.deduct(30).unwrap();
        assert_eq!(batch.remaining_quantity(), 20);
    }

    #[test]
    fn test_deduct_to_zero() {
        let mut batch = batch(50);
        batch.deduct(50).unwrap();
        assert_eq!(batch.remaining_quantity(), 0);
        assert!(!batch.has_stock());
    }

    #[test]
    fn test_deduct_beyond_remaining_fails() {
        let mut batch = batch(10);
        let result = batch.deduct(11);
        assert!(result.is_err());
        assert_eq!(batch.remaining_quantity(), 10); // 残量は変わらない
    }

    #[test]
    fn test_restore_success() {
        let mut batch = batch(50);
        batch.deduct(30).unwrap();
        batch.restore(30).unwrap();
        assert_eq!(batch.remaining_quantity(), 50);
    }

    #[test]
    fn test_restore_beyond_initial_fails() {
        let mut batch = batch(50);
        batch.deduct(10).unwrap();
        let result = batch.restore(11);
        assert!(result.is_err());
        assert_eq!(batch.remaining_quantity(), 40);
    }

    #[test]
    fn test_reconstruct_rejects_inconsistent_quantities() {
        let result = StockBatch::reconstruct(
            BatchId::new(),
            ProductId::new(),
            "BATCH-0003".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            None,
            Money::usd(Decimal::ONE),
            10,
            11,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_is_expired() {
        let expired = StockBatch::new(
            BatchId::new(),
            ProductId::new(),
            "BATCH-0004".to_string(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            Some(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()),
            Money::usd(Decimal::ONE),
            5,
        )
        .unwrap();
        assert!(expired.is_expired());

        let fresh = batch(5);
        assert!(!fresh.is_expired());
    }
}
