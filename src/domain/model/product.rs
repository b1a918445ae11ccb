use crate::domain::error::DomainError;
use crate::domain::model::{Money, ProductId};
use rust_decimal::Decimal;

/// 商品集約
/// カタログ価格（基準価格・割引率・最終価格）と在庫の集約カウンタを管理する
/// 集約カウンタの更新は在庫台帳（StockLedger）のみが行う
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    title: String,
    author: Option<String>,
    description: Option<String>,
    base_price: Money,
    discount_percentage: Decimal,
    final_price: Money,
    total_stock: u32,
    available_stock: u32,
    low_stock_threshold: u32,
    is_active: bool,
}

impl Product {
    /// 新しい商品を作成
    /// 在庫カウンタはゼロ、最終価格は基準価格と割引率から導出される
    ///
    /// # Arguments
    /// * `id` - 商品ID
    /// * `title` - タイトル
    /// * `base_price` - 基準価格
    /// * `discount_percentage` - 割引率（0〜100）
    /// * `low_stock_threshold` - 低在庫しきい値
    pub fn new(
        id: ProductId,
        title: String,
        base_price: Money,
        discount_percentage: Decimal,
        low_stock_threshold: u32,
    ) -> Result<Self, DomainError> {
        Self::validate_discount(discount_percentage)?;
        let final_price = Self::derive_final_price(base_price, discount_percentage);
        Ok(Self {
            id,
            title,
            author: None,
            description: None,
            base_price,
            discount_percentage,
            final_price,
            total_stock: 0,
            available_stock: 0,
            low_stock_threshold,
            is_active: true,
        })
    }

    /// データベースから取得したデータで商品を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: ProductId,
        title: String,
        author: Option<String>,
        description: Option<String>,
        base_price: Money,
        discount_percentage: Decimal,
        final_price: Money,
        total_stock: u32,
        available_stock: u32,
        low_stock_threshold: u32,
        is_active: bool,
    ) -> Result<Self, DomainError> {
        Self::validate_discount(discount_percentage)?;
        Ok(Self {
            id,
            title,
            author,
            description,
            base_price,
            discount_percentage,
            final_price,
            total_stock,
            available_stock,
            low_stock_threshold,
            is_active,
        })
    }

    fn validate_discount(discount_percentage: Decimal) -> Result<(), DomainError> {
        if discount_percentage < Decimal::ZERO || discount_percentage > Decimal::ONE_HUNDRED {
            return Err(DomainError::InvalidValue(format!(
                "割引率は0〜100の範囲である必要があります: {}",
                discount_percentage
            )));
        }
        Ok(())
    }

    /// 最終価格 = 基準価格 × (1 - 割引率/100)
    fn derive_final_price(base_price: Money, discount_percentage: Decimal) -> Money {
        base_price.percentage(Decimal::ONE_HUNDRED - discount_percentage)
    }

    /// 商品IDを取得
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// タイトルを取得
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 著者を取得
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// 説明を取得
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// 基準価格を取得
    pub fn base_price(&self) -> Money {
        self.base_price
    }

    /// 割引率を取得
    pub fn discount_percentage(&self) -> Decimal {
        self.discount_percentage
    }

    /// 最終価格（割引適用後）を取得
    pub fn final_price(&self) -> Money {
        self.final_price
    }

    /// 総在庫数（全バッチの初期数量の合計）を取得
    pub fn total_stock(&self) -> u32 {
        self.total_stock
    }

    /// 利用可能在庫数（全バッチの残量の合計）を取得
    pub fn available_stock(&self) -> u32 {
        self.available_stock
    }

    /// 低在庫しきい値を取得
    pub fn low_stock_threshold(&self) -> u32 {
        self.low_stock_threshold
    }

    /// 販売中かどうかを取得
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// 表示メタデータを設定
    pub fn set_display_metadata(&mut self, author: Option<String>, description: Option<String>) {
        self.author = author;
        self.description = description;
    }

    /// 価格を変更し、最終価格を再計算する
    /// 基準価格または割引率が変わるときは永続化前に必ずこのメソッドを通す
    pub fn set_pricing(
        &mut self,
        base_price: Money,
        discount_percentage: Decimal,
    ) -> Result<(), DomainError> {
        Self::validate_discount(discount_percentage)?;
        self.base_price = base_price;
        self.discount_percentage = discount_percentage;
        self.final_price = Self::derive_final_price(base_price, discount_percentage);
        Ok(())
    }

    /// 低在庫かどうかチェック（利用可能在庫 <= しきい値）
    pub fn is_low_stock(&self) -> bool {
        self.available_stock <= self.low_stock_threshold
    }

    /// 指定された数量の在庫が利用可能かチェック
    ///
    /// # Arguments
    /// * `quantity` - チェックする数量（1以上）
    pub fn has_stock(&self, quantity: u32) -> bool {
        quantity >= 1 && self.available_stock >= quantity
    }

    /// 集約カウンタを設定する
    /// 在庫台帳の再集計からのみ呼ばれる
    pub fn apply_stock_counts(&mut self, total_stock: u32, available_stock: u32) {
        self.total_stock = total_stock;
        self.available_stock = available_stock;
    }

    /// 商品を販売停止にする
    /// 利用可能在庫がゼロになったときに在庫台帳が呼び出す
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(base_cents: i64, discount: i64, threshold: u32) -> Product {
        Product::new(
            ProductId::new(),
            "Dark Fantasy Vol. 1".to_string(),
            Money::usd(Decimal::new(base_cents, 2)),
            Decimal::from(discount),
            threshold,
        )
        .unwrap()
    }

    #[test]
    fn test_final_price_derived_from_discount() {
        let product = product(10000, 20, 10); // 100.00, 20% off
        assert_eq!(product.final_price().amount(), Decimal::new(8000, 2));
    }

    #[test]
    fn test_final_price_without_discount() {
        let product = product(2999, 0, 10); // 29.99
        assert_eq!(product.final_price().amount(), Decimal::new(2999, 2));
    }

    #[test]
    fn test_set_pricing_recomputes_final_price() {
        let mut product = product(10000, 0, 10);
        product
            .set_pricing(Money::usd(Decimal::new(3999, 2)), Decimal::from(10))
            .unwrap();
        // 39.99 * 0.90 = 35.99 (丸め後)
        assert_eq!(product.final_price().amount(), Decimal::new(3599, 2));
    }

    #[test]
    fn test_invalid_discount_rejected() {
        let result = Product::new(
            ProductId::new(),
            "x".to_string(),
            Money::usd(Decimal::TEN),
            Decimal::from(101),
            5,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_new_product_has_zero_stock_and_is_active() {
        let product = product(1000, 0, 10);
        assert_eq!(product.total_stock(), 0);
        assert_eq!(product.available_stock(), 0);
        assert!(product.is_active());
    }

    #[test]
    fn test_has_stock() {
        let mut product = product(1000, 0, 10);
        product.apply_stock_counts(100, 40);
        assert!(product.has_stock(1));
        assert!(product.has_stock(40));
        assert!(!product.has_stock(41));
        assert!(!product.has_stock(0)); // 数量は1以上
    }

    #[test]
    fn test_is_low_stock_at_threshold() {
        let mut product = product(1000, 0, 10);
        product.apply_stock_counts(100, 11);
        assert!(!product.is_low_stock());
        product.apply_stock_counts(100, 10);
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_deactivate() {
        let mut product = product(1000, 0, 10);
        assert!(product.is_active());
        product.deactivate();
        assert!(!product.is_active());
    }
}
