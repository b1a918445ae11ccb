use crate::domain::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 商品の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(Uuid);

impl ProductId {
    /// 新しい一意のProductIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから ProductId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からProductIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

/// 入荷バッチの一意識別子
/// FIFO順序の同日タイブレークに使うため全順序を持つ
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchId(Uuid);

impl BatchId {
    /// 新しい一意のBatchIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BatchId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBatchIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// 注文の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// 新しい一意のOrderIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから OrderId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からOrderIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

/// 顧客の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// 新しい一意のCustomerIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CustomerId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCustomerIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

/// カートの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartId(Uuid);

impl CartId {
    /// 新しい一意のCartIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから CartId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からCartIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 米ドル
    #[allow(clippy::upper_case_acronyms)]
    USD,
}

/// 金額を表す値オブジェクト
/// 固定小数点（Decimal）で保持し、浮動小数点は一切使わない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// 金額と通貨コードから作成
    pub fn new(amount: Decimal, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "USD" => Currency::USD,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self {
            amount: amount.round_dp(2),
            currency,
        })
    }

    /// 米ドルの金額を作成（小数点以下2桁に丸める）
    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount: amount.round_dp(2),
            currency: Currency::USD,
        }
    }

    /// ゼロ金額を作成
    pub fn zero() -> Self {
        Self::usd(Decimal::ZERO)
    }

    /// 金額を取得
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::USD => "USD".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 数量を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * Decimal::from(factor),
            currency: self.currency,
        }
    }

    /// パーセンテージ分の金額を計算（小数点以下2桁に丸める）
    /// 最終価格の導出や割引額の算出に使う
    pub fn percentage(&self, percent: Decimal) -> Money {
        Money {
            amount: (self.amount * percent / Decimal::ONE_HUNDRED).round_dp(2),
            currency: self.currency,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount.round_dp(2), self.currency())
    }
}

/// 注文番号を表す値オブジェクト
/// 形式は ORD-YYYYMMDD-XXXXXX、グローバルに一意
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// 新しい注文番号を生成
    pub fn generate() -> Self {
        let date = chrono::Utc::now().format("%Y%m%d");
        let uuid = Uuid::new_v4().simple().to_string();
        let suffix = uuid[..6].to_uppercase();
        Self(format!("ORD-{}-{}", date, suffix))
    }

    /// 既存の注文番号文字列から作成（リポジトリでの再構築用）
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// 内部の文字列を取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 注文のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// 保留中（作成直後、キャンセル可能）
    Pending,
    /// 処理中
    Processing,
    /// 完了
    Completed,
    /// キャンセル済み
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", status_str)
    }
}

impl OrderStatus {
    /// 文字列からOrderStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Processing" => Ok(OrderStatus::Processing),
            "Completed" => Ok(OrderStatus::Completed),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な注文ステータス: {}",
                s
            ))),
        }
    }
}

/// 注文明細を表す値オブジェクト
/// 1つのバッチから引き当てた数量と、その時点の価格スナップショットを保持する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    product_id: ProductId,
    batch_id: Option<BatchId>,
    quantity: u32,
    unit_price: Money,
    discount_percentage: Decimal,
}

impl OrderLine {
    /// 新しい注文明細を作成
    /// 数量は1以上である必要がある
    /// batch_idは引き当て元バッチ。旧データ由来の明細のみNoneを許す
    pub fn new(
        product_id: ProductId,
        batch_id: Option<BatchId>,
        quantity: u32,
        unit_price: Money,
        discount_percentage: Decimal,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            product_id,
            batch_id,
            quantity,
            unit_price,
            discount_percentage,
        })
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 引き当て元バッチIDを取得
    pub fn batch_id(&self) -> Option<BatchId> {
        self.batch_id
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 単価（注文時スナップショット）を取得
    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    /// 割引率（注文時スナップショット）を取得
    pub fn discount_percentage(&self) -> Decimal {
        self.discount_percentage
    }

    /// 小計を計算（単価 × 数量）
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// 注文要求を表す値オブジェクト
/// 商品と数量のペア。カート由来か直接注文かは関知しない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    product_id: ProductId,
    quantity: u32,
}

impl Demand {
    /// 新しい注文要求を作成
    /// 数量は1以上である必要がある
    pub fn new(product_id: ProductId, quantity: u32) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        Ok(Self {
            product_id,
            quantity,
        })
    }

    /// 商品IDを取得
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// 数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// 引き当て結果を表す値オブジェクト
/// どのバッチから何個取ったかのペア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    batch_id: BatchId,
    quantity: u32,
}

impl Allocation {
    /// 新しい引き当て結果を作成
    pub fn new(batch_id: BatchId, quantity: u32) -> Self {
        Self { batch_id, quantity }
    }

    /// 引き当て元バッチIDを取得
    pub fn batch_id(&self) -> BatchId {
        self.batch_id
    }

    /// 引き当てた数量を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_creation() {
        let id1 = ProductId::new();
        let id2 = ProductId::new();
        assert_ne!(id1, id2, "Each ProductId should be unique");
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::usd(Decimal::new(1000, 2)); // 10.00
        let money2 = Money::usd(Decimal::new(550, 2)); // 5.50
        let result = money1.add(&money2).unwrap();
        assert_eq!(result.amount(), Decimal::new(1550, 2));
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::usd(Decimal::new(2999, 2)); // 29.99
        let result = money.multiply(3);
        assert_eq!(result.amount(), Decimal::new(8997, 2));
    }

    #[test]
    fn test_money_percentage() {
        let money = Money::usd(Decimal::new(10000, 2)); // 100.00
        let result = money.percentage(Decimal::from(20));
        assert_eq!(result.amount(), Decimal::new(2000, 2)); // 20.00
    }

    #[test]
    fn test_money_unsupported_currency() {
        let result = Money::new(Decimal::ONE, "JPY".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_order_number_format() {
        let number = OrderNumber::generate();
        let parts: Vec<&str> = number.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
    }

    #[test]
    fn test_order_number_uniqueness() {
        let n1 = OrderNumber::generate();
        let n2 = OrderNumber::generate();
        assert_ne!(n1, n2);
    }

    #[test]
    fn test_order_line_creation() {
        let product_id = ProductId::new();
        let batch_id = BatchId::new();
        let price = Money::usd(Decimal::new(1999, 2)); // 19.99
        let line = OrderLine::new(product_id, Some(batch_id), 2, price, Decimal::ZERO).unwrap();
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.subtotal().amount(), Decimal::new(3998, 2));
        assert_eq!(line.batch_id(), Some(batch_id));
    }

    #[test]
    fn test_order_line_invalid_quantity() {
        let product_id = ProductId::new();
        let price = Money::usd(Decimal::TEN);
        let result = OrderLine::new(product_id, None, 0, price, Decimal::ZERO);
        assert!(result.is_err());
    }

    #[test]
    fn test_demand_requires_positive_quantity() {
        let product_id = ProductId::new();
        assert!(Demand::new(product_id, 0).is_err());
        assert!(Demand::new(product_id, 1).is_ok());
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let parsed = OrderStatus::from_string(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(OrderStatus::from_string("Shipped").is_err());
    }
}
