use crate::domain::model::{OrderId, OrderStatus, ProductId};

/// ドメイン層のエラー型
/// ビジネスルール違反と在庫台帳の不整合を表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// 在庫不足（呼び出し側で回復可能。注文・引き当ては行われない）
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },
    /// 集約カウンタとバッチ行の不整合
    /// 台帳のバグか直接書き込みを示すため、当該操作は中断しトランザクションを破棄する
    #[error("Stock ledger inconsistency for product {product_id}: aggregate counter disagrees with batch rows")]
    StockInconsistency { product_id: ProductId },
    /// 空の注文要求リスト
    #[error("Order demands are empty")]
    EmptyOrder,
    /// 空のカート
    #[error("Cart is empty")]
    EmptyCart,
    /// 無効な注文状態（例: 処理中の注文をキャンセルしようとした）
    #[error("Invalid order state for order {order_id}: {status}")]
    InvalidOrderState {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// 無効な数量（0以下の数量、バッチ残量の範囲外など）
    #[error("Invalid quantity")]
    InvalidQuantity,
    /// 通貨の不一致
    #[error("Currency mismatch")]
    CurrencyMismatch,
    /// 無効な値
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// リポジトリ操作の失敗（ドメインサービス内で発生した永続化エラー）
    #[error("Repository error: {0}")]
    Repository(String),
}
