// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::event::StockEvent;
use crate::domain::model::{
    BatchId, CartId, Order, OrderId, OrderStatus, Product, ProductId, StockBatch,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// リポジトリエラー型
/// ストレージ操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// データベース接続に失敗
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// 操作に失敗
    #[error("Operation failed: {0}")]
    OperationFailed(String),
    /// データの取得に失敗
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

/// 在庫ストアトレイト
/// 商品・バッチ・注文の永続化を抽象化する
/// 実装はUnitOfWorkが開いた1つのトランザクションの内部で動作する
#[async_trait]
pub trait StockStore: Send + Sync {
    /// 商品IDで商品を検索する
    ///
    /// # Returns
    /// * `Ok(Some(Product))` - 商品が見つかった
    /// * `Ok(None)` - 商品が見つからなかった
    async fn find_product(&self, product_id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// 商品を保存する
    async fn save_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// 低在庫の商品を取得する（利用可能在庫 <= しきい値）
    async fn find_low_stock_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// 商品の全バッチを取得する
    /// 集約カウンタの再集計に使う（残量ゼロのバッチも含む）
    async fn find_batches(&self, product_id: ProductId) -> Result<Vec<StockBatch>, RepositoryError>;

    /// 商品の残量のあるバッチをFIFO順で取得する
    /// 受領日の昇順、同日はバッチIDの昇順で並べて返す
    async fn find_available_batches(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StockBatch>, RepositoryError>;

    /// バッチIDでバッチを検索する
    async fn find_batch(&self, batch_id: BatchId) -> Result<Option<StockBatch>, RepositoryError>;

    /// バッチを保存する
    async fn save_batch(&self, batch: &StockBatch) -> Result<(), RepositoryError>;

    /// 注文を明細ごと保存する
    async fn save_order(&self, order: &Order) -> Result<(), RepositoryError>;

    /// 注文IDで注文を検索する
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// 指定されたステータスの注文を取得する
    /// 注文日時の降順で並べて返す
    async fn find_orders_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError>;

    /// 指定された日に作成された注文を取得する
    /// 日次売上レポートに使う
    async fn find_orders_placed_on(&self, date: NaiveDate)
        -> Result<Vec<Order>, RepositoryError>;

    /// カートの明細をすべて削除する
    /// カート注文の最終ステップとして同一トランザクション内で呼ばれる
    async fn clear_cart(&self, cart_id: CartId) -> Result<(), RepositoryError>;
}

/// トランザクション境界トレイト
/// 複数ステップの変更を1つの原子的なトランザクションにまとめる
/// begin が返したストアへの書き込みは commit まで確定せず、
/// rollback またはドロップですべて破棄される
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Store: StockStore;

    /// トランザクションを開始し、その内部で動作するストアを返す
    async fn begin(&self) -> Result<Self::Store, RepositoryError>;

    /// トランザクションを確定する
    async fn commit(&self, store: Self::Store) -> Result<(), RepositoryError>;

    /// トランザクションを破棄する
    async fn rollback(&self, store: Self::Store) -> Result<(), RepositoryError>;
}

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(&self, component: &str, message: &str, context: Option<HashMap<String, String>>);

    /// 情報レベルのログを出力
    fn info(&self, component: &str, message: &str, context: Option<HashMap<String, String>>);

    /// 警告レベルのログを出力
    fn warn(&self, component: &str, message: &str, context: Option<HashMap<String, String>>);

    /// エラーレベルのログを出力
    fn error(&self, component: &str, message: &str, context: Option<HashMap<String, String>>);
}

/// 在庫通知トレイト
/// 低在庫検知・販売停止の通知義務を外部に引き渡すポート
/// 配信の失敗は在庫変更を妨げないため、戻り値を持たない
pub trait StockNotifier: Send + Sync {
    /// 在庫イベントを通知する
    fn notify(&self, event: &StockEvent);
}

/// 何もしない通知実装
/// 通知先が不要なバッチ処理やテストでの使用を想定
pub struct NullStockNotifier;

impl StockNotifier for NullStockNotifier {
    fn notify(&self, _event: &StockEvent) {}
}
