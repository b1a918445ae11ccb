use crate::domain::model::ProductId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 在庫イベント列挙型
/// 在庫台帳の再集計が引き起こす通知義務を表現する
/// 配信手段（メール・キュー・ログ）は通知ポートの実装に委ねる
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StockEvent {
    /// 利用可能在庫がしきい値を下回った
    LowStockDetected(LowStockDetected),
    /// 在庫ゼロにより商品が販売停止になった
    ProductDeactivated(ProductDeactivated),
}

impl StockEvent {
    /// イベント種別名を取得
    pub fn event_type(&self) -> &'static str {
        match self {
            StockEvent::LowStockDetected(_) => "LowStockDetected",
            StockEvent::ProductDeactivated(_) => "ProductDeactivated",
        }
    }
}

/// 低在庫検知イベント
/// 再集計で利用可能在庫がしきい値以上からしきい値以下に転じたときに発生する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockDetected {
    /// 商品ID
    pub product_id: ProductId,
    /// 商品タイトル
    pub title: String,
    /// 再集計後の利用可能在庫
    pub available_stock: u32,
    /// 低在庫しきい値
    pub low_stock_threshold: u32,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl LowStockDetected {
    /// 新しい低在庫検知イベントを作成
    pub fn new(
        product_id: ProductId,
        title: String,
        available_stock: u32,
        low_stock_threshold: u32,
    ) -> Self {
        Self {
            product_id,
            title,
            available_stock,
            low_stock_threshold,
            occurred_at: Utc::now(),
        }
    }
}

/// 商品販売停止イベント
/// 利用可能在庫がちょうどゼロに達した再集計で、売り越し防止のため発生する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDeactivated {
    /// 商品ID
    pub product_id: ProductId,
    /// 商品タイトル
    pub title: String,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl ProductDeactivated {
    /// 新しい商品販売停止イベントを作成
    pub fn new(product_id: ProductId, title: String) -> Self {
        Self {
            product_id,
            title,
            occurred_at: Utc::now(),
        }
    }
}
