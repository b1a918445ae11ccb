use crate::domain::error::DomainError;
use crate::domain::model::{CustomerId, Money, OrderId, OrderLine, OrderNumber, OrderStatus};
use chrono::{DateTime, Utc};

/// 注文集約
/// 注文のライフサイクルと合計金額を管理する
/// 割引は単価に織り込み済みのため total == subtotal が常に成り立ち、
/// discount は基準価格から計算した「節約額」の報告用の数値に過ぎない
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    order_number: OrderNumber,
    lines: Vec<OrderLine>,
    subtotal: Money,
    discount: Money,
    total: Money,
    status: OrderStatus,
    placed_at: DateTime<Utc>,
}

impl Order {
    /// 新しい注文を作成
    /// 初期ステータスはPending、合計金額はゼロ
    pub fn new(id: OrderId, customer_id: CustomerId, order_number: OrderNumber) -> Self {
        Self {
            id,
            customer_id,
            order_number,
            lines: Vec::new(),
            subtotal: Money::zero(),
            discount: Money::zero(),
            total: Money::zero(),
            status: OrderStatus::Pending,
            placed_at: Utc::now(),
        }
    }

    /// データベースから取得したデータで注文を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: OrderId,
        customer_id: CustomerId,
        order_number: OrderNumber,
        lines: Vec<OrderLine>,
        subtotal: Money,
        discount: Money,
        total: Money,
        status: OrderStatus,
        placed_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            customer_id,
            order_number,
            lines,
            subtotal,
            discount,
            total,
            status,
            placed_at,
        })
    }

    /// 注文IDを取得
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// 顧客IDを取得
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// 注文番号を取得
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// 注文明細のリストを取得
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// 小計を取得
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// 割引額（報告用の節約額）を取得
    pub fn discount(&self) -> Money {
        self.discount
    }

    /// 合計金額を取得
    pub fn total(&self) -> Money {
        self.total
    }

    /// 注文ステータスを取得
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// 注文日時を取得
    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    /// 注文明細を追加
    /// アロケータの引き当て結果1件につき1明細が追加される
    pub fn add_line(&mut self, line: OrderLine) {
        self.lines.push(line);
    }

    /// 合計金額を確定する
    /// total は常に subtotal と等しい（割引は単価に織り込み済み）
    pub fn set_totals(&mut self, subtotal: Money, discount: Money) {
        self.subtotal = subtotal;
        self.discount = discount;
        self.total = subtotal;
    }

    /// 全明細の数量の合計を取得
    pub fn units(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity()).sum()
    }

    /// 注文を処理中にマーク
    /// 事前条件: ステータスがPending
    pub fn mark_as_processing(&mut self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::InvalidOrderState {
                order_id: self.id,
                status: self.status,
            });
        }
        self.status = OrderStatus::Processing;
        Ok(())
    }

    /// 注文を完了にマーク
    /// 事前条件: ステータスがProcessing
    pub fn mark_as_completed(&mut self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Processing {
            return Err(DomainError::InvalidOrderState {
                order_id: self.id,
                status: self.status,
            });
        }
        self.status = OrderStatus::Completed;
        Ok(())
    }

    /// 注文をキャンセル
    /// 事前条件: ステータスがPending
    /// 処理中・完了済みの注文はキャンセルできない
    /// 明細は監査証跡として残る（削除しない）
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::InvalidOrderState {
                order_id: self.id,
                status: self.status,
            });
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}
