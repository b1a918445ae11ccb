use crate::domain::event::StockEvent;
use crate::domain::port::{Logger, StockNotifier};
use std::collections::HashMap;
use std::sync::Arc;

/// コンソール在庫通知実装
/// 在庫イベントを警告レベルの構造化ログとして出力する
/// 本番ではメールやメッセージキューへの配信実装に差し替える想定
pub struct ConsoleStockNotifier {
    logger: Arc<dyn Logger>,
}

impl ConsoleStockNotifier {
    /// 新しいコンソール在庫通知を作成
    ///
    /// # Arguments
    /// * `logger` - 出力先のロガー
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

impl StockNotifier for ConsoleStockNotifier {
    fn notify(&self, event: &StockEvent) {
        let mut context = HashMap::new();
        context.insert("event_type".to_string(), event.event_type().to_string());

        // シリアライズできないイベントは握りつぶさずpayloadなしで出力する
        if let Ok(payload) = serde_json::to_string(event) {
            context.insert("payload".to_string(), payload);
        }

        let message = match event {
            StockEvent::LowStockDetected(e) => format!(
                "低在庫を検知しました: {} (残り{}個, しきい値{}個)",
                e.title, e.available_stock, e.low_stock_threshold
            ),
            StockEvent::ProductDeactivated(e) => {
                format!("在庫切れのため販売停止にしました: {}", e.title)
            }
        };

        self.logger.warn("StockNotifier", &message, Some(context));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::driven::console_logger::ConsoleLogger;
    use crate::domain::event::LowStockDetected;
    use crate::domain::model::ProductId;

    #[test]
    fn test_notify_low_stock() {
        let notifier = ConsoleStockNotifier::new(Arc::new(ConsoleLogger::new()));
        let event = StockEvent::LowStockDetected(LowStockDetected::new(
            ProductId::new(),
            "Dark Fantasy Vol. 1".to_string(),
            3,
            10,
        ));
        // 出力内容の検証は難しいため、パニックしないことのみ確認する
        notifier.notify(&event);
    }
}
