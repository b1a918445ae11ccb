// ドリブンアダプター（出力側）
// ドメイン層のポートに対する具体的な実装

pub mod console_logger;
pub mod console_notifier;
pub mod mysql_store;
