// アダプター層
// データベース・ログ・通知などの技術的な詳細を実装する

pub mod database_config;
pub mod database_error;
pub mod database_migration;
pub mod driven;
