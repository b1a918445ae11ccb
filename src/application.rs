// アプリケーション層
// ユースケースの実装。トランザクション境界とドメインサービスの編成を担う

pub mod error;
pub mod service;
