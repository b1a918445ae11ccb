use crate::domain::error::DomainError;
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// ドメインエラーとインフラエラーをユースケースの失敗として束ねる
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApplicationError {
    /// ドメインルール違反
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
    /// リポジトリ操作の失敗
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 対象が見つからない
    #[error("Not found: {0}")]
    NotFound(String),
}
