// FIFOバッチ在庫引き当てエンジン
// 入荷バッチ単位で在庫を管理し、古いバッチから順に注文へ引き当てる

pub mod adapter;
pub mod application;
pub mod domain;
