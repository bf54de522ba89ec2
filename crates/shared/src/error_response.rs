//! # エラーレスポンス
//!
//! 全エンドポイントで共通のエラーレスポンス構造体を提供する。
//!
//! ```json
//! {"error": "Missing required fields: customerEmail"}
//! ```
//!
//! ## 設計
//!
//! - `ErrorResponse` は純粋なデータ構造（`Serialize` / `Deserialize` のみ）
//! - axum の `IntoResponse` 変換はアプリ側の責務（shared に axum 依存を入れない）

use serde::{Deserialize, Serialize};

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    /// 必須項目不足
    ///
    /// `fields` は入力 JSON 上のパス（例: `"customerDetails.name"`）。
    pub fn missing_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let joined = fields
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(format!("Missing required fields: {joined}"))
    }
}
