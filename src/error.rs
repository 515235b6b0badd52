//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum ChessSetError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("API key not configured. Set GEMINI_API_KEY or run `chess-set-ai config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("Please enter a theme first.")]
    EmptyTheme,

    #[error("API error: {0}")]
    ApiCall(String),

    #[error("the service returned no usable content")]
    EmptyResult,

    #[error("malformed image data: {0}")]
    MalformedImage(String),

    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP生成エラー: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, ChessSetError>;
