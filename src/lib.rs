//! Chess Set AI
//!
//! テーマ文字列からアートディレクション（スタイルガイド）を起こし、
//! 同一ガイドを全プロンプトに埋め込むことで6種の駒画像を一貫した画風で
//! 生成・編集・エクスポートするツール。

pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod prompts;
pub mod session;
pub mod store;

pub use catalog::PieceKind;
pub use client::{GeminiClient, GenerationClient};
pub use config::Config;
pub use error::{ChessSetError, Result};
pub use orchestrator::Orchestrator;
pub use store::{SetStore, StyleGuide};
