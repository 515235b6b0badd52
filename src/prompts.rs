//! プロンプト生成モジュール
//!
//! - build_style_guide_prompt: テーマからスタイルガイドを起こすプロンプト
//! - compose_piece_prompt: 駒1体分の画像生成プロンプト
//!
//! compose_piece_promptのテンプレートはセット全体の画風統一の要。
//! スタイルガイド本文は要約せず、必ずそのまま埋め込む。

use crate::catalog::PieceKind;

/// 駒プロンプト共通の末尾指定
const PIECE_PROMPT_SUFFIX: &str = "Detailed, iconic chess piece design, suitable for a digital chess set, clear silhouette, on a neutral studio background.";

/// スタイルガイド生成用プロンプト
///
/// # Arguments
/// * `theme` - ユーザー入力のテーマ（トリム済みを渡す）
pub fn build_style_guide_prompt(theme: &str) -> String {
    format!(
        r#"You are an art director designing a themed chess set.

Theme: "{theme}"

Write a concise art direction style guide for the whole set: overall mood, materials, color palette, lighting, and rendering style. Every piece in the set will be generated from this guide, so keep it specific and self-contained.

Respond with a single paragraph of plain text. No headings, no lists, no preamble."#
    )
}

/// 駒1体分のフルプロンプトを合成
///
/// 同一のスタイルガイド文字列を全駒に逐語で埋め込むことで
/// セットの視覚的一貫性を担保する。
pub fn compose_piece_prompt(kind: PieceKind, theme: &str, style_guide: &str) -> String {
    format!(
        "{}. The piece must strictly adhere to the following artistic style guide: \"{}\". Use the theme \"{}\" as inspiration. {}",
        kind.base_description(),
        style_guide,
        theme,
        PIECE_PROMPT_SUFFIX,
    )
}
