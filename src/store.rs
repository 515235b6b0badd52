//! セット状態ストア
//!
//! 駒ごとの生成結果、テーマ、スタイルガイド、ローディング/エラー状態を
//! 一元保持する純粋な状態コンテナ。すべての操作は同期で、状態変更以外の
//! 副作用を持たない。書き込みはオーケストレータからのみ行う。

use crate::catalog::PieceKind;
use std::collections::HashMap;

/// 駒1体分の生成状態
#[derive(Debug, Clone)]
pub struct PieceRecord {
    pub kind: PieceKind,
    /// Data URL形式の画像。未生成ならNone
    pub image: Option<String>,
    /// 現在の画像を生んだプロンプト、または編集マーカー
    pub prompt_used: Option<String>,
}

impl PieceRecord {
    fn empty(kind: PieceKind) -> Self {
        Self { kind, image: None, prompt_used: None }
    }
}

/// テーマから導出したスタイルガイド
#[derive(Debug, Clone)]
pub struct StyleGuide {
    pub text: String,
    /// 導出元テーマ（トリム済み）。キャッシュキーとして扱う
    pub source_theme: String,
}

impl StyleGuide {
    /// テーマ`theme`に対して失効しているか
    ///
    /// 大文字小文字・前後空白の違いは同一テーマとみなす。
    pub fn is_stale(&self, theme: &str) -> bool {
        self.source_theme.to_lowercase() != theme.trim().to_lowercase()
    }
}

/// ユーザー向けエラー（同時に1件のみ保持）
#[derive(Debug, Clone)]
pub struct GlobalError {
    pub message: String,
    /// 設定エラー（APIキー欠如）はテーマ編集では消えない
    pub persistent: bool,
}

/// 編集セッション
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    pub target: Option<PieceKind>,
    pub is_editing: bool,
}

/// セット全体の状態
pub struct SetStore {
    pieces: HashMap<PieceKind, PieceRecord>,
    loading: HashMap<PieceKind, bool>,
    theme: String,
    style_guide: Option<StyleGuide>,
    error: Option<GlobalError>,
    pub is_generating_all: bool,
    pub is_generating_style_guide: bool,
    edit: EditSession,
}

impl SetStore {
    pub fn new() -> Self {
        Self {
            pieces: PieceKind::ALL
                .iter()
                .map(|&k| (k, PieceRecord::empty(k)))
                .collect(),
            loading: PieceKind::ALL.iter().map(|&k| (k, false)).collect(),
            theme: String::new(),
            style_guide: None,
            error: None,
            is_generating_all: false,
            is_generating_style_guide: false,
            edit: EditSession::default(),
        }
    }

    /// プロセス開始直後と等価な状態に戻す
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ---- ChessSet ----

    pub fn piece(&self, kind: PieceKind) -> &PieceRecord {
        // newで全種を挿入済み
        &self.pieces[&kind]
    }

    /// カタログ順の全レコード
    pub fn pieces_in_order(&self) -> impl Iterator<Item = &PieceRecord> {
        PieceKind::ALL.iter().map(|k| &self.pieces[k])
    }

    pub fn has_any_image(&self) -> bool {
        self.pieces.values().any(|p| p.image.is_some())
    }

    /// 生成/編集成功時の上書き
    pub fn set_piece_result(&mut self, kind: PieceKind, image: String, prompt_used: String) {
        self.pieces.insert(
            kind,
            PieceRecord { kind, image: Some(image), prompt_used: Some(prompt_used) },
        );
    }

    /// 失敗時に画像を破棄してタイルを「生成可能」状態へ戻す
    pub fn clear_piece_image(&mut self, kind: PieceKind) {
        self.pieces.insert(kind, PieceRecord::empty(kind));
    }

    // ---- テーマ ----

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// テーマ編集。設定エラー以外のGlobalErrorはここで消す
    pub fn set_theme(&mut self, theme: &str) {
        self.theme = theme.to_string();
        if !self.error.as_ref().map(|e| e.persistent).unwrap_or(false) {
            self.error = None;
        }
    }

    // ---- スタイルガイド ----

    pub fn style_guide(&self) -> Option<&StyleGuide> {
        self.style_guide.as_ref()
    }

    pub fn set_style_guide(&mut self, text: String, source_theme: &str) {
        self.style_guide = Some(StyleGuide {
            text,
            source_theme: source_theme.trim().to_string(),
        });
    }

    pub fn clear_style_guide(&mut self) {
        self.style_guide = None;
    }

    // ---- ローディングフラグ ----

    pub fn is_loading(&self, kind: PieceKind) -> bool {
        self.loading.get(&kind).copied().unwrap_or(false)
    }

    pub fn set_loading(&mut self, kind: PieceKind, loading: bool) {
        self.loading.insert(kind, loading);
    }

    pub fn set_batch(&mut self, generating: bool) {
        self.is_generating_all = generating;
    }

    pub fn set_style_guide_loading(&mut self, generating: bool) {
        self.is_generating_style_guide = generating;
    }

    // ---- GlobalError ----

    pub fn error(&self) -> Option<&GlobalError> {
        self.error.as_ref()
    }

    /// 通常エラーの上書き/クリア
    pub fn set_error(&mut self, message: Option<String>) {
        self.error = message.map(|m| GlobalError { message: m, persistent: false });
    }

    /// 設定エラー（APIキー欠如）。テーマ編集では消えない
    pub fn set_config_error(&mut self, message: String) {
        self.error = Some(GlobalError { message, persistent: true });
    }

    /// バッチ早期打ち切り判定用: 直近のエラーが駒生成失敗か
    pub fn has_generation_failure(&self) -> bool {
        self.error
            .as_ref()
            .map(|e| e.message.starts_with("Failed to generate"))
            .unwrap_or(false)
    }

    // ---- 編集セッション ----

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn open_edit(&mut self, kind: PieceKind) {
        self.edit.target = Some(kind);
    }

    /// 編集セッションを閉じる。編集が進行中の間はno-op
    /// （処理中の変異を孤児化させないため）。
    pub fn close_edit(&mut self) {
        if self.edit.is_editing {
            return;
        }
        self.edit.target = None;
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.edit.is_editing = editing;
    }
}

impl Default for SetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_has_all_six_empty_records() {
        let store = SetStore::new();
        let records: Vec<&PieceRecord> = store.pieces_in_order().collect();
        assert_eq!(records.len(), 6);
        for (record, kind) in records.iter().zip(PieceKind::ALL) {
            assert_eq!(record.kind, kind);
            assert!(record.image.is_none());
            assert!(record.prompt_used.is_none());
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut store = SetStore::new();
        store.set_theme("Cyberpunk");
        store.set_style_guide("neon chrome".into(), "Cyberpunk");
        store.set_piece_result(PieceKind::King, "data:image/png;base64,AA".into(), "p".into());
        store.set_loading(PieceKind::Queen, true);
        store.set_batch(true);
        store.set_style_guide_loading(true);
        store.set_error(Some("Failed to generate King: boom".into()));
        store.open_edit(PieceKind::King);

        store.reset();

        assert_eq!(store.theme(), "");
        assert!(store.style_guide().is_none());
        assert!(store.error().is_none());
        assert!(!store.is_generating_all);
        assert!(!store.is_generating_style_guide);
        assert!(store.edit_session().target.is_none());
        for kind in PieceKind::ALL {
            assert!(store.piece(kind).image.is_none());
            assert!(!store.is_loading(kind));
        }
    }

    #[test]
    fn test_clear_piece_image_drops_prompt_too() {
        let mut store = SetStore::new();
        store.set_piece_result(PieceKind::Rook, "data:image/png;base64,AA".into(), "p".into());
        store.clear_piece_image(PieceKind::Rook);
        let record = store.piece(PieceKind::Rook);
        assert_eq!(record.kind, PieceKind::Rook);
        assert!(record.image.is_none());
        assert!(record.prompt_used.is_none());
    }

    #[test]
    fn test_style_guide_staleness_is_case_and_trim_insensitive() {
        let guide = StyleGuide { text: "g".into(), source_theme: "Gothic Cathedral".into() };
        assert!(!guide.is_stale("Gothic Cathedral"));
        assert!(!guide.is_stale("  gothic cathedral  "));
        assert!(!guide.is_stale("GOTHIC CATHEDRAL"));
        assert!(guide.is_stale("Gothic"));
        assert!(guide.is_stale(""));
    }

    #[test]
    fn test_set_theme_clears_operational_error_only() {
        let mut store = SetStore::new();
        store.set_error(Some("Failed to generate King: boom".into()));
        store.set_theme("new theme");
        assert!(store.error().is_none());

        store.set_config_error("API key not configured".into());
        store.set_theme("another theme");
        assert!(store.error().is_some());
        assert!(store.error().unwrap().persistent);
    }

    #[test]
    fn test_close_edit_is_noop_while_editing() {
        let mut store = SetStore::new();
        store.open_edit(PieceKind::Bishop);
        store.set_editing(true);

        store.close_edit();
        assert_eq!(store.edit_session().target, Some(PieceKind::Bishop));

        store.set_editing(false);
        store.close_edit();
        assert!(store.edit_session().target.is_none());
    }

    #[test]
    fn test_generation_failure_detection() {
        let mut store = SetStore::new();
        assert!(!store.has_generation_failure());

        store.set_error(Some("Failed to establish art direction: boom".into()));
        assert!(!store.has_generation_failure());

        store.set_error(Some("Failed to generate Rook: rejected".into()));
        assert!(store.has_generation_failure());
    }
}
