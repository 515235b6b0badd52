//! 生成オーケストレーション
//!
//! スタイルガイドの鮮度判定と再取得、駒プロンプトの合成、単体/一括生成の
//! 直列実行、編集ワークフローを司る。状態の書き込みはすべてここを経由する。
//!
//! 一括生成が直列なのは意図的: 同時リモート呼び出しを1件に抑え、
//! 駒ごとの失敗を次の駒の開始前に観測できるようにする。

use crate::catalog::PieceKind;
use crate::client::GenerationClient;
use crate::error::{ChessSetError, Result};
use crate::prompts::compose_piece_prompt;
use crate::store::SetStore;

pub struct Orchestrator<C: GenerationClient> {
    store: SetStore,
    client: C,
    has_api_key: bool,
}

impl<C: GenerationClient> Orchestrator<C> {
    pub fn new(client: C, has_api_key: bool) -> Self {
        let mut store = SetStore::new();
        // 起動時点でキー欠如を検出し、恒久エラーとして提示する
        if !has_api_key {
            store.set_config_error(ChessSetError::MissingApiKey.to_string());
        }
        Self { store, client, has_api_key }
    }

    /// 読み取り専用の状態ビュー（描画・エクスポート用）
    pub fn store(&self) -> &SetStore {
        &self.store
    }

    // ---- ユーザーインテント ----

    pub fn set_theme(&mut self, theme: &str) {
        self.store.set_theme(theme);
    }

    /// 全消去。直後の状態はプロセス開始と等価
    pub fn clear_all(&mut self) {
        self.store.reset();
        if !self.has_api_key {
            self.store.set_config_error(ChessSetError::MissingApiKey.to_string());
        }
    }

    pub fn open_edit(&mut self, kind: PieceKind) {
        self.store.open_edit(kind);
    }

    /// 編集モーダルを閉じる（編集処理中はno-op）
    pub fn close_edit(&mut self) {
        self.store.close_edit();
    }

    // ---- スタイルガイド ----

    /// 現テーマで有効なスタイルガイドを返す。失効時のみリモート再取得
    ///
    /// テーマ単位でキャッシュし、同一テーマの全駒に同じガイドを使い回すのが
    /// セットの画風統一の仕組み。
    pub async fn ensure_style_guide(&mut self, theme: &str) -> Result<String> {
        let trimmed = theme.trim();
        if trimmed.is_empty() {
            let err = ChessSetError::EmptyTheme;
            self.store.set_error(Some(err.to_string()));
            return Err(err);
        }

        if let Some(guide) = self.store.style_guide() {
            if !guide.is_stale(theme) {
                return Ok(guide.text.clone());
            }
        }

        self.store.set_style_guide_loading(true);
        let result = self.client.produce_style_guide(trimmed).await;
        // 成否に関わらずフラグは必ず戻す
        self.store.set_style_guide_loading(false);

        match result {
            Ok(text) => {
                self.store.set_style_guide(text.clone(), trimmed);
                Ok(text)
            }
            Err(err) => {
                self.store
                    .set_error(Some(format!("Failed to establish art direction: {}", err)));
                Err(err)
            }
        }
    }

    // ---- 生成 ----

    /// 駒1体を生成。失敗はGlobalErrorに集約し、呼び出し元には伝播しない
    pub async fn generate_piece(&mut self, kind: PieceKind, theme: &str, style_guide: &str) {
        if !self.has_api_key {
            self.store.set_config_error(ChessSetError::MissingApiKey.to_string());
            return;
        }

        self.store.set_error(None);
        self.store.set_loading(kind, true);

        let prompt = compose_piece_prompt(kind, theme, style_guide);
        match self.client.produce_image(&prompt).await {
            Ok(image) => {
                self.store.set_piece_result(kind, image, prompt);
            }
            Err(err) => {
                self.store.set_error(Some(format!("Failed to generate {}: {}", kind, err)));
                // 失敗した駒に古い画像を残さない
                self.store.clear_piece_image(kind);
            }
        }

        self.store.set_loading(kind, false);
    }

    /// 単体/一括生成の統一エントリポイント
    ///
    /// `kinds`をカタログ順に直列実行する。複数駒のバッチでは、各駒の開始前に
    /// GlobalErrorが駒生成失敗を示していれば残りを打ち切る（成功済みの結果は
    /// 巻き戻さない）。
    pub async fn generate_batch(
        &mut self,
        kinds: &[PieceKind],
        theme: &str,
        on_progress: impl Fn(usize, usize, PieceKind),
    ) {
        if !self.has_api_key {
            self.store.set_config_error(ChessSetError::MissingApiKey.to_string());
            return;
        }
        if theme.trim().is_empty() {
            self.store.set_error(Some(ChessSetError::EmptyTheme.to_string()));
            return;
        }

        self.store.set_error(None);

        // 有効なスタイルガイドは全駒生成の前提条件。失敗したらバッチごと中止
        let style_guide = match self.ensure_style_guide(theme).await {
            Ok(guide) => guide,
            Err(_) => return,
        };

        let ordered: Vec<PieceKind> = PieceKind::ALL
            .iter()
            .copied()
            .filter(|k| kinds.contains(k))
            .collect();
        let total = ordered.len();
        let batch = total > 1;

        if batch {
            self.store.set_batch(true);
        }

        for (index, kind) in ordered.into_iter().enumerate() {
            // 早期打ち切り: 直前までの駒生成失敗で残りを止める
            if batch && self.store.has_generation_failure() {
                break;
            }
            on_progress(index + 1, total, kind);
            self.generate_piece(kind, theme, &style_guide).await;
        }

        if batch {
            self.store.set_batch(false);
        }
    }

    // ---- 編集 ----

    /// 駒1体の画像をリモート編集で差し替える
    ///
    /// 前提条件（画像あり・キーあり・指示文が非空）を欠く呼び出しは
    /// 黙ってno-op（編集UI側で送信を無効化している前提）。
    pub async fn apply_edit(&mut self, kind: PieceKind, instruction: &str) {
        let instruction = instruction.trim();
        if !self.has_api_key || instruction.is_empty() {
            return;
        }
        let Some(source_image) = self.store.piece(kind).image.clone() else {
            return;
        };

        self.store.set_error(None);
        self.store.set_editing(true);

        let result = self.client.produce_edited_image(&source_image, instruction).await;
        self.store.set_editing(false);

        match result {
            Ok(image) => {
                self.store
                    .set_piece_result(kind, image, format!("Edited: \"{}\"", instruction));
                self.store.close_edit();
            }
            Err(err) => {
                // セッションは開いたままにして再試行/キャンセルに委ねる
                self.store.set_error(Some(format!("Failed to edit {}: {}", kind, err)));
            }
        }
    }
}
