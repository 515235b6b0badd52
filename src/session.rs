//! 対話セッションモジュール
//!
//! 生成状態はプロセス内メモリにしか存在しないため、生成→編集→
//! エクスポートを1プロセス内で回す対話ループを提供する。

use crate::catalog::PieceKind;
use crate::client::GenerationClient;
use crate::error::Result;
use crate::export;
use crate::orchestrator::Orchestrator;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// テーマ入力時に提示するサンプルテーマ
pub const EXAMPLE_THEMES: &[&str] = &[
    "Cyberpunk Neon",
    "Ancient Rome",
    "Deep Sea Bioluminescence",
    "Steampunk Brass",
    "Nordic Winter",
];

/// セッション中の操作
enum SessionAction {
    GenerateAll,
    GenerateOne,
    Edit,
    ExportSet,
    ExportOne,
    ChangeTheme,
    Clear,
    Quit,
}

const MENU_ITEMS: &[(&str, SessionAction)] = &[
    ("全駒を生成", SessionAction::GenerateAll),
    ("駒を1体生成", SessionAction::GenerateOne),
    ("駒を編集", SessionAction::Edit),
    ("セットをエクスポート (ZIP)", SessionAction::ExportSet),
    ("駒を1体エクスポート", SessionAction::ExportOne),
    ("テーマを変更", SessionAction::ChangeTheme),
    ("全消去", SessionAction::Clear),
    ("終了", SessionAction::Quit),
];

/// バッチ生成用プログレスバー
pub fn batch_progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// 対話セッションを実行
pub async fn run_session<C: GenerationClient>(
    orchestrator: &mut Orchestrator<C>,
    output_dir: &Path,
) -> Result<()> {
    let theme = prompt_theme()?;
    orchestrator.set_theme(&theme);

    loop {
        print_status(orchestrator);

        let labels: Vec<&str> = MENU_ITEMS.iter().map(|(label, _)| *label).collect();
        let selection = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        match MENU_ITEMS[selection].1 {
            SessionAction::GenerateAll => {
                let theme = orchestrator.store().theme().to_string();
                run_generation(orchestrator, &PieceKind::ALL, &theme).await;
            }
            SessionAction::GenerateOne => {
                let Some(kind) = prompt_piece("生成する駒", &PieceKind::ALL)? else {
                    continue;
                };
                let theme = orchestrator.store().theme().to_string();
                run_generation(orchestrator, &[kind], &theme).await;
            }
            SessionAction::Edit => {
                run_edit(orchestrator).await?;
            }
            SessionAction::ExportSet => {
                match export::export_set(orchestrator.store(), output_dir)? {
                    Some(path) => println!("✔ エクスポート完了: {}", path.display()),
                    None => println!("エクスポートできる画像がありません"),
                }
            }
            SessionAction::ExportOne => {
                let generated = generated_pieces(orchestrator);
                if generated.is_empty() {
                    println!("エクスポートできる画像がありません");
                    continue;
                }
                let Some(kind) = prompt_piece("エクスポートする駒", &generated)? else {
                    continue;
                };
                if let Some(path) = export::export_single(orchestrator.store(), kind, output_dir)? {
                    println!("✔ 書き出し完了: {}", path.display());
                }
            }
            SessionAction::ChangeTheme => {
                let theme = prompt_theme()?;
                orchestrator.set_theme(&theme);
            }
            SessionAction::Clear => {
                orchestrator.clear_all();
                println!("✔ 全消去しました");
            }
            SessionAction::Quit => break,
        }
    }

    Ok(())
}

/// サンプル選択か自由入力でテーマを決める
fn prompt_theme() -> Result<String> {
    let mut items: Vec<&str> = EXAMPLE_THEMES.to_vec();
    items.push("（自由入力）");

    let selection = Select::new()
        .with_prompt("テーマを選択")
        .items(&items)
        .default(items.len() - 1)
        .interact()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    if selection < EXAMPLE_THEMES.len() {
        return Ok(EXAMPLE_THEMES[selection].to_string());
    }

    let theme: String = Input::new()
        .with_prompt("テーマ")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(theme)
}

/// 駒を選択（キャンセル可）
fn prompt_piece(prompt: &str, candidates: &[PieceKind]) -> Result<Option<PieceKind>> {
    let mut labels: Vec<&str> = candidates.iter().map(|k| k.display_name()).collect();
    labels.push("（戻る）");

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    Ok(candidates.get(selection).copied())
}

async fn run_generation<C: GenerationClient>(
    orchestrator: &mut Orchestrator<C>,
    kinds: &[PieceKind],
    theme: &str,
) {
    let bar = batch_progress_bar(kinds.len());
    orchestrator
        .generate_batch(kinds, theme, |current, _total, kind| {
            bar.set_position(current as u64 - 1);
            bar.set_message(format!("{} を生成中...", kind));
        })
        .await;
    bar.finish_and_clear();

    match orchestrator.store().error() {
        Some(err) => println!("⚠ {}", err.message),
        None => println!("✔ 生成完了"),
    }
}

async fn run_edit<C: GenerationClient>(orchestrator: &mut Orchestrator<C>) -> Result<()> {
    let generated = generated_pieces(orchestrator);
    if generated.is_empty() {
        println!("編集できる画像がありません（先に生成してください）");
        return Ok(());
    }

    let Some(kind) = prompt_piece("編集する駒", &generated)? else {
        return Ok(());
    };
    orchestrator.open_edit(kind);

    let instruction: String = Input::new()
        .with_prompt("編集指示（例: make it glow blue）")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    if instruction.trim().is_empty() {
        // 指示なしはキャンセル扱い
        orchestrator.close_edit();
        return Ok(());
    }

    println!("編集中...");
    orchestrator.apply_edit(kind, &instruction).await;

    match orchestrator.store().error() {
        Some(err) => {
            println!("⚠ {}", err.message);
            orchestrator.close_edit();
        }
        None => println!("✔ {} を編集しました", kind),
    }

    Ok(())
}

fn generated_pieces<C: GenerationClient>(orchestrator: &Orchestrator<C>) -> Vec<PieceKind> {
    orchestrator
        .store()
        .pieces_in_order()
        .filter(|r| r.image.is_some())
        .map(|r| r.kind)
        .collect()
}

/// 現在の状態を1行サマリで表示
fn print_status<C: GenerationClient>(orchestrator: &Orchestrator<C>) {
    let store = orchestrator.store();
    let tiles: String = store
        .pieces_in_order()
        .map(|r| if r.image.is_some() { '■' } else { '□' })
        .collect();
    let guide = match store.style_guide() {
        Some(g) => format!("あり ({})", g.source_theme),
        None => "なし".to_string(),
    };
    println!();
    println!("テーマ: {}", if store.theme().is_empty() { "(未設定)" } else { store.theme() });
    println!("駒 [K Q R B N P]: {}", tiles);
    println!("スタイルガイド: {}", guide);
    if let Some(err) = store.error() {
        println!("⚠ {}", err.message);
    }
}
