use chess_set_ai::cli::{Cli, Commands};
use chess_set_ai::error::Result;
use chess_set_ai::session::{batch_progress_bar, run_session};
use chess_set_ai::{export, Config, GeminiClient, Orchestrator, PieceKind};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Generate { theme, piece, output } => {
            println!("♟ chess-set-ai - 駒生成\n");

            let client = GeminiClient::new(&config)?;
            let mut orchestrator = Orchestrator::new(client, true);
            orchestrator.set_theme(&theme);

            let kinds: Vec<PieceKind> = match piece {
                Some(kind) => vec![kind],
                None => PieceKind::ALL.to_vec(),
            };

            // 1. スタイルガイド確立 + 直列生成
            println!("[1/2] 生成中... (テーマ: {})", theme);
            let bar = batch_progress_bar(kinds.len());
            orchestrator
                .generate_batch(&kinds, &theme, |current, _total, kind| {
                    bar.set_position(current as u64 - 1);
                    bar.set_message(format!("{} を生成中...", kind));
                })
                .await;
            bar.finish_and_clear();

            if let Some(err) = orchestrator.store().error() {
                eprintln!("⚠ {}", err.message);
            }
            let generated = orchestrator
                .store()
                .pieces_in_order()
                .filter(|r| r.image.is_some())
                .count();
            println!("✔ {}駒を生成\n", generated);

            // 2. エクスポート
            println!("[2/2] エクスポート中...");
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            let exported = if kinds.len() == 1 {
                export::export_single(orchestrator.store(), kinds[0], &output_dir)?
            } else {
                export::export_set(orchestrator.store(), &output_dir)?
            };

            match exported {
                Some(path) => println!("✔ 書き出し完了: {}", path.display()),
                None => println!("エクスポートできる画像がありません"),
            }

            println!("\n✅ 完了");
        }

        Commands::Session { output } => {
            println!("♟ chess-set-ai - 対話セッション\n");

            let client = GeminiClient::new(&config)?;
            let mut orchestrator = Orchestrator::new(client, true);
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            run_session(&mut orchestrator, &output_dir).await?;
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  テキストモデル: {}", config.text_model);
                println!("  画像モデル: {}", config.image_model);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  APIキー: {}", if config.has_api_key() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
