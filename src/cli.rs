use crate::catalog::PieceKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chess-set-ai")]
#[command(about = "テーマからAIでチェス駒画像セットを生成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// テーマを指定して駒を生成し、アーカイブを書き出す
    Generate {
        /// テーマ（例: "Cyberpunk Neon"）
        #[arg(required = true)]
        theme: String,

        /// 単一の駒のみ生成（省略時は6駒すべて）
        #[arg(short, long)]
        piece: Option<PieceKind>,

        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 対話セッション（生成・編集・エクスポートを繰り返す）
    Session {
        /// 出力ディレクトリ（デフォルト: カレント）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
