//! エクスポートモジュール
//!
//! 生成済み画像とスタイルガイドをZIPアーカイブにまとめる。
//! 単体画像の書き出しにも対応。判断ロジックは持たない純粋なデータ変換。

use crate::catalog::PieceKind;
use crate::client::{extract_base64_from_data_url, extract_mime_type_from_data_url};
use crate::error::{ChessSetError, Result};
use crate::store::SetStore;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// サニタイズ結果が空のときのフォールバック名
const DEFAULT_SET_NAME: &str = "chess_set";

/// テーマ名をファイル名向けにサニタイズ
///
/// 英数字以外の連続をアンダースコア1個に潰し、小文字化して先頭末尾の
/// アンダースコアを落とす。空になったら既定名。
pub fn sanitize_theme(theme: &str) -> String {
    let mut out = String::new();
    for c in theme.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        DEFAULT_SET_NAME.to_string()
    } else {
        out
    }
}

/// MIMEタイプから拡張子を決める（未知はpng扱い）
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        _ => "png",
    }
}

/// Data URLをデコードして(バイト列, 拡張子)を返す
pub fn decode_data_url(data_url: &str) -> Result<(Vec<u8>, &'static str)> {
    let base64_data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| ChessSetError::MalformedImage("not a base64 data URL".into()))?;
    let bytes = STANDARD
        .decode(base64_data)
        .map_err(|e| ChessSetError::MalformedImage(e.to_string()))?;
    let ext = extension_for_mime(extract_mime_type_from_data_url(data_url));
    Ok((bytes, ext))
}

/// セット全体をZIPアーカイブとして書き出す
///
/// 画像のある駒ごとに `<テーマ>_<駒>.<拡張子>` エントリを作り、スタイル
/// ガイドがあれば `<テーマ>_style_guide.txt` を添える。画像が1枚もなければ
/// 何も書かずNoneを返す。
///
/// # Returns
/// 作成したアーカイブのパス。エクスポート対象なしならNone
pub fn export_set(store: &SetStore, output_dir: &Path) -> Result<Option<PathBuf>> {
    if !store.has_any_image() {
        return Ok(None);
    }

    let set_name = sanitize_theme(store.theme());
    let archive_path = output_dir.join(format!("{}.zip", set_name));

    let file = File::create(&archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    for record in store.pieces_in_order() {
        let Some(data_url) = record.image.as_deref() else {
            continue;
        };
        let (bytes, ext) = decode_data_url(data_url)?;
        writer.start_file(
            format!("{}_{}.{}", set_name, record.kind.file_stem(), ext),
            options,
        )?;
        writer.write_all(&bytes)?;
    }

    if let Some(guide) = store.style_guide() {
        writer.start_file(format!("{}_style_guide.txt", set_name), options)?;
        writer.write_all(guide.text.as_bytes())?;
    }

    writer.finish()?;
    Ok(Some(archive_path))
}

/// 駒1体の画像を単体ファイルとして書き出す
///
/// # Returns
/// 書き出したファイルのパス。画像がなければNone
pub fn export_single(
    store: &SetStore,
    kind: PieceKind,
    output_dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(data_url) = store.piece(kind).image.as_deref() else {
        return Ok(None);
    };

    let (bytes, ext) = decode_data_url(data_url)?;
    let file_path = output_dir.join(format!(
        "{}_{}.{}",
        sanitize_theme(store.theme()),
        kind.file_stem(),
        ext
    ));
    std::fs::write(&file_path, bytes)?;
    Ok(Some(file_path))
}
