//! 駒カタログ
//!
//! 6種の駒の定義（固定順序・表示名・基本説明文）。純粋なデータのみ。

use clap::ValueEnum;

/// 駒の種類
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// 表示・生成の固定順序
    pub const ALL: [PieceKind; 6] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PieceKind::King => "King",
            PieceKind::Queen => "Queen",
            PieceKind::Rook => "Rook",
            PieceKind::Bishop => "Bishop",
            PieceKind::Knight => "Knight",
            PieceKind::Pawn => "Pawn",
        }
    }

    /// エクスポート時のファイル名要素
    pub fn file_stem(&self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Pawn => "pawn",
        }
    }

    /// プロンプトの基本説明文（末尾ピリオドなし、テンプレート側で結合する）
    pub fn base_description(&self) -> &'static str {
        match self {
            PieceKind::King => {
                "A majestic king chess piece, the tallest of the set, crowned with an ornate cross finial"
            }
            PieceKind::Queen => {
                "An elegant queen chess piece, slightly shorter than the king, topped with a coronet of pointed spikes"
            }
            PieceKind::Rook => {
                "A sturdy rook chess piece shaped as a fortified castle tower with crenellated battlements"
            }
            PieceKind::Bishop => {
                "A slender bishop chess piece with a mitre-shaped top featuring a deep diagonal cleft"
            }
            PieceKind::Knight => {
                "A knight chess piece carved as a horse's head and arched neck in profile"
            }
            PieceKind::Pawn => {
                "A simple pawn chess piece, the smallest of the set, with a plain rounded head on a compact base"
            }
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_is_fixed() {
        let names: Vec<&str> = PieceKind::ALL.iter().map(|k| k.file_stem()).collect();
        assert_eq!(names, vec!["king", "queen", "rook", "bishop", "knight", "pawn"]);
    }

    #[test]
    fn test_display_matches_display_name() {
        for kind in PieceKind::ALL {
            assert_eq!(format!("{}", kind), kind.display_name());
        }
    }

    #[test]
    fn test_base_description_has_no_trailing_period() {
        for kind in PieceKind::ALL {
            assert!(!kind.base_description().ends_with('.'));
        }
    }
}
