//! SVG board rendering.

use std::fmt::Write;

use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, File, Move, Piece, Position, Rank, Role, Square};

const SQUARE: u32 = 45;
const MARGIN: u32 = 20;
const LIGHT: &str = "#f0d9b5";
const DARK: &str = "#b58863";
const LAST_MOVE_LIGHT: &str = "#cdd26a";
const LAST_MOVE_DARK: &str = "#aaa23a";
const CHECK: &str = "#e55b5b";

fn glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '\u{2654}',
        (Color::White, Role::Queen) => '\u{2655}',
        (Color::White, Role::Rook) => '\u{2656}',
        (Color::White, Role::Bishop) => '\u{2657}',
        (Color::White, Role::Knight) => '\u{2658}',
        (Color::White, Role::Pawn) => '\u{2659}',
        (Color::Black, Role::King) => '\u{265A}',
        (Color::Black, Role::Queen) => '\u{265B}',
        (Color::Black, Role::Rook) => '\u{265C}',
        (Color::Black, Role::Bishop) => '\u{265D}',
        (Color::Black, Role::Knight) => '\u{265E}',
        (Color::Black, Role::Pawn) => '\u{265F}',
    }
}

/// Origin and destination as a player sees them. Castling lands on the king's
/// target square, not the rook's.
fn move_squares(m: &Move) -> (Option<Square>, Square) {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => (Some(from), to),
        _ => (m.from(), m.to()),
    }
}

/// Render `pos` from White's side, highlighting `last_move` and a checked king.
pub fn board_svg(pos: &Chess, last_move: Option<&Move>) -> String {
    let size = SQUARE * 8 + MARGIN * 2;
    let checked_king = if pos.is_check() {
        pos.board().king_of(pos.turn())
    } else {
        None
    };
    let last_squares = last_move.map(move_squares);
    let highlighted = |sq: Square| match last_squares {
        Some((from, to)) => from == Some(sq) || to == sq,
        None => false,
    };

    let mut svg = String::with_capacity(16 * 1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" viewBox="0 0 {size} {size}" width="{size}" height="{size}">"#
    );
    let _ = write!(svg, r##"<rect x="0" y="0" width="{size}" height="{size}" fill="#212121"/>"##);

    for rank_idx in 0..8u32 {
        for file_idx in 0..8u32 {
            let sq = Square::from_coords(File::new(file_idx), Rank::new(rank_idx));
            let x = MARGIN + file_idx * SQUARE;
            let y = MARGIN + (7 - rank_idx) * SQUARE;
            let light = (file_idx + rank_idx) % 2 == 1;
            let fill = if checked_king == Some(sq) {
                CHECK
            } else if highlighted(sq) {
                if light { LAST_MOVE_LIGHT } else { LAST_MOVE_DARK }
            } else if light {
                LIGHT
            } else {
                DARK
            };
            let _ = write!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{SQUARE}" height="{SQUARE}" fill="{fill}" class="square {sq}"/>"#
            );
            if let Some(piece) = pos.board().piece_at(sq) {
                let _ = write!(
                    svg,
                    r#"<text x="{}" y="{}" font-size="38" text-anchor="middle" dominant-baseline="central" class="piece {}">{}</text>"#,
                    x + SQUARE / 2,
                    y + SQUARE / 2,
                    piece.char(),
                    glyph(piece)
                );
            }
        }
    }

    for idx in 0..8u32 {
        let file = File::new(idx).char();
        let rank = Rank::new(idx).char();
        let cx = MARGIN + idx * SQUARE + SQUARE / 2;
        let cy = MARGIN + (7 - idx) * SQUARE + SQUARE / 2;
        let _ = write!(
            svg,
            r##"<text x="{cx}" y="{}" font-size="14" fill="#e5e5e5" text-anchor="middle">{file}</text>"##,
            size - 5
        );
        let _ = write!(
            svg,
            r##"<text x="10" y="{cy}" font-size="14" fill="#e5e5e5" text-anchor="middle" dominant-baseline="central">{rank}</text>"##
        );
    }

    svg.push_str("</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notation::{parse_user_move, position_from_fen};

    #[test]
    fn start_position_has_all_pieces() {
        let svg = board_svg(&Chess::default(), None);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"piece").count(), 32);
        assert_eq!(svg.matches("class=\"square").count(), 64);
        assert!(svg.contains('\u{2654}'));
        assert!(svg.contains('\u{265A}'));
        assert!(!svg.contains(LAST_MOVE_LIGHT) && !svg.contains(LAST_MOVE_DARK));
    }

    #[test]
    fn highlights_last_move_squares() {
        let pos = Chess::default();
        let m = parse_user_move("e4", &pos).unwrap();
        let svg = board_svg(&pos, Some(&m));
        let highlights = svg.matches(LAST_MOVE_LIGHT).count() + svg.matches(LAST_MOVE_DARK).count();
        assert_eq!(highlights, 2);
    }

    #[test]
    fn castling_highlights_king_squares() {
        let pos = position_from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        let m = parse_user_move("O-O", &pos).unwrap();
        let svg = board_svg(&pos, Some(&m));
        assert!(svg.contains(&format!(r#"fill="{LAST_MOVE_DARK}" class="square e1""#)));
        assert!(svg.contains(&format!(r#"fill="{LAST_MOVE_DARK}" class="square g1""#)));
        assert!(svg.contains(&format!(r#"fill="{LIGHT}" class="square h1""#)));
    }

    #[test]
    fn marks_checked_king() {
        let pos = position_from_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 1");
        assert!(!svg_has_check(&pos));
        let pos = position_from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
        assert!(!svg_has_check(&pos));
        let pos = position_from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1");
        assert!(svg_has_check(&pos));
    }

    fn svg_has_check(pos: &Chess) -> bool {
        board_svg(pos, None).contains(CHECK)
    }
}
