//! Move text parsing (SAN with UCI fallback) and FEN output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{Chess, EnPassantMode, Move, Position};

use crate::error::{AgentError, Result};

static MOVE_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[O0]-[O0](?:-[O0])?|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBNqrbn])?)[+#]?$")
        .unwrap()
});

/// Parse a user's move text against `pos`.
///
/// Tries the whole text as SAN, then as UCI, then every word of it that is
/// shaped like a move, with surrounding punctuation stripped. The error
/// carries the trimmed original text.
pub fn parse_user_move(text: &str, pos: &Chess) -> Result<Move> {
    let text = text.trim();
    if let Some(m) = parse_token(text, pos) {
        return Ok(m);
    }
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || "+#=-".contains(c))))
        .filter(|word| MOVE_TOKEN_REGEX.is_match(word))
        .find_map(|word| parse_token(word, pos))
        .ok_or_else(|| AgentError::InvalidMove(text.to_string()))
}

fn parse_token(token: &str, pos: &Chess) -> Option<Move> {
    let token = token.trim_end_matches(['!', '?']);
    if token.is_empty() {
        return None;
    }
    let bare = token.trim_end_matches(['+', '#']);
    let san_text = match bare {
        "0-0" => Cow::Borrowed("O-O"),
        "0-0-0" => Cow::Borrowed("O-O-O"),
        _ => with_promotion_sign(bare),
    };
    if let Ok(san) = san_text.parse::<SanPlus>() {
        if let Ok(m) = san.san.to_move(pos) {
            return Some(m);
        }
    }
    bare.to_ascii_lowercase()
        .parse::<UciMove>()
        .ok()
        .and_then(|uci| uci.to_move(pos).ok())
}

/// `e8Q` -> `e8=Q`.
fn with_promotion_sign(san: &str) -> Cow<'_, str> {
    match san.as_bytes() {
        [.., b'1' | b'8', role] if b"QRBNqrbn".contains(role) && !san.contains('=') => Cow::Owned(format!(
            "{}={}",
            &san[..san.len() - 1],
            role.to_ascii_uppercase() as char
        )),
        _ => Cow::Borrowed(san),
    }
}

/// FEN of the position, en passant square only when a capture is legal.
pub fn fen(pos: &Chess) -> String {
    Fen(pos.clone().into_setup(EnPassantMode::Legal)).to_string()
}

/// Play `m` and return its SAN including check/mate suffix.
pub fn play_with_san(pos: &mut Chess, m: &Move) -> String {
    SanPlus::from_move_and_play_unchecked(pos, m).to_string()
}

#[cfg(test)]
pub(crate) fn position_from_fen(fen: &str) -> Chess {
    use shakmaty::CastlingMode;
    fen.parse::<Fen>()
        .unwrap()
        .into_position(CastlingMode::Standard)
        .unwrap()
}
