// Human-readable coordinates and compact move strings.
//
// Squares are labelled like a chess board laid over the 7x7 grid: files
// `a..g` left to right, ranks `7..1` top to bottom, so position 0 is `a7` and
// position 23 is `g1`.

use crate::board::state::{Board, Stone};
use crate::board::topology::{coord_of, index_at, GRID_SIZE, NUM_POSITIONS};
use crate::error::{MuehleError, Result};
use crate::rules::Action;
use crate::search::movegen::{Ply, PlyKind};

fn notation_err(input: &str, reason: &'static str) -> MuehleError {
    MuehleError::Notation { input: input.to_string(), reason }
}

pub fn pos_label(pos: usize) -> String {
    let (row, col) = coord_of(pos);
    let file = (b'a' + col as u8) as char;
    format!("{}{}", file, GRID_SIZE - row)
}

pub fn parse_label(label: &str) -> Result<usize> {
    let bytes = label.trim().as_bytes();
    if bytes.len() != 2 {
        return Err(notation_err(label, "expected file and rank"));
    }
    let file = bytes[0].to_ascii_lowercase();
    if !(b'a'..=b'g').contains(&file) {
        return Err(notation_err(label, "file out of range"));
    }
    let rank = match (bytes[1] as char).to_digit(10) {
        Some(r) if (1..=GRID_SIZE as u32).contains(&r) => r as usize,
        _ => return Err(notation_err(label, "rank out of range")),
    };
    index_at(GRID_SIZE - rank, (file - b'a') as usize).ok_or_else(|| notation_err(label, "not a board point"))
}

/// `P:a7`, `M:a7-d7`, `R:b4`.
pub fn action_notation(action: &Action) -> String {
    match *action {
        Action::Place { dst } => format!("P:{}", pos_label(dst)),
        Action::Move { src, dst } => format!("M:{}-{}", pos_label(src), pos_label(dst)),
        Action::Remove { dst } => format!("R:{}", pos_label(dst)),
    }
}

/// Action notation with `F:` for flying moves and an `x<label>` suffix for a
/// fused removal.
pub fn ply_notation(ply: &Ply) -> String {
    let label = |p: Option<usize>| p.map(pos_label).unwrap_or_else(|| "?".to_string());
    let mut out = match ply.kind {
        PlyKind::Place => format!("P:{}", label(ply.dst)),
        PlyKind::Move => format!("M:{}-{}", label(ply.src), label(ply.dst)),
        PlyKind::Fly => format!("F:{}-{}", label(ply.src), label(ply.dst)),
        PlyKind::Remove => return format!("R:{}", label(ply.remove)),
    };
    if let Some(r) = ply.remove {
        out.push('x');
        out.push_str(&pos_label(r));
    }
    out
}

/// Inverse of [`ply_notation`]. Legality is not checked here.
pub fn parse_ply(text: &str) -> Result<Ply> {
    let text = text.trim();
    let (prefix, rest) = text.split_once(':').ok_or_else(|| notation_err(text, "missing kind prefix"))?;
    let (body, capture) = match rest.split_once('x') {
        Some((b, c)) => (b, Some(parse_label(c)?)),
        None => (rest, None),
    };
    let two = |b: &str| -> Result<(usize, usize)> {
        let (s, d) = b.split_once('-').ok_or_else(|| notation_err(text, "expected src-dst"))?;
        Ok((parse_label(s)?, parse_label(d)?))
    };
    let ply = match prefix.to_ascii_uppercase().as_str() {
        "P" => Ply::place(parse_label(body)?),
        "M" => {
            let (s, d) = two(body)?;
            Ply::step(s, d)
        }
        "F" => {
            let (s, d) = two(body)?;
            Ply::fly(s, d)
        }
        "R" => {
            if capture.is_some() {
                return Err(notation_err(text, "removal cannot capture"));
            }
            return Ok(Ply::remove(parse_label(body)?));
        }
        _ => return Err(notation_err(text, "unknown kind prefix")),
    };
    Ok(match capture {
        Some(r) => ply.with_remove(r),
        None => ply,
    })
}

/// 24 characters, one per position in index order: `W`, `B` or `.`.
pub fn format_board(board: &Board) -> String {
    board.iter().map(|s| s.as_char()).collect()
}

pub fn parse_board(text: &str) -> Result<Board> {
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace() && *c != '/').collect();
    if chars.len() != NUM_POSITIONS {
        return Err(notation_err(text, "expected 24 squares"));
    }
    let mut board = [Stone::Empty; NUM_POSITIONS];
    for (slot, c) in board.iter_mut().zip(chars) {
        *slot = match c {
            'W' | 'w' => Stone::White,
            'B' | 'b' => Stone::Black,
            '.' | '-' | '_' => Stone::Empty,
            _ => return Err(notation_err(text, "unknown square character")),
        };
    }
    Ok(board)
}
