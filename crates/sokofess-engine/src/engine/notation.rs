//! Coordinate notation for squares and moves.
//!
//! Columns are letters (`A`..`Z`, then `AA`, `AB`, ...) counted from the left
//! edge, rows are 1-based numbers counted from the top. A square is written
//! `(col,row)` and a move `(col,row)-(col,row)`.

use crate::{NotationError, Position};

/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
#[must_use]
pub fn column_to_letters(x: u16) -> String {
    let mut n = u32::from(x) + 1;
    let mut letters = vec![];
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap()));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Inverse of [`column_to_letters`]; only uppercase letters are accepted.
pub fn letters_to_column(letters: &str) -> Result<u16, NotationError> {
    let invalid = || NotationError(letters.to_owned());
    if letters.is_empty() {
        return Err(invalid());
    }
    let mut n: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_uppercase() {
            return Err(invalid());
        }
        let digit = u32::from(ch) - u32::from('A') + 1;
        n = n
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(invalid)?;
    }
    u16::try_from(n - 1).map_err(|_| invalid())
}

#[must_use]
pub fn coordinate_to_notation(pos: Position) -> String {
    format!("({},{})", column_to_letters(pos.x), u32::from(pos.y) + 1)
}

/// Parses `(col,row)`. Only the canonical spelling is accepted (uppercase
/// letters, no leading zeros, no spaces), so the parse is exactly inverse to
/// [`coordinate_to_notation`].
pub fn notation_to_coordinate(s: &str) -> Result<Position, NotationError> {
    let invalid = || NotationError(s.to_owned());
    let inner = s
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let (col, row) = inner.split_once(',').ok_or_else(invalid)?;
    let x = letters_to_column(col).map_err(|_| invalid())?;
    if row.is_empty() || row.starts_with('0') || !row.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let row: u32 = row.parse().map_err(|_| invalid())?;
    let y = u16::try_from(row - 1).map_err(|_| invalid())?;
    Ok(Position::new(x, y))
}

/// Parses `(col,row)-(col,row)` into the box start and end squares.
pub fn parse_move_notation(s: &str) -> Result<(Position, Position), NotationError> {
    let invalid = || NotationError(s.to_owned());
    let (from, to) = s.split_once(")-(").ok_or_else(invalid)?;
    let from = notation_to_coordinate(&format!("{from})")).map_err(|_| invalid())?;
    let to = notation_to_coordinate(&format!("({to}")).map_err(|_| invalid())?;
    Ok((from, to))
}
