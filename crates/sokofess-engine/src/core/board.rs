use std::{fmt::Write as _, str::FromStr};

use crate::LevelParseError;

use super::{Direction, Position, State};

/// Largest width or height accepted by the level parser.
pub const MAX_DIMENSION: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Tile {
    Wall,
    Floor,
    Target,
}

/// Static level geometry: walls and targets.
///
/// Everything outside `0..width` x `0..height` behaves like a wall, so callers
/// never need a sentinel border around the level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
    targets: Vec<Position>,
}

impl Board {
    /// Builds a board by querying `tile_at` for every square.
    #[must_use]
    pub fn from_fn<F>(width: u16, height: u16, mut tile_at: F) -> Self
    where
        F: FnMut(Position) -> Tile,
    {
        let mut tiles = Vec::with_capacity(usize::from(width) * usize::from(height));
        let mut targets = vec![];
        for y in 0..height {
            for x in 0..width {
                let pos = Position::new(x, y);
                let tile = tile_at(pos);
                if tile.is_target() {
                    targets.push(pos);
                }
                tiles.push(tile);
            }
        }
        Self {
            width,
            height,
            tiles,
            targets,
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of squares, i.e. the length of any per-square table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Index of `pos` into per-square tables. `pos` must be in bounds.
    #[must_use]
    pub fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos));
        usize::from(pos.y) * usize::from(self.width) + usize::from(pos.x)
    }

    #[must_use]
    pub fn position(&self, index: usize) -> Position {
        let width = usize::from(self.width);
        Position::new(
            u16::try_from(index % width).unwrap(),
            u16::try_from(index / width).unwrap(),
        )
    }

    #[must_use]
    pub fn tile(&self, pos: Position) -> Tile {
        if self.contains(pos) {
            self.tiles[self.index(pos)]
        } else {
            Tile::Wall
        }
    }

    #[must_use]
    pub fn is_wall(&self, pos: Position) -> bool {
        self.tile(pos).is_wall()
    }

    #[must_use]
    pub fn is_target(&self, pos: Position) -> bool {
        self.tile(pos).is_target()
    }

    #[must_use]
    pub fn is_floor(&self, pos: Position) -> bool {
        !self.is_wall(pos)
    }

    #[must_use]
    pub fn targets(&self) -> &[Position] {
        &self.targets
    }

    /// Neighbour of `pos` in `dir` if it is inside the board and not a wall.
    #[must_use]
    pub fn open_neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        pos.step(dir).filter(|next| self.is_floor(*next))
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.tiles.len()).map(|i| self.position(i))
    }

    pub fn floor_squares(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|pos| self.is_floor(*pos))
    }

    /// Renders `state` on this board in the usual text notation.
    #[must_use]
    pub fn render(&self, state: &State) -> String {
        let mut out = String::with_capacity(self.tiles.len() + usize::from(self.height));
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let has_box = state.has_box(pos);
                let is_player = state.player() == pos;
                let ch = match (self.tile(pos), has_box, is_player) {
                    (Tile::Wall, _, _) => '#',
                    (Tile::Target, true, _) => '*',
                    (Tile::Target, false, true) => '+',
                    (Tile::Target, false, false) => '.',
                    (Tile::Floor, true, _) => '$',
                    (Tile::Floor, false, true) => '@',
                    (Tile::Floor, false, false) => ' ',
                };
                out.push(ch);
            }
            let trimmed = out.trim_end_matches(' ').len();
            out.truncate(trimmed);
            writeln!(&mut out).unwrap();
        }
        out
    }
}

/// A board together with its starting state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    board: Board,
    initial: State,
}

impl Level {
    #[must_use]
    pub fn new(board: Board, initial: State) -> Self {
        Self { board, initial }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn initial_state(&self) -> &State {
        &self.initial
    }

    /// Parses a single level in the common text format.
    ///
    /// `#` wall, ` `/`-`/`_` floor, `.` target, `$` box, `*` box on target,
    /// `@` player, `+` player on target. Blank lines are skipped and the
    /// indentation shared by all rows is removed, so levels can be written
    /// inline in raw strings. Floor outside the walls (not connected to the
    /// player and holding nothing) is turned into wall.
    pub fn from_ascii(art: &str) -> Result<Self, LevelParseError> {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();
        let indent = lines
            .iter()
            .map(|line| line.len() - line.trim_start().len())
            .min()
            .ok_or(LevelParseError::Empty)?;
        let rows: Vec<Vec<char>> = lines
            .iter()
            .map(|line| line[indent..].chars().collect())
            .collect();

        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(LevelParseError::Empty);
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(LevelParseError::TooLarge(width, height));
        }

        let mut tiles = vec![Tile::Floor; width * height];
        let mut boxes = vec![];
        let mut player = None;
        for (y, row) in rows.iter().enumerate() {
            for (x, &ch) in row.iter().enumerate() {
                let pos = Position::new(u16::try_from(x).unwrap(), u16::try_from(y).unwrap());
                let (tile, has_box, has_player) = match ch {
                    '#' => (Tile::Wall, false, false),
                    ' ' | '-' | '_' => (Tile::Floor, false, false),
                    '.' => (Tile::Target, false, false),
                    '$' => (Tile::Floor, true, false),
                    '*' => (Tile::Target, true, false),
                    '@' => (Tile::Floor, false, true),
                    '+' => (Tile::Target, false, true),
                    _ => return Err(LevelParseError::UnexpectedChar(ch, x, y)),
                };
                tiles[y * width + x] = tile;
                if has_box {
                    boxes.push(pos);
                }
                if has_player {
                    if player.is_some() {
                        return Err(LevelParseError::MultiplePlayers);
                    }
                    player = Some(pos);
                }
            }
        }
        let player = player.ok_or(LevelParseError::NoPlayer)?;

        let width = u16::try_from(width).unwrap();
        let height = u16::try_from(height).unwrap();
        let raw = Board::from_fn(width, height, |pos| {
            tiles[usize::from(pos.y) * usize::from(width) + usize::from(pos.x)]
        });

        // Seal the exterior: floor the player can never walk to and that
        // holds neither a box nor a target is equivalent to wall.
        let mut inside = vec![false; raw.len()];
        let mut stack = vec![player];
        inside[raw.index(player)] = true;
        while let Some(pos) = stack.pop() {
            for dir in Direction::ALL {
                if let Some(next) = raw.open_neighbor(pos, dir)
                    && !inside[raw.index(next)]
                {
                    inside[raw.index(next)] = true;
                    stack.push(next);
                }
            }
        }
        let board = Board::from_fn(width, height, |pos| {
            let tile = raw.tile(pos);
            if tile.is_floor() && !inside[raw.index(pos)] && !boxes.contains(&pos) {
                Tile::Wall
            } else {
                tile
            }
        });

        Ok(Self::new(board, State::new(player, boxes)))
    }
}

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_ascii(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corridor() {
        let level = Level::from_ascii("#@$.#").unwrap();
        let board = level.board();
        assert_eq!((board.width(), board.height()), (5, 1));
        assert!(board.is_wall(Position::new(0, 0)));
        assert!(board.is_target(Position::new(3, 0)));
        assert_eq!(board.targets(), &[Position::new(3, 0)]);
        assert_eq!(level.initial_state().player(), Position::new(1, 0));
        assert_eq!(level.initial_state().boxes(), &[Position::new(2, 0)]);
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let level = Level::from_ascii("@$.").unwrap();
        let board = level.board();
        assert!(board.is_wall(Position::new(3, 0)));
        assert!(board.is_wall(Position::new(0, 1)));
        assert_eq!(board.open_neighbor(Position::new(2, 0), Direction::Right), None);
    }

    #[test]
    fn test_indentation_and_exterior_are_stripped() {
        let level = Level::from_ascii(
            r"
              #####
            ###---#
            #.@$--#
            #######
            ",
        )
        .unwrap();
        let board = level.board();
        assert_eq!(board.width(), 7);
        // outside the walls on the first row
        assert!(board.is_wall(Position::new(0, 0)));
        assert!(board.is_wall(Position::new(1, 0)));
        assert!(board.is_floor(Position::new(3, 1)));
        assert_eq!(level.initial_state().player(), Position::new(2, 2));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Level::from_ascii("\n\n"), Err(LevelParseError::Empty));
        assert_eq!(Level::from_ascii("#$.#"), Err(LevelParseError::NoPlayer));
        assert_eq!(
            Level::from_ascii("#@@#"),
            Err(LevelParseError::MultiplePlayers)
        );
        assert_eq!(
            Level::from_ascii("#@x#"),
            Err(LevelParseError::UnexpectedChar('x', 2, 0))
        );
    }

    #[test]
    fn test_render_roundtrip() {
        let art = "######\n#@$. #\n#*   #\n######\n";
        let level = Level::from_ascii(art).unwrap();
        assert_eq!(level.board().render(level.initial_state()), art);
    }
}
