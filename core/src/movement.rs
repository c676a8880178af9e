use crate::*;

/// Player speed in pixels per second.
pub const PLAYER_SPEED: f32 = 200.0;

/// Player body edge as a fraction of the grid size.
pub const BODY_SCALE: f32 = 0.8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const fn unit(self) -> (f32, f32) {
        match self {
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
        }
    }
}

/// Moves a player body `distance` pixels in `direction`, unless the body
/// would then overlap a blocking cell. Returns the resulting position.
pub fn step(
    board: &Board,
    geometry: &BoardGeometry,
    from: Position,
    direction: Direction,
    distance: f32,
) -> Position {
    let (dx, dy) = direction.unit();
    let to = from.offset(dx * distance, dy * distance);
    let half = geometry.grid_size * BODY_SCALE / 2.0;

    if geometry
        .tiles_covered(to, half)
        .any(|tile| board.is_blocking(tile))
    {
        log::trace!("Move {:?} from {:?} blocked", direction, from);
        from
    } else {
        to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> BoardGeometry {
        BoardGeometry {
            grid_size: GRID_SIZE,
            offset: Position::new(0.0, 0.0),
        }
    }

    #[test]
    fn free_move_advances() {
        let board = Board::standard();
        let start = geometry().tile_center((1, 1));

        let moved = step(&board, &geometry(), start, Direction::Right, 10.0);
        assert_eq!(moved, start.offset(10.0, 0.0));
    }

    #[test]
    fn move_into_wall_is_rejected() {
        let board = Board::standard();
        let start = geometry().tile_center((1, 1));

        assert_eq!(step(&board, &geometry(), start, Direction::Left, 10.0), start);
        assert_eq!(step(&board, &geometry(), start, Direction::Up, 10.0), start);
    }

    #[test]
    fn destructible_walls_block_until_destroyed() {
        let mut board = Board::from_rows(&[[1u8, 1, 1, 1], [1, 0, 2, 1], [1, 1, 1, 1]]).unwrap();
        let start = geometry().tile_center((1, 1));

        assert_eq!(step(&board, &geometry(), start, Direction::Right, 10.0), start);

        board.destroy((2, 1));
        assert_eq!(
            step(&board, &geometry(), start, Direction::Right, 10.0),
            start.offset(10.0, 0.0)
        );
    }
}
