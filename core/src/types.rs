/// Single board axis. Signed so that pixel positions left of or above the
/// board map to negative tiles instead of wrapping.
pub type Coord = i16;

/// Tile address `(column, row)`.
pub type Tile = (Coord, Coord);

/// Milliseconds on the session clock.
pub type Millis = u64;

/// Health points, always within `0..=MAX_HEALTH`.
pub type Health = u8;

pub const MAX_HEALTH: Health = 100;

/// Clamps any wire-sized health value into `0..=MAX_HEALTH`.
pub fn clamp_health(value: i64) -> Health {
    value.clamp(0, MAX_HEALTH.into()) as Health
}

const ORTHOGONAL: [(Coord, Coord); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Applies `delta` to `tile`, returning a value only when it remains in bounds.
fn apply_delta(tile: Tile, delta: (Coord, Coord), bounds: Tile) -> Option<Tile> {
    let (x, y) = tile;
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = x.checked_add(dx)?;
    if !(0..max_x).contains(&next_x) {
        return None;
    }

    let next_y = y.checked_add(dy)?;
    if !(0..max_y).contains(&next_y) {
        return None;
    }

    Some((next_x, next_y))
}

/// Iterates the in-bounds up/down/left/right neighbors of a tile.
#[derive(Debug)]
pub struct OrthogonalIter {
    center: Tile,
    bounds: Tile,
    index: u8,
}

impl OrthogonalIter {
    pub(crate) fn new(center: Tile, bounds: Tile) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for OrthogonalIter {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= ORTHOGONAL.len() {
                return None;
            }

            let next_item = apply_delta(self.center, ORTHOGONAL[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}
