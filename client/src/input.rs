use bitflags::bitflags;
use blastgrid_core::Direction;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Keys held during one frame, already sampled from whatever input device.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct InputState: u8 {
        const LEFT  = 1;
        const RIGHT = 1 << 1;
        const UP    = 1 << 2;
        const DOWN  = 1 << 3;
        const BOMB  = 1 << 4;
    }
}

impl InputState {
    /// One axis at a time, left wins over right over up over down.
    pub fn direction(self) -> Option<Direction> {
        if self.contains(Self::LEFT) {
            Some(Direction::Left)
        } else if self.contains(Self::RIGHT) {
            Some(Direction::Right)
        } else if self.contains(Self::UP) {
            Some(Direction::Up)
        } else if self.contains(Self::DOWN) {
            Some(Direction::Down)
        } else {
            None
        }
    }

    /// Keys held now that were not held in `previous`.
    pub fn just_pressed(self, previous: InputState) -> InputState {
        self.difference(previous)
    }
}
