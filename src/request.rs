use std::fmt;
use std::fmt::Display;

/// Travel direction of an elevator or a request. `Idle` is only ever an
/// elevator state: a request carrying `Idle` is rejected at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl Direction {
    // Packed form for lock-free publication of an elevator's direction.
    pub(crate) fn bits(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Idle => 2,
        }
    }

    pub(crate) fn from_bits(bits: u8) -> Direction {
        match bits {
            0 => Direction::Up,
            1 => Direction::Down,
            _ => Direction::Idle,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
            Direction::Idle => write!(f, "IDLE"),
        }
    }
}

/// Where a request was made. An `External` call needs a pickup stop at the
/// call floor on top of the drop-off; an `Internal` one only needs the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Internal,
    External,
}

/// One travel intent. Immutable once handed to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub origin: u8,
    pub target: u8,
    pub kind: RequestKind,
    pub direction: Direction,
}

impl Request {
    pub fn new(origin: u8, target: u8, kind: RequestKind, direction: Direction) -> Request {
        Request {
            origin,
            target,
            kind,
            direction,
        }
    }
}
