//! Hill-climbing placement of hospitals on a grid.
//!
//! Houses are fixed; hospitals move one cell at a time toward the placement
//! that minimizes the summed Manhattan distance from every house to its
//! nearest hospital.

mod color;
mod coordinate;
mod cost;
mod error;
mod neighborhood;
mod optimizer;
mod render;
mod snapshot;
mod space;

pub mod prelude {
    pub use crate::color::*;
    pub use crate::coordinate::*;
    pub use crate::cost::*;
    pub use crate::error::*;
    pub use crate::neighborhood::*;
    pub use crate::optimizer::*;
    pub use crate::render::*;
    pub use crate::snapshot::*;
    pub use crate::space::*;
}
