//! Layout calculation modules
//!
//! This module handles all the geometric calculations for page layout:
//! - Booklet face sequencing (which source page goes where)
//! - Grid layout (N-up cells, section split, poster tiles)
//! - Cell projection (rotation, fit scaling, centering, borders)
//!
//! Everything here is pure: plans refer to pages by index and never touch a
//! document.

mod geometry;
mod grid;
mod projector;
mod signature;
mod types;

pub use geometry::*;
pub use grid::*;
pub use projector::*;
pub use signature::*;
pub use types::*;
