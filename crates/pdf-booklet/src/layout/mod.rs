//! Layout calculation modules for cut-and-stack imposition
//!
//! This module handles:
//! - Sheet planning (which logical page lands in which quadrant)
//! - Sheet geometry (cell bounds on the A4 sheet)
//! - Content placement (scaling, centering, back-side rotation)

mod placement;
mod plan;
mod types;

pub use placement::*;
pub use plan::*;
pub use types::*;
