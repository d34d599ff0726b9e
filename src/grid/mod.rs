pub mod control_grid;
pub mod grid_index;
pub use control_grid::*;
pub use grid_index::*;
