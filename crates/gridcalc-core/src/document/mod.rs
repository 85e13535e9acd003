mod ops;
mod state;

pub use ops::parse_cell_id;
pub use state::{Cell, Grid, Sheet};
