//! Tour state and the 2-opt neighborhood.

mod state;
mod two_opt;

pub use state::{Incumbent, Tour};
pub use two_opt::TwoOptMove;
