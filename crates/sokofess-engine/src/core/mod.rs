pub use self::{board::*, position::*, state::*};

pub(crate) mod board;
pub(crate) mod position;
pub(crate) mod state;
