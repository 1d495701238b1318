pub mod domain;
pub mod span;
mod util;

pub use domain::*;
pub use span::*;
pub use util::*;
