pub mod analysis;
pub mod forest;
pub mod session;

pub use analysis::*;
pub use forest::*;
pub use session::*;
