pub mod analyze;
pub mod compare;
pub mod export;
pub mod query;
pub mod reconstruct;
