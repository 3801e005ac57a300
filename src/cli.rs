//! Command-line interface for training, evaluating, and playing against
//! policies

pub mod evaluate;
pub mod play;
pub mod train;
