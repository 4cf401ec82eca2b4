//! One module per scoring strategy.

pub mod conditional;
pub mod custom;
pub mod percentile;
pub mod range_based;
pub mod simple_sum;
pub mod weighted;
pub mod z_score;
