pub mod equity;
pub mod metrics;
pub mod rank;
pub mod recommend;
pub mod zscore;
