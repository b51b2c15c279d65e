pub mod aggregator;
pub mod calibration;
pub mod checks;
pub mod filter;
pub mod matcher;
pub mod parts;
pub mod report;
