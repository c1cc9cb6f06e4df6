pub mod dataset;
pub mod diagnose;
pub mod doctor;
pub mod evaluate;
pub mod generate;
pub mod train;
