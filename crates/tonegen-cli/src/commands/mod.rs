//! CLI command implementations

pub mod args;
pub mod doctor;
pub mod generate;
pub mod inspect;
pub mod render;
pub mod reporting;
pub mod sample;
