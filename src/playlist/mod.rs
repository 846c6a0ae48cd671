pub mod config;
pub mod generator;
pub mod metadata;
pub mod preferences;
pub mod prompt;
pub mod queries;
pub mod scoring;
pub mod search;
pub mod utils;


pub use config::*;
pub use generator::*;
pub use metadata::*;
pub use preferences::*;
