pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::*;
pub use error::*;
pub use pipeline::*;
pub use report::*;
