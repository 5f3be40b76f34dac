pub mod error;
pub mod field;
pub mod layout;
pub mod mirror;
pub mod record;

pub use error::*;
pub use field::*;
pub use layout::*;
pub use mirror::*;
pub use record::*;
