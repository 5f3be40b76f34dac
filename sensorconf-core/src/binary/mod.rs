//! Поле-за-полем чтение и запись little-endian значений поверх байтовых
//! срезов. Никаких наложений структур на память.

pub mod read;
pub mod write;

pub use read::*;
pub use write::*;
