pub mod album;
pub mod select;

pub use album::*;
pub use select::*;
