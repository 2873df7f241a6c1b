pub mod meta;

pub use meta::*;
