pub mod database;
pub mod settings;
pub mod vault;

pub use settings::{Environment, Settings};
