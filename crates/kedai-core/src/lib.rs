pub mod config;
pub mod error;
pub mod types;

pub use config::KedaiConfig;
pub use error::{KedaiError, Result};
pub use types::Timestamp;
