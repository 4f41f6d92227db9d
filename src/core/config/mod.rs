pub mod data;
pub mod defaults;
pub mod io;

pub use data::{Config, ProviderSettings};
pub use io::{config_dir, ConfigError};
