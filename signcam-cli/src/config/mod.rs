mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::SigncamConfig;
#[cfg(test)]
pub use types::{AppConfig, OperatorConfig};
