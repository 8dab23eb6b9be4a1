pub mod config;
pub mod paths;

pub use config::Config;
pub use paths::{absolutize, normalize_path};
