pub mod args;
mod r#impl;
mod structs;

pub use r#impl::{DEFAULT_CONFIG_PATH, ENV_PREFIX};
pub use structs::*;
