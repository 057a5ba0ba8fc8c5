pub mod api;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod utils;

pub use error::{GridwatchError, Result};
