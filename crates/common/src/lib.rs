pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
