pub mod engine;
pub mod generator;
pub mod script;

pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
pub use engine::{GeneratedScript, GenerationEngine};
