pub mod error;
pub mod fetch;
pub mod walker;

pub use error::{Result, WalkError};
pub use fetch::PageFetcher;
pub use walker::Walker;
