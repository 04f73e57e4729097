pub mod bloom;
pub mod node;
pub mod resolve;
pub mod visited;

pub use bloom::BloomFilter;
pub use node::{Asset, PageNode};
pub use resolve::{in_domain, resolve};
pub use visited::VisitedSet;
