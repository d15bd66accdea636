pub mod forest;
pub mod splay;
pub use forest::{LinkCutForest, NodeHandle, LCF};
