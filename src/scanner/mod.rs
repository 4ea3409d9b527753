/// Lazy, cycle-safe traversal of a directory tree.
pub mod walker;

pub use walker::{IgnoreSet, TreeWalker, Walk, WalkStats};
