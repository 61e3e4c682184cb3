//! Filesystem-backed stores under the root directory: the content-addressed
//! package pool and the published repository tree.

mod pool;
mod public;

pub use pool::PackagePool;
pub use public::PublishedStorage;
