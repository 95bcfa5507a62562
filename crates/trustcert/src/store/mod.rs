//! Trust store container and its on-disk handle.

mod codec;
mod container;
mod handle;

pub use container::TrustStore;
pub use handle::TrustStoreHandle;
