mod chain;
mod decision;
mod endpoint;
mod entry;

pub use chain::*;
pub use decision::*;
pub use endpoint::*;
pub use entry::*;
