pub mod executor;
pub mod host;

pub use executor::*;
pub use host::*;
