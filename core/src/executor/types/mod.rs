pub mod error;
pub mod outcome;
pub mod package;
pub mod request;

pub use error::*;
pub use outcome::*;
pub use package::*;
pub use request::*;
