pub mod error;
pub mod result;
pub mod session_store;

pub use error::*;
pub use result::*;
pub use session_store::*;
