pub mod blocks_io;
pub mod error;
pub mod result;
pub mod visitor;

pub use blocks_io::*;
pub use error::*;
pub use result::*;
pub use visitor::*;
