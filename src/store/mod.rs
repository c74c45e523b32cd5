pub mod cloudant;
pub mod error;
pub mod iam;
pub mod memory;
pub mod traits;

pub use cloudant::*;
pub use error::*;
pub use iam::*;
pub use memory::*;
pub use traits::*;
