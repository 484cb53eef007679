//! Configuration loading for token bags.

pub mod load;
pub mod schema;

pub use load::*;
pub use schema::*;
