//! Token bag engine: pool construction, pull generation and rank evaluation.
//! Keep this crate free of IO and process concerns.

pub mod assertion;
pub mod bag;
pub mod config;
pub mod document;
pub mod draw;
pub mod eval;
pub mod pool;
pub mod rng;
pub mod sweep;
pub mod token;

pub use assertion::*;
pub use bag::*;
pub use config::*;
pub use document::*;
pub use draw::*;
pub use eval::*;
pub use pool::*;
pub use rng::*;
pub use sweep::*;
pub use token::*;
