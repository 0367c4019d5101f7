#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod normalize;
pub mod stream;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use normalize::normalize_word;
pub use stream::WordStream;
pub use types::Token;
