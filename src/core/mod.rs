pub mod error;

pub use error::{LoadError, LoadResult};
