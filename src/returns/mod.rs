//! Bond return data: the validated tenor-by-month HPR grid and its CSV loader

mod data;
pub mod loader;

pub use data::{MatrixError, ReturnMatrix};
pub use loader::{load_return_csv, LoadError};
