pub mod comment;
pub mod config;
pub mod csv_io;
pub mod error;
pub mod io;
pub mod issue;
pub mod meeting;
pub mod object;
pub mod paths;
pub mod pins;
pub mod recurring;
pub mod report;
pub mod token;
pub mod types;

pub use error::{Result, SopError};
