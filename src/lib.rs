pub mod cli;
pub mod ctx;
pub mod dataset;
pub mod error;
pub mod input;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod protocol;
pub mod response;
pub mod schema;
pub mod session;

pub use error::{Result, RoiError};
