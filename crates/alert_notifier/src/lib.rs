pub mod domain;
pub mod smtp;

pub use domain::*;
pub use smtp::*;
