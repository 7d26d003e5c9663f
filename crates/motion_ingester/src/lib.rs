mod domain;
mod motion_ingester;
pub mod mqtt;

pub use domain::*;
pub use motion_ingester::*;
