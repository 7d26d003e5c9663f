mod client;
mod config;
mod device_repository;
mod motion_event_repository;
mod user_repository;

pub use client::*;
pub use config::*;
pub use device_repository::*;
pub use motion_event_repository::*;
pub use user_repository::*;
