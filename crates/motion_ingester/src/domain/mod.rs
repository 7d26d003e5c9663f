mod ingest_outcome;
mod motion_event_service;
mod motion_payload;

pub use ingest_outcome::*;
pub use motion_event_service::*;
pub use motion_payload::*;
