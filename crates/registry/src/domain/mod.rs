pub mod device_service;
pub mod event_query_service;
pub mod pagination;
pub mod user_service;

pub use device_service::*;
pub use event_query_service::*;
pub use pagination::*;
pub use user_service::*;
