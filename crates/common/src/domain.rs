mod alert;
mod device;
mod motion_event;
mod result;
mod user;

pub use alert::*;
pub use device::*;
pub use motion_event::*;
pub use result::*;
pub use user::*;
