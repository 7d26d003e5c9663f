mod alert_notifier;
mod cooldown_tracker;
mod error;
mod mail_transport;
mod template;

pub use alert_notifier::*;
pub use cooldown_tracker::*;
pub use error::*;
pub use mail_transport::*;
pub use template::*;
