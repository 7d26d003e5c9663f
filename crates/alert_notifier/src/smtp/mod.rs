mod smtp_config;
mod smtp_mail_transport;

pub use smtp_config::*;
pub use smtp_mail_transport::*;
