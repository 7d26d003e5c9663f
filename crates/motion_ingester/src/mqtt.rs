mod connection_state;
mod mqtt_config;
mod subscriber;
mod topic_filter;

pub use connection_state::ConnectionState;
pub use mqtt_config::MqttConfig;
pub use subscriber::MqttSubscriber;
pub use topic_filter::TopicFilter;
