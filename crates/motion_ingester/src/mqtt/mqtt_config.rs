use rumqttc::MqttOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub topic_filter: String,
    pub client_id: String,
    pub keep_alive_secs: u64,
    /// Pause after a connection error before polling again (default: 5 seconds)
    pub reconnect_delay_secs: u64,
    /// Capacity of the client request channel
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "broker.hivemq.com".to_string(),
            port: 1883,
            topic_filter: "sensors/+/events".to_string(),
            client_id: "motionwatch-ingester".to_string(),
            keep_alive_secs: 60,
            reconnect_delay_secs: 5,
            channel_capacity: 100,
        }
    }
}

impl MqttConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(&self.client_id, &self.host, self.port);
        options.set_keep_alive(Duration::from_secs(self.keep_alive_secs));
        options.set_clean_session(true);
        options
    }
}
