use alert_notifier::{AlertNotifierConfig, SmtpConfig};
use common::postgres::PostgresConfig;
use common::telemetry::TelemetryConfig;
use config::{Config, ConfigError, Environment};
use motion_ingester::mqtt::MqttConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // OpenTelemetry configuration
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    /// OTLP gRPC endpoint
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    // PostgreSQL configuration
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_postgres_max_pool_size")]
    pub postgres_max_pool_size: usize,

    // MQTT configuration
    /// MQTT broker host
    #[serde(default = "default_mqtt_host")]
    pub mqtt_host: String,

    #[serde(default = "default_mqtt_port")]
    pub mqtt_port: u16,

    /// Subscription filter, `+` and trailing `#` wildcards allowed
    #[serde(default = "default_mqtt_topic_filter")]
    pub mqtt_topic_filter: String,

    #[serde(default = "default_mqtt_client_id")]
    pub mqtt_client_id: String,

    #[serde(default = "default_mqtt_keep_alive_secs")]
    pub mqtt_keep_alive_secs: u64,

    /// Delay between polls after a connection error
    #[serde(default = "default_mqtt_reconnect_delay_secs")]
    pub mqtt_reconnect_delay_secs: u64,

    #[serde(default = "default_mqtt_channel_capacity")]
    pub mqtt_channel_capacity: usize,

    // SMTP configuration
    /// Alert sender address, also the SMTP login. Alerts are disabled when empty.
    #[serde(default)]
    pub smtp_sender_email: String,

    /// SMTP password (app password for Gmail)
    #[serde(default)]
    pub smtp_sender_password: String,

    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Upper bound for one alert transmission
    #[serde(default = "default_smtp_timeout_secs")]
    pub smtp_timeout_secs: u64,

    /// Minimum interval between two alerts for one device
    #[serde(default = "default_alert_cooldown_secs")]
    pub alert_cooldown_secs: u64,

    /// Timeout for closers during shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "motionwatch".to_string()
}

fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "motionwatch".to_string()
}

fn default_postgres_username() -> String {
    "motionwatch".to_string()
}

fn default_postgres_password() -> String {
    "motionwatch".to_string()
}

fn default_postgres_max_pool_size() -> usize {
    5
}

fn default_mqtt_host() -> String {
    "broker.hivemq.com".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_topic_filter() -> String {
    "sensors/+/events".to_string()
}

fn default_mqtt_client_id() -> String {
    "motionwatch-ingester".to_string()
}

fn default_mqtt_keep_alive_secs() -> u64 {
    60
}

fn default_mqtt_reconnect_delay_secs() -> u64 {
    5
}

fn default_mqtt_channel_capacity() -> usize {
    100
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_timeout_secs() -> u64 {
    30
}

fn default_alert_cooldown_secs() -> u64 {
    300
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("MOTIONWATCH"))
            .build()?
            .try_deserialize()
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            service_name: self.otel_service_name.clone(),
            otel_endpoint: self.otel_endpoint.clone(),
            otel_enabled: self.otel_enabled,
            log_level: self.log_level.clone(),
        }
    }

    pub fn postgres_config(&self) -> PostgresConfig {
        PostgresConfig {
            host: self.postgres_host.clone(),
            port: self.postgres_port,
            database: self.postgres_database.clone(),
            username: self.postgres_username.clone(),
            password: self.postgres_password.clone(),
            max_pool_size: self.postgres_max_pool_size,
        }
    }

    pub fn mqtt_config(&self) -> MqttConfig {
        MqttConfig {
            host: self.mqtt_host.clone(),
            port: self.mqtt_port,
            topic_filter: self.mqtt_topic_filter.clone(),
            client_id: self.mqtt_client_id.clone(),
            keep_alive_secs: self.mqtt_keep_alive_secs,
            reconnect_delay_secs: self.mqtt_reconnect_delay_secs,
            channel_capacity: self.mqtt_channel_capacity,
        }
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            server: self.smtp_server.clone(),
            port: self.smtp_port,
            username: self.smtp_sender_email.clone(),
            password: self.smtp_sender_password.clone(),
            timeout_secs: self.smtp_timeout_secs,
        }
    }

    pub fn alert_notifier_config(&self) -> AlertNotifierConfig {
        AlertNotifierConfig {
            sender_email: self.smtp_sender_email.clone(),
            sender_password: self.smtp_sender_password.clone(),
            send_timeout_secs: self.smtp_timeout_secs,
        }
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_secs(self.alert_cooldown_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
