mod config;

use alert_notifier::{AlertNotifier, CooldownTracker, SmtpMailTransport};
use common::domain::AlertDispatcher;
use common::postgres::{
    PostgresClient, PostgresDeviceRepository, PostgresMotionEventRepository,
    PostgresUserRepository,
};
use common::telemetry::{init_telemetry, shutdown_telemetry, TelemetryProviders};
use crate::config::ServiceConfig;
use motion_ingester::MotionIngester;
use motionwatch_runner::Runner;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize configuration and tracing
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry (tracing + OpenTelemetry for traces and logs)
    let telemetry_providers: Option<TelemetryProviders> =
        match init_telemetry(&config.telemetry_config()) {
            Ok(providers) => providers,
            Err(e) => {
                eprintln!("Failed to initialize telemetry: {}", e);
                std::process::exit(1);
            }
        };

    info!(
        otel_enabled = config.otel_enabled,
        mqtt_host = %config.mqtt_host,
        mqtt_port = config.mqtt_port,
        "Starting motionwatch-all-in-one service"
    );

    let postgres_client = match PostgresClient::from_config(&config.postgres_config()) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create PostgreSQL client: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = postgres_client.ping().await {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::process::exit(1);
    }

    let alert_dispatcher = match build_alert_dispatcher(&config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Failed to initialize alert notifier: {}", e);
            std::process::exit(1);
        }
    };

    let ingester = match MotionIngester::new(
        config.mqtt_config(),
        Arc::new(PostgresDeviceRepository::new(postgres_client.clone())),
        Arc::new(PostgresUserRepository::new(postgres_client.clone())),
        Arc::new(PostgresMotionEventRepository::new(postgres_client.clone())),
        alert_dispatcher,
    ) {
        Ok(ingester) => ingester,
        Err(e) => {
            error!("Failed to initialize motion ingester: {}", e);
            std::process::exit(1);
        }
    };

    Runner::new()
        .with_named_process("motion_ingester", ingester.into_runner_process())
        .with_closer(move || async move {
            info!("Running cleanup tasks...");
            postgres_client.close();

            // Shutdown telemetry and flush pending traces and logs
            shutdown_telemetry(telemetry_providers);
            Ok(())
        })
        .with_closer_timeout(config.shutdown_timeout())
        .run()
        .await;
}

fn build_alert_dispatcher(config: &ServiceConfig) -> anyhow::Result<Arc<dyn AlertDispatcher>> {
    let notifier_config = config.alert_notifier_config();
    if !notifier_config.has_credentials() {
        warn!("SMTP sender credentials not set, motion alerts will not be sent");
    }

    let transport = SmtpMailTransport::new(&config.smtp_config())?;
    let cooldown = Arc::new(CooldownTracker::new(config.alert_cooldown()));
    debug!(cooldown_secs = config.alert_cooldown_secs, "alert cooldown configured");

    Ok(Arc::new(AlertNotifier::new(
        notifier_config,
        cooldown,
        Arc::new(transport),
    )))
}
