use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_COOLDOWN_PERIOD: Duration = Duration::from_secs(300);

/// Last successful alert per device, keyed by external device ID.
///
/// State is process-local and lost on restart. Entries are never evicted.
pub struct CooldownTracker {
    period: Duration,
    last_sent: Mutex<HashMap<String, Instant>>,
}

impl CooldownTracker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_sent: Mutex::new(HashMap::new()),
        }
    }

    /// Time left before the device may alert again, or `None` if it may alert now
    pub async fn remaining(&self, device_external_id: &str) -> Option<Duration> {
        let last_sent = self.last_sent.lock().await;
        let last = last_sent.get(device_external_id)?;
        let elapsed = Instant::now().duration_since(*last);
        if elapsed < self.period {
            Some(self.period - elapsed)
        } else {
            None
        }
    }

    /// Record a successful send at the current instant
    pub async fn record_sent(&self, device_external_id: &str) {
        let mut last_sent = self.last_sent.lock().await;
        last_sent.insert(device_external_id.to_string(), Instant::now());
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_PERIOD)
    }
}
