use common::domain::{DomainError, DomainResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Level {
    Exact(String),
    /// `+`
    Single,
    /// `#`, always the last level
    Multi,
}

/// MQTT subscription filter with `+` and trailing `#` wildcards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFilter {
    raw: String,
    levels: Vec<Level>,
}

impl TopicFilter {
    /// Parse a topic filter such as `sensors/+/events` or `sensors/#`
    ///
    /// # Examples
    /// ```
    /// use motion_ingester::mqtt::TopicFilter;
    ///
    /// let filter = TopicFilter::parse("sensors/+/events").unwrap();
    /// assert!(filter.matches("sensors/esp32-1/events"));
    /// assert!(!filter.matches("sensors/esp32-1/status"));
    /// ```
    pub fn parse(filter: &str) -> DomainResult<Self> {
        if filter.is_empty() {
            return Err(DomainError::InvalidTopicFilter(
                "topic filter cannot be empty".to_string(),
            ));
        }

        let parts: Vec<&str> = filter.split('/').collect();
        let last = parts.len() - 1;
        let mut levels = Vec::with_capacity(parts.len());

        for (i, part) in parts.into_iter().enumerate() {
            let level = match part {
                "+" => Level::Single,
                "#" if i == last => Level::Multi,
                "#" => {
                    return Err(DomainError::InvalidTopicFilter(format!(
                        "'#' must be the last level in '{}'",
                        filter
                    )))
                }
                p if p.contains('+') || p.contains('#') => {
                    return Err(DomainError::InvalidTopicFilter(format!(
                        "wildcards must occupy a whole level in '{}'",
                        filter
                    )))
                }
                p => Level::Exact(p.to_string()),
            };
            levels.push(level);
        }

        Ok(Self {
            raw: filter.to_string(),
            levels,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether a concrete topic name matches this filter
    pub fn matches(&self, topic: &str) -> bool {
        // Wildcards at the first level never match system topics
        if topic.starts_with('$') && !matches!(self.levels.first(), Some(Level::Exact(_))) {
            return false;
        }

        let mut topic_levels = topic.split('/');

        for level in &self.levels {
            match level {
                // Also matches the parent level itself: `a/#` matches `a`
                Level::Multi => return true,
                Level::Single => {
                    if topic_levels.next().is_none() {
                        return false;
                    }
                }
                Level::Exact(expected) => match topic_levels.next() {
                    Some(actual) if actual == expected => {}
                    _ => return false,
                },
            }
        }

        topic_levels.next().is_none()
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
