//! Channel configuration for result collection

/// Buffer configuration for the result channel (dispatched calls -> consumer)
///
/// The capacity is independent of QPS and duration; it is sized generously so
/// drops only occur when consumption falls far behind production.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Result channel buffer size
    pub result_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            result_buffer: 100_000,
        }
    }
}

impl ChannelConfig {
    /// Create a new channel config with a custom result buffer size
    pub fn with_result_buffer(mut self, size: usize) -> Self {
        self.result_buffer = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_default() {
        let config = ChannelConfig::default();
        assert_eq!(config.result_buffer, 100_000);
    }

    #[test]
    fn test_channel_config_builder() {
        let config = ChannelConfig::default().with_result_buffer(64);
        assert_eq!(config.result_buffer, 64);
    }
}
