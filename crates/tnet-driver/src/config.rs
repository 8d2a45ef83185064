use std::time::Duration;

use tnet_decoder::DecoderOptions;

/// Configuration for the TNET transport driver.
///
/// Controls how a client fragments outgoing values, how long it waits for
/// replies, and which limits the server applies to incoming values.
///
/// ```text
/// ┌──────────────┬──────────┬───────────────────────────────────────────┐
/// │ Field        │ Default  │ Purpose                                   │
/// ├──────────────┼──────────┼───────────────────────────────────────────┤
/// │ chunk_min    │ 2        │ smallest fragment written per send        │
/// │ chunk_max    │ 10       │ largest fragment written per send         │
/// │ char_delay   │ 10 ms    │ reply wait between fragments              │
/// │ drain_delay  │ 2 s      │ reply wait after the last fragment, and   │
/// │              │          │ per read while draining                   │
/// │ idle_timeout │ 30 s     │ longest a single socket read or write may │
/// │              │          │ wait before the peer counts as stalled    │
/// │ recv_buffer  │ 4096     │ bytes requested per socket read           │
/// │ decoder      │ default  │ depth and size limits for the server      │
/// └──────────────┴──────────┴───────────────────────────────────────────┘
/// ```
///
/// Fragment sizes are drawn uniformly from `chunk_min..=chunk_max` and
/// capped by what is left of the message. The long `drain_delay` covers a
/// slow server; a closing server ends the wait immediately.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    pub chunk_min: usize,
    pub chunk_max: usize,
    pub char_delay: Duration,
    pub drain_delay: Duration,
    pub idle_timeout: Duration,
    pub recv_buffer: usize,
    pub decoder: DecoderOptions,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            chunk_min: 2,
            chunk_max: 10,
            char_delay: Duration::from_millis(10),
            drain_delay: Duration::from_secs(2),
            idle_timeout: Duration::from_secs(30),
            recv_buffer: 4096,
            decoder: DecoderOptions::default(),
        }
    }
}

impl DriverConfig {
    /// Bounds with `chunk_min <= chunk_max`, both at least one byte.
    #[must_use]
    pub fn chunk_bounds(&self) -> (usize, usize) {
        let lo = self.chunk_min.max(1);
        (lo, self.chunk_max.max(lo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.chunk_bounds(), (2, 10));
        assert_eq!(config.char_delay, Duration::from_millis(10));
        assert_eq!(config.drain_delay, Duration::from_secs(2));
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn chunk_bounds_are_normalised() {
        let config = DriverConfig { chunk_min: 0, chunk_max: 0, ..DriverConfig::default() };
        assert_eq!(config.chunk_bounds(), (1, 1));

        let config = DriverConfig { chunk_min: 8, chunk_max: 3, ..DriverConfig::default() };
        assert_eq!(config.chunk_bounds(), (8, 8));
    }
}
