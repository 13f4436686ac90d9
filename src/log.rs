use std::time::Instant;

/// Run logger. Every message is stamped with the whole seconds elapsed since
/// the logger was created; debug messages are dropped unless `enabled`.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    enabled: bool,
    start: Instant,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Logger {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            start: Instant::now(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn elapsed(&self) -> u64 {
        self.start.elapsed().as_secs()
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if !self.enabled {
            return;
        }

        tracing::debug!("[{}s] {}", self.elapsed(), message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        tracing::info!("[{}s] {}", self.elapsed(), message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        tracing::warn!("[{}s] {}", self.elapsed(), message.as_ref());
    }
}
