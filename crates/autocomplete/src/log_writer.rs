use std::fmt;

/// Verbose log channel that can be switched off per request.
///
/// Messages go to `log::debug!` under the `context_autocomplete` target,
/// prefixed with the channel name.
#[derive(Debug, Clone, Copy)]
pub struct LogWriter {
    enabled: bool,
    prefix: &'static str,
}

impl LogWriter {
    pub const fn new(prefix: &'static str, enabled: bool) -> Self {
        Self { enabled, prefix }
    }

    pub const fn disabled() -> Self {
        Self::new("", false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && log::log_enabled!(log::Level::Debug)
    }

    pub fn log(&self, message: fmt::Arguments<'_>) {
        if self.is_enabled() {
            log::debug!("{}: {}", self.prefix, message);
        }
    }
}
