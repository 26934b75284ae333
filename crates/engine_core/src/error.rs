//! Error taxonomy for the visualization engine.
//!
//! None of these are fatal to the host application. Every variant maps to a
//! "draw less" policy at the call site.

use thiserror::Error;

/// Kinds of host-owned resources an overlay handle can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Scene,
    Marker,
    Explosion,
    Label,
    Starfield,
    FrameRequest,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VizError {
    /// Non-finite or out-of-range numeric input. Skip the draw, warn once.
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// Host scene or camera not initialised yet. Retry next frame.
    #[error("scene host is not ready")]
    NotReady,

    /// Zero totals or missing data. Draw a placeholder instead.
    #[error("degenerate data: {0}")]
    DegenerateData(&'static str),

    /// Operation on something already torn down. Swallow at debug level.
    #[error("{0:?} was already released")]
    ResourceReleased(ResourceKind),
}

impl VizError {
    pub fn invalid(field: &'static str, value: f64) -> Self {
        Self::InvalidInput { field, value }
    }

    /// Whether this error should be swallowed without user-visible output.
    pub fn is_silent(&self) -> bool {
        matches!(self, VizError::NotReady | VizError::ResourceReleased(_))
    }
}

/// Latch that lets a renderer log a given invalid-input warning only once.
#[derive(Debug, Default)]
pub struct WarnOnce {
    fired: bool,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self { fired: false }
    }

    /// Log `err` at warn level the first time it is called; later calls only
    /// log at debug level.
    pub fn report(&mut self, context: &str, err: &VizError) {
        if self.fired {
            log::debug!("{context}: {err}");
        } else {
            self.fired = true;
            log::warn!("{context}: {err} (further occurrences logged at debug)");
        }
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_errors() {
        assert!(VizError::NotReady.is_silent());
        assert!(VizError::ResourceReleased(ResourceKind::Marker).is_silent());
        assert!(!VizError::DegenerateData("total is zero").is_silent());
        assert!(!VizError::invalid("latitude", f64::NAN).is_silent());
    }

    #[test]
    fn warn_once_latches() {
        let mut latch = WarnOnce::new();
        assert!(!latch.has_fired());
        latch.report("test", &VizError::invalid("energy", f64::INFINITY));
        latch.report("test", &VizError::invalid("energy", f64::INFINITY));
        assert!(latch.has_fired());
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = VizError::invalid("longitude", 200.0);
        assert_eq!(err.to_string(), "invalid longitude: 200");
    }
}
