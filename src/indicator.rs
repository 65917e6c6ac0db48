//! Indicator light driver
//!
//! Fire-and-forget light updates; the coordinator never waits for an
//! acknowledgement. The shipped driver renders to the log, standing in
//! for the cabinet's NeoPixel strip.

/// Receives light state pushed by the coordinator.
pub trait IndicatorDriver: Send + Sync {
    fn set_credit_light(&self, on: bool);
    fn set_shuffle_light(&self, on: bool);
}

/// Log-backed indicator for builds without LED hardware.
pub struct LogIndicator {
    color: String,
}

impl LogIndicator {
    pub fn new(color: String) -> Self {
        Self { color }
    }
}

impl IndicatorDriver for LogIndicator {
    fn set_credit_light(&self, on: bool) {
        tracing::debug!(color = %self.color, on, "credit light");
    }

    fn set_shuffle_light(&self, on: bool) {
        tracing::debug!(on, "shuffle light");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every light update so tests can assert on the pushed state.
    #[derive(Default)]
    pub(crate) struct FakeIndicator {
        credit: Mutex<Vec<bool>>,
        shuffle: Mutex<Vec<bool>>,
    }

    impl FakeIndicator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn credit_light(&self) -> Option<bool> {
            self.credit.lock().unwrap().last().copied()
        }

        pub fn shuffle_light(&self) -> Option<bool> {
            self.shuffle.lock().unwrap().last().copied()
        }

        pub fn credit_history(&self) -> Vec<bool> {
            self.credit.lock().unwrap().clone()
        }
    }

    impl IndicatorDriver for FakeIndicator {
        fn set_credit_light(&self, on: bool) {
            self.credit.lock().unwrap().push(on);
        }

        fn set_shuffle_light(&self, on: bool) {
            self.shuffle.lock().unwrap().push(on);
        }
    }
}
