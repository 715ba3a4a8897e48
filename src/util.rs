//! Phase timing.

use std::borrow::Cow;
use std::time::Instant;

/// Logs how long a phase took when dropped.
///
/// ```ignore
/// let _t = Timed::info("Adaptive refinement");
/// // ... refine ...
/// // logs "Adaptive refinement: 1.234s"
/// ```
pub struct Timed {
    name: Cow<'static, str>,
    start: Instant,
}

impl Timed {
    pub fn info(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for Timed {
    fn drop(&mut self) {
        log::info!("{}: {:.3?}", self.name, self.start.elapsed());
    }
}
