use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "component is still mounted" flag.
///
/// Cloned into every deferred continuation (debounced search, async loads).
/// Each continuation checks [`Liveness::is_alive`] before touching state, so
/// work that lands after teardown is a no-op.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Irreversible.
    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let liveness = Liveness::new();
        let observer = liveness.clone();
        assert!(observer.is_alive());
        liveness.kill();
        assert!(!observer.is_alive());
    }
}
