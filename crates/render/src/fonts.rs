//! Font registry with a bounded readiness check.
//!
//! Fonts may arrive after a rasterization request does (loaded from disk or
//! fetched on demand). [`FontRegistry::wait_for`] polls the registry until
//! the requested family is present or a bounded wait elapses.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use usvg::fontdb::Database;

/// Generic CSS families that always resolve to something.
const GENERIC_FAMILIES: [&str; 5] = ["serif", "sans-serif", "monospace", "cursive", "fantasy"];

/// Polling policy for font readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontWait {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl Default for FontWait {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            max_wait: Duration::from_secs(2),
        }
    }
}

/// Shared, growable font database.
#[derive(Debug, Default)]
pub struct FontRegistry {
    db: RwLock<Arc<Database>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the host's system fonts.
    pub fn with_system_fonts() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "System fonts loaded");
        Self {
            db: RwLock::new(Arc::new(db)),
        }
    }

    /// Add a font from raw TTF/OTF bytes.
    pub fn register(&self, data: Vec<u8>) {
        let mut guard = self.db.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::make_mut(&mut guard).load_font_data(data);
    }

    /// Current contents, cheap to clone into a render task.
    pub fn snapshot(&self) -> Arc<Database> {
        self.db
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether `family` can be resolved right now.
    pub fn is_loaded(&self, family: &str) -> bool {
        let family = family.trim();
        if GENERIC_FAMILIES.iter().any(|g| g.eq_ignore_ascii_case(family)) {
            return true;
        }
        self.snapshot().faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(family))
        })
    }

    /// Poll until `family` is loaded. Returns `false` if the wait ran out.
    pub async fn wait_for(&self, family: &str, wait: FontWait) -> bool {
        let deadline = tokio::time::Instant::now() + wait.max_wait;
        loop {
            if self.is_loaded(family) {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(wait.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_families_are_always_ready() {
        let registry = FontRegistry::new();
        assert!(registry.is_loaded("sans-serif"));
        assert!(registry.is_loaded(" Monospace "));
        assert!(!registry.is_loaded("Bebas Neue"));
    }

    #[tokio::test(start_paused = true)]
    async fn ready_font_returns_immediately() {
        let registry = FontRegistry::new();
        let started = tokio::time::Instant::now();
        assert!(registry.wait_for("serif", FontWait::default()).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_font_gives_up_after_bounded_wait() {
        let registry = FontRegistry::new();
        let wait = FontWait {
            poll_interval: Duration::from_millis(100),
            max_wait: Duration::from_millis(500),
        };
        let started = tokio::time::Instant::now();
        assert!(!registry.wait_for("Bebas Neue", wait).await);
        let elapsed = started.elapsed();
        assert!(elapsed >= wait.max_wait);
        assert!(elapsed < wait.max_wait + wait.poll_interval * 2);
    }
}
