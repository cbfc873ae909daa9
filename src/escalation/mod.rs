//! Rendered-DOM escalation.
//!
//! Some retail pages only reveal ingredients after JavaScript runs and a
//! disclosure widget is clicked. Escalation loads such a page in a real
//! browser, clicks the configured disclosure labels and hands the rendered
//! markup back to the extractors.
//!
//! The browser is expensive, so one session is kept per [`SessionPool`]
//! and reused across extractions. Before each reuse the pool checks the
//! session is still alive and silently replaces a dead one. Acquisition is
//! serialized by a mutex: concurrent escalations wait for each other.

#[cfg(feature = "browser")]
pub mod chromium;

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::document::FetchedDocument;
use crate::error::{Error, Result};

/// Disclosure labels clicked by default, in order.
pub const DEFAULT_DISCLOSURE_LABELS: &[&str] = &[
    "Ingredients",
    "Label info",
    "Nutritional Information",
    "Nutrition facts",
    "Guaranteed Analysis",
    "Product details",
];

/// What to click on a rendered page and how long to wait.
///
/// Waits are fixed sleeps, not adaptive polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosurePlan {
    /// Visible control texts. Exact matches are tried before substrings.
    pub labels: Vec<String>,
    /// Sleep after navigation.
    pub page_wait: Duration,
    /// Sleep after each click.
    pub click_wait: Duration,
    /// Upper bound on clicks per page.
    pub max_clicks: usize,
}

impl Default for DisclosurePlan {
    fn default() -> Self {
        Self {
            labels: DEFAULT_DISCLOSURE_LABELS.iter().map(|s| (*s).to_string()).collect(),
            page_wait: Duration::from_secs(2),
            click_wait: Duration::from_secs(3),
            max_clicks: 4,
        }
    }
}

/// A live browser that can render a page after clicking disclosure controls.
pub trait BrowserSession: Send {
    /// Trivial property read; `false` means the session must be replaced.
    fn is_alive(&mut self) -> bool;

    /// Load `url`, apply `plan`, and return the resulting document markup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Escalation`] when navigation, clicking or reading
    /// the page fails.
    fn render(&mut self, url: &str, plan: &DisclosurePlan) -> Result<String>;

    /// Release browser resources. Errors are swallowed.
    fn close(&mut self);
}

/// Creates browser sessions on demand.
pub trait SessionFactory: Send + Sync {
    /// Launch a new session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Escalation`] when no browser can be started.
    fn create(&self) -> Result<Box<dyn BrowserSession>>;
}

type Slot = Option<Box<dyn BrowserSession>>;

/// One lazily created, reusable browser session behind a mutex.
pub struct SessionPool {
    factory: Box<dyn SessionFactory>,
    slot: Mutex<Slot>,
}

impl SessionPool {
    pub fn new(factory: impl SessionFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            slot: Mutex::new(None),
        }
    }

    /// Lock the pool and return a live session, creating one if needed.
    ///
    /// A poisoned lock is recovered and whatever session it guarded is
    /// closed, since a panic mid-render leaves the browser in an unknown state.
    ///
    /// # Errors
    ///
    /// Propagates the factory error when a new session cannot be created.
    pub fn acquire(&self) -> Result<SessionGuard<'_>> {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("browser session lock was poisoned, discarding session");
                self.slot.clear_poison();
                let mut guard = poisoned.into_inner();
                if let Some(mut session) = guard.take() {
                    session.close();
                }
                guard
            }
        };

        if let Some(session) = slot.as_mut() {
            if !session.is_alive() {
                tracing::warn!("browser session is no longer alive, recreating");
                if let Some(mut dead) = slot.take() {
                    dead.close();
                }
            }
        }

        if slot.is_none() {
            tracing::debug!("launching browser session");
            *slot = Some(self.factory.create()?);
        }

        Ok(SessionGuard { slot })
    }

    /// Close the held session, if any. The next `acquire` starts a new one.
    pub fn shutdown(&self) {
        let mut slot = match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut session) = slot.take() {
            session.close();
        }
    }

    /// Whether a session is currently held.
    #[must_use]
    pub fn has_session(&self) -> bool {
        match self.slot.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

impl Drop for SessionPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Exclusive access to the pooled session. Dropping it releases the lock.
pub struct SessionGuard<'a> {
    slot: MutexGuard<'a, Slot>,
}

impl SessionGuard<'_> {
    /// Render through the held session.
    ///
    /// # Errors
    ///
    /// Returns the session's error, or [`Error::Escalation`] if the
    /// session was discarded.
    pub fn render(&mut self, url: &str, plan: &DisclosurePlan) -> Result<String> {
        match self.slot.as_deref_mut() {
            Some(session) => session.render(url, plan),
            None => Err(Error::Escalation("session was discarded".to_string())),
        }
    }

    /// Close the session and empty the pool.
    pub fn discard(mut self) {
        if let Some(mut session) = self.slot.take() {
            session.close();
        }
    }
}

/// Renders pages through a shared [`SessionPool`].
#[derive(Clone)]
pub struct Escalator {
    pool: Arc<SessionPool>,
    plan: DisclosurePlan,
}

impl Escalator {
    #[must_use]
    pub fn new(pool: Arc<SessionPool>) -> Self {
        Self {
            pool,
            plan: DisclosurePlan::default(),
        }
    }

    #[must_use]
    pub fn with_plan(mut self, plan: DisclosurePlan) -> Self {
        self.plan = plan;
        self
    }

    #[must_use]
    pub fn plan(&self) -> &DisclosurePlan {
        &self.plan
    }

    #[must_use]
    pub fn pool(&self) -> &SessionPool {
        self.pool.deref()
    }

    /// Render `url` and parse the result.
    ///
    /// A session that fails and then reports itself dead is discarded so
    /// the next escalation starts fresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Escalation`] (or the factory's error) on failure.
    pub fn render(&self, url: &str) -> Result<FetchedDocument> {
        let mut guard = self.pool.acquire()?;
        tracing::info!(url, "escalating to rendered DOM");

        match guard.render(url, &self.plan) {
            Ok(html) => Ok(FetchedDocument::parse(html)),
            Err(err) => {
                let alive = guard.slot.as_deref_mut().is_some_and(BrowserSession::is_alive);
                if !alive {
                    guard.discard();
                }
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for Escalator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Escalator").field("plan", &self.plan).finish_non_exhaustive()
    }
}
