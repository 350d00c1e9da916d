//! # Form Readiness
//!
//! The vendor SDK injects its payment form late and asynchronously. Paying
//! before the form is interactive makes the SDK fail to find its fields, so
//! the pay action stays disabled until [`FormReadinessDetector`] sees the
//! form appear inside the target region.
//!
//! The page is reached through [`FormSurface`]: a snapshot of the elements
//! under a target plus a feed of structural-change notifications. A browser
//! binding backs it with a mutation observer; tests back it with a fake.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// What the detector needs to know about one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    /// Lowercase tag name
    pub tag: String,
    pub classes: Vec<String>,
    /// Attribute names present on the element
    pub attributes: Vec<String>,
}

impl ElementInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }
}

/// Stream of structural changes under an observed target.
///
/// Dropping the feed deregisters the observer.
#[async_trait]
pub trait MutationFeed: Send {
    /// Resolves on the next change; `false` once the feed can no longer
    /// deliver changes.
    async fn next_change(&mut self) -> bool;
}

/// The UI region the SDK renders into
pub trait FormSurface: Send + Sync {
    /// Elements currently under `target` (the subtree, target excluded)
    fn elements(&self, target: &str) -> Vec<ElementInfo>;

    /// Subscribe to changes under `target`
    fn observe(&self, target: &str) -> Box<dyn MutationFeed>;
}

/// Type alias for a shared surface (dynamic dispatch)
pub type BoxedSurface = Arc<dyn FormSurface>;

/// Indicators of an interactive payment form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessMarkers {
    pub tags: Vec<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<String>,
}

impl Default for ReadinessMarkers {
    fn default() -> Self {
        Self {
            tags: ["iframe", "input", "select", "textarea"]
                .map(String::from)
                .to_vec(),
            classes: ["checkout-form", "payment-form"].map(String::from).to_vec(),
            attributes: vec!["data-payment-form".to_string()],
        }
    }
}

impl ReadinessMarkers {
    pub fn matches(&self, element: &ElementInfo) -> bool {
        self.tags.iter().any(|t| *t == element.tag)
            || element.classes.iter().any(|c| self.classes.contains(c))
            || element.attributes.iter().any(|a| self.attributes.contains(a))
    }
}

/// Bounded wait for the payment form
pub struct FormReadinessDetector {
    surface: BoxedSurface,
    markers: ReadinessMarkers,
}

impl FormReadinessDetector {
    pub fn new(surface: BoxedSurface) -> Self {
        Self {
            surface,
            markers: ReadinessMarkers::default(),
        }
    }

    pub fn with_markers(mut self, markers: ReadinessMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Whether `target` holds an interactive form right now
    pub fn is_ready(&self, target: &str) -> bool {
        self.surface
            .elements(target)
            .iter()
            .any(|element| self.markers.matches(element))
    }

    /// Wait until `target` holds an interactive form.
    ///
    /// Returns `true` immediately if the form is already there, `false` if
    /// `timeout` elapses first. The observer is dropped on every outcome and
    /// each call starts from a fresh check.
    pub async fn wait_for_ready(&self, target: &str, timeout: Duration) -> bool {
        if self.is_ready(target) {
            return true;
        }

        let mut feed = self.surface.observe(target);
        let watching = async {
            // the form may have landed between the first check and observe()
            if self.is_ready(target) {
                return true;
            }
            while feed.next_change().await {
                if self.is_ready(target) {
                    return true;
                }
            }
            debug!(target, "form surface stopped reporting changes");
            false
        };

        let ready = match tokio::time::timeout(timeout, watching).await {
            Ok(ready) => ready,
            Err(_) => {
                debug!(target, timeout_ms = timeout.as_millis() as u64, "form not ready in time");
                false
            }
        };
        drop(feed);
        ready
    }
}
