//! Layout configuration surface, modeled on `flui-scheduler`'s config types:
//! a small, `Default`-able struct of knobs rather than constructor
//! parameters, so new options don't break existing call sites.

/// What to do when an element's `render` future resolves to an error or
/// panics (§7, Open Question resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicPolicy {
    /// Record the failure against the offending element (via
    /// [`HostRenderFailure`](crate::error::HostRenderFailure)) and continue
    /// reconciling every unaffected sibling and ancestor. The failed
    /// element's previous model, if any, is retained in the outgoing
    /// `LayoutUpdate` rather than removed.
    Isolate,
    /// Propagate the failure out of `Layout::render`/`update`, abandoning
    /// the in-progress reconciliation pass entirely. Intended for test
    /// harnesses and development builds that want renders to fail loudly.
    Abort,
}

impl Default for PanicPolicy {
    fn default() -> Self {
        PanicPolicy::Isolate
    }
}

/// Tunable behavior for a [`Layout`](crate::layout::Layout).
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// How a single element's render failure affects the rest of the tree.
    pub panic_policy: PanicPolicy,
    /// Maximum number of in-flight renders a single `render`/`update` pass
    /// will drive concurrently via the internal `FutureQueue` before it
    /// starts waiting for completions. `None` means unbounded (bounded only
    /// by however many elements actually need re-rendering this pass).
    pub max_concurrent_renders: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            panic_policy: PanicPolicy::default(),
            max_concurrent_renders: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_isolate() {
        assert_eq!(LayoutConfig::default().panic_policy, PanicPolicy::Isolate);
    }
}
