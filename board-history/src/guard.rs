//! Re-entrancy guard for snapshot restoration.
//!
//! Applying a snapshot to the live document usually fires the same change
//! hooks as a user edit. The guard marks the window in which a restore is in
//! progress so that captures coming from those hooks can be ignored.

use std::cell::Cell;
use std::rc::Rc;

use tracing::trace;

/// Shared "restoring" flag.
///
/// Clones share the same flag. The flag can only be raised through
/// [`RestoreGuard::apply`], which lowers it again on every exit path.
#[derive(Debug, Clone, Default)]
pub struct RestoreGuard {
    restoring: Rc<Cell<bool>>,
}

impl RestoreGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a restore is running.
    pub fn is_restoring(&self) -> bool {
        self.restoring.get()
    }

    /// Run `restore` with the flag raised.
    ///
    /// The flag is restored to its previous value when `restore` returns,
    /// fails, or unwinds. Nested calls keep the flag raised until the
    /// outermost one finishes.
    pub fn apply<T, E>(&self, restore: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let _scope = RestoreScope::enter(&self.restoring);
        restore()
    }
}

struct RestoreScope<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> RestoreScope<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        trace!(nested = previous, "restore started");
        Self { flag, previous }
    }
}

impl Drop for RestoreScope<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
        trace!(restoring = self.previous, "restore finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_flag_raised_only_inside_apply() {
        let guard = RestoreGuard::new();
        assert!(!guard.is_restoring());

        let seen = guard.apply(|| Ok::<_, ()>(guard.is_restoring())).unwrap();

        assert!(seen);
        assert!(!guard.is_restoring());
    }

    #[test]
    fn test_flag_released_on_error() {
        let guard = RestoreGuard::new();
        let result: Result<(), &str> = guard.apply(|| Err("import failed"));

        assert_eq!(result, Err("import failed"));
        assert!(!guard.is_restoring());
    }

    #[test]
    fn test_flag_released_on_panic() {
        let guard = RestoreGuard::new();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), ()> = guard.apply(|| panic!("importer blew up"));
        }));

        assert!(outcome.is_err());
        assert!(!guard.is_restoring());
    }

    #[test]
    fn test_nested_apply_keeps_flag_until_outer_exit() {
        let guard = RestoreGuard::new();
        guard
            .apply(|| {
                guard.apply(|| Ok::<_, ()>(()))?;
                assert!(guard.is_restoring());
                Ok::<_, ()>(())
            })
            .unwrap();

        assert!(!guard.is_restoring());
    }

    #[test]
    fn test_clones_share_flag() {
        let guard = RestoreGuard::new();
        let observer = guard.clone();

        guard
            .apply(|| {
                assert!(observer.is_restoring());
                Ok::<_, ()>(())
            })
            .unwrap();

        assert!(!observer.is_restoring());
    }
}
