//! Swappable router snapshot.
//!
//! Readers load the current [`TreeRouter`] without taking a lock; a rebuild
//! replaces it atomically. A reader that loaded the old snapshot keeps using it
//! until it drops its `Arc`.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use super::builder::{BuildError, TreeRouteBuilder};
use super::core::TreeRouter;

/// Shared handle to the active router
#[derive(Debug)]
pub struct SharedRouter<H> {
    current: Arc<ArcSwap<TreeRouter<H>>>,
}

impl<H> Clone for SharedRouter<H> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<H> SharedRouter<H> {
    #[must_use]
    pub fn new(router: TreeRouter<H>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(router)),
        }
    }

    /// The active snapshot
    #[must_use]
    pub fn load(&self) -> Arc<TreeRouter<H>> {
        self.current.load_full()
    }

    /// Replace the active snapshot
    pub fn store(&self, router: TreeRouter<H>) {
        self.current.store(Arc::new(router));
    }

    /// Build a new snapshot from `builder` and swap it in.
    ///
    /// On error the active snapshot is left in place.
    pub fn rebuild(&self, builder: &TreeRouteBuilder<H>) -> Result<(), BuildError>
    where
        H: Clone,
    {
        let router = builder.build()?;
        let inbound_count = router.inbound_entries().count();
        let outbound_count = router.outbound_entries().count();
        self.store(router);
        info!(inbound_count, outbound_count, "Router snapshot swapped");
        Ok(())
    }
}
