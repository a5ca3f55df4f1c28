use std::sync::Arc;

use super::{AttendanceReport, ReportFilter, Roster};
use crate::store::{ChangeFeed, RecordStore, StoreError};

/// Live report for one filter.
///
/// The first call to [`ReportFeed::next`] yields the current state right
/// away; later calls wait for the store to commit a write and then yield a
/// freshly computed report that replaces the previous one. Writes that land
/// while a snapshot is being computed are coalesced into the next one. A feed
/// is cheap to recreate, which is how a client restarts it.
pub struct ReportFeed {
    store: Arc<dyn RecordStore>,
    changes: ChangeFeed,
    filter: ReportFilter,
    primed: bool,
}

impl ReportFeed {
    pub fn subscribe(store: Arc<dyn RecordStore>, filter: ReportFilter) -> Self {
        let changes = store.subscribe();
        Self {
            store,
            changes,
            filter,
            primed: false,
        }
    }

    pub fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    /// Swaps the filter. The next snapshot is produced immediately.
    pub fn set_filter(&mut self, filter: ReportFilter) {
        self.filter = filter;
        self.primed = false;
    }

    /// Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Result<AttendanceReport, StoreError>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        }
        // Mark the current revision seen; the snapshot below covers it.
        drop(self.changes.borrow_and_update());
        self.primed = true;

        let report = Roster::load(self.store.as_ref())
            .await
            .map(|roster| roster.report(&self.filter));
        Some(report)
    }
}
