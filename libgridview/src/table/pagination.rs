//! Sentinel-driven incremental loading.
//!
//! The table renders a zero-content sentinel row after the last visible row.
//! Each frame reports whether that row was drawn; this module decides whether
//! to show more of the working set or to ask the host for more records.

use derive_more::Display;
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the table grows when the sentinel becomes visible.
#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Eq, Sequence, Serialize)]
pub enum PaginationMode {
    /// Show the next page of rows that are already loaded.
    Local,
    /// Ask the host for more records and show one more page.
    HostFed,
}

/// Result of a sentinel visibility report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentinelOutcome {
    Idle,
    /// The cutoff moved by one page.
    Advanced,
    /// The cutoff moved and the host must be asked for more records.
    FetchMore,
}

#[derive(Debug, Clone)]
pub struct PaginationState {
    page_size: usize,
    cutoff: usize,
    sentinel_visible: bool,
    /// Set on the falling edge of the sentinel, after the cutoff moved and after
    /// the working set was rebuilt. A visible sentinel only acts while armed.
    armed: bool,
    fetch_in_flight: bool,
}

impl PaginationState {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            cutoff: page_size,
            sentinel_visible: false,
            armed: true,
            fetch_in_flight: false,
        }
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    #[must_use]
    pub fn visible_len(&self, working_len: usize) -> usize {
        self.cutoff.min(working_len)
    }

    /// Visibility reported by the last frame.
    #[must_use]
    pub fn sentinel_visible(&self) -> bool {
        self.sentinel_visible
    }

    #[must_use]
    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    /// Called when the working set was rebuilt.
    pub fn rearm(&mut self) {
        self.armed = true;
    }

    /// Called when the host delivered the records of an outstanding fetch.
    pub fn fetch_completed(&mut self) {
        self.fetch_in_flight = false;
        self.armed = true;
    }

    /// Processes the sentinel visibility of the current frame.
    ///
    /// `more_upstream` tells whether the host may still have records to deliver.
    pub fn on_sentinel_visibility(
        &mut self,
        visible: bool,
        mode: PaginationMode,
        working_len: usize,
        more_upstream: bool,
    ) -> SentinelOutcome {
        self.sentinel_visible = visible;
        if !visible {
            self.armed = true;
            return SentinelOutcome::Idle;
        }
        if !self.armed {
            return SentinelOutcome::Idle;
        }
        self.armed = false;

        match mode {
            PaginationMode::HostFed if more_upstream => {
                if self.fetch_in_flight {
                    debug!("Sentinel visible while a fetch is in flight, not fetching again");
                    return SentinelOutcome::Idle;
                }
                self.fetch_in_flight = true;
                self.advance();
                SentinelOutcome::FetchMore
            }
            PaginationMode::Local | PaginationMode::HostFed => {
                if self.cutoff < working_len {
                    self.advance();
                    SentinelOutcome::Advanced
                } else {
                    SentinelOutcome::Idle
                }
            }
        }
    }

    fn advance(&mut self) {
        self.cutoff = self.cutoff.saturating_add(self.page_size);
        self.armed = true;
        debug!("Pagination cutoff advanced to {}", self.cutoff);
    }
}
