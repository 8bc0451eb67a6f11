use std::time::{Duration, Instant};

/// Where a [`Refreshable`] is in its fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Identifies one request; only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Last fetched value plus the bookkeeping to decide when to fetch again.
///
/// The caller performs the actual I/O:
/// [`begin`](Self::begin) before sending a request, then
/// [`complete`](Self::complete) with the response. A response for anything
/// but the latest request is dropped, so a slow stale reply cannot overwrite
/// a fresh one.
#[derive(Debug, Clone)]
pub struct Refreshable<T, E> {
    status: FetchStatus,
    data: Option<T>,
    error: Option<E>,
    generation: u64,
    fetched_at: Option<Instant>,
    max_age: Duration,
    invalidated: bool,
}

impl<T, E> Refreshable<T, E> {
    pub fn new(max_age: Duration) -> Self {
        Self {
            status: FetchStatus::Idle,
            data: None,
            error: None,
            generation: 0,
            fetched_at: None,
            max_age,
            invalidated: false,
        }
    }

    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.invalidated = false;
        Ticket(self.generation)
    }

    /// Apply a response. Returns false when the ticket is stale and the
    /// response was discarded.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, E>, now: Instant) -> bool {
        if ticket.0 != self.generation || self.status != FetchStatus::Loading {
            return false;
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.fetched_at = Some(now);
                self.status = FetchStatus::Ready;
            }
            Err(err) => {
                // Keep the last good value on screen
                self.error = Some(err);
                self.status = FetchStatus::Error;
            }
        }
        true
    }

    /// Force the next [`needs_refresh`](Self::needs_refresh) to return true.
    pub fn invalidate(&mut self) {
        self.invalidated = true;
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        match self.status {
            FetchStatus::Loading => false,
            FetchStatus::Idle => true,
            FetchStatus::Ready | FetchStatus::Error => {
                self.invalidated
                    || self
                        .fetched_at
                        .map_or(true, |at| now.saturating_duration_since(at) >= self.max_age)
            }
        }
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }
}
