// ── Aggregate view helpers ──
//
// Pure helpers between the source table and presentation: stable
// pagination over already-sorted lists, the three request buckets, and
// the poster-rotation state machine. No fetching happens here.

use crate::adapter::BucketedRequest;
use crate::model::{MediaItem, RequestBucket};

/// One page of an already-sorted list. Pages are zero-based; a page
/// past the end is empty rather than an error.
pub fn page<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed to show `len` items.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Request-manager tab contents: every request lands in exactly one
/// bucket, in fetch order.
#[derive(Debug, Clone, Default)]
pub struct RequestTabs {
    pub requests: Vec<MediaItem>,
    pub requested: Vec<MediaItem>,
    pub available: Vec<MediaItem>,
}

impl RequestTabs {
    pub fn split(bucketed: &[BucketedRequest]) -> Self {
        let mut tabs = Self::default();
        for entry in bucketed {
            let list = match entry.bucket {
                RequestBucket::Requests => &mut tabs.requests,
                RequestBucket::Requested => &mut tabs.requested,
                RequestBucket::Available => &mut tabs.available,
            };
            list.push(entry.item.clone());
        }
        tabs
    }
}

/// Crossfade rotation over `len` slots as a pure state sequence.
///
/// `advance` starts a transition: the old slot stays readable as
/// `previous` and `is_transitioning` is set until the caller, after its
/// fixed crossfade duration, calls `finish_transition`. The timer
/// itself lives with the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    len: usize,
    active: usize,
    previous: Option<usize>,
    transitioning: bool,
}

impl Rotation {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            active: 0,
            previous: None,
            transitioning: false,
        }
    }

    pub fn active(&self) -> Option<usize> {
        (self.len > 0).then_some(self.active)
    }

    pub fn previous(&self) -> Option<usize> {
        self.previous
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Step to the next slot, wrapping. No-op with fewer than two slots.
    pub fn advance(&mut self) {
        if self.len < 2 {
            return;
        }
        self.previous = Some(self.active);
        self.active = (self.active + 1) % self.len;
        self.transitioning = true;
    }

    /// End the crossfade: the previous index is released.
    pub fn finish_transition(&mut self) {
        self.previous = None;
        self.transitioning = false;
    }

    /// Adjust to a new list length after a refresh, keeping the active
    /// slot when it still exists.
    pub fn resize(&mut self, len: usize) {
        self.len = len;
        if self.active >= len {
            self.active = 0;
        }
        if self.previous.is_some_and(|p| p >= len) {
            self.finish_transition();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{MediaKind, MediaStatus};

    fn item(title: &str) -> MediaItem {
        MediaItem {
            id: title.to_owned(),
            title: title.to_owned(),
            subtitle: None,
            kind: MediaKind::Movie,
            status: MediaStatus::Pending,
            year: None,
            added_at: None,
            air_date: None,
            poster_url: None,
            requested_by: None,
        }
    }

    #[test]
    fn page_slices_are_stable() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(page(&items, 0, 4), &[0, 1, 2, 3]);
        assert_eq!(page(&items, 1, 4), &[4, 5, 6, 7]);
        assert_eq!(page(&items, 2, 4), &[8, 9]);
        assert_eq!(page(&items, 3, 4), &[] as &[u32]);
        assert_eq!(page_count(10, 4), 3);
    }

    #[test]
    fn page_size_zero_is_empty() {
        let items = [1, 2, 3];
        assert_eq!(page(&items, 0, 0), &[] as &[i32]);
        assert_eq!(page_count(3, 0), 0);
    }

    #[test]
    fn split_routes_each_request_to_one_tab() {
        let bucketed = vec![
            BucketedRequest {
                bucket: RequestBucket::Requests,
                item: item("pending"),
            },
            BucketedRequest {
                bucket: RequestBucket::Available,
                item: item("done"),
            },
            BucketedRequest {
                bucket: RequestBucket::Requested,
                item: item("approved"),
            },
        ];
        let tabs = RequestTabs::split(&bucketed);
        assert_eq!(tabs.requests.len(), 1);
        assert_eq!(tabs.requested.len(), 1);
        assert_eq!(tabs.available.len(), 1);
        assert_eq!(tabs.available[0].title, "done");
    }

    #[test]
    fn rotation_wraps_and_tracks_previous() {
        let mut rot = Rotation::new(3);
        assert_eq!(rot.active(), Some(0));
        assert!(!rot.is_transitioning());

        rot.advance();
        assert_eq!(rot.active(), Some(1));
        assert_eq!(rot.previous(), Some(0));
        assert!(rot.is_transitioning());

        rot.finish_transition();
        assert_eq!(rot.previous(), None);
        assert!(!rot.is_transitioning());

        rot.advance();
        rot.finish_transition();
        rot.advance();
        assert_eq!(rot.active(), Some(0), "wraps past the end");
    }

    #[test]
    fn rotation_single_slot_never_transitions() {
        let mut rot = Rotation::new(1);
        rot.advance();
        assert_eq!(rot.active(), Some(0));
        assert!(!rot.is_transitioning());

        let mut empty = Rotation::new(0);
        empty.advance();
        assert_eq!(empty.active(), None);
    }

    #[test]
    fn rotation_resize_clamps_active() {
        let mut rot = Rotation::new(5);
        rot.advance();
        rot.finish_transition();
        rot.advance();
        rot.finish_transition();
        rot.advance();
        assert_eq!(rot.active(), Some(3));

        rot.resize(2);
        assert_eq!(rot.active(), Some(0));
        assert!(!rot.is_transitioning());
    }
}
