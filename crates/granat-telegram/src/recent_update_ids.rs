//! Bounded memory of handled update ids for push ingress.

use std::collections::{HashSet, VecDeque};

use crate::chat_event_handler::ConsumedUpdates;

/// Ids remembered by default; well above Telegram's redelivery window for a
/// single bot.
pub const DEFAULT_RECENT_UPDATE_IDS: usize = 4_096;

#[derive(Debug, Clone)]
/// Set of the most recently handled update ids, oldest evicted first.
///
/// Unlike [`DeliveryCursor`](crate::delivery_cursor::DeliveryCursor) it does
/// not assume ids arrive in increasing order, so an update rejected earlier
/// and redelivered after a newer one is still handled.
pub struct RecentUpdateIds {
    capacity: usize,
    seen: HashSet<i64>,
    order: VecDeque<i64>,
}

impl Default for RecentUpdateIds {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_RECENT_UPDATE_IDS)
    }
}

impl RecentUpdateIds {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn contains(&self, update_id: i64) -> bool {
        self.seen.contains(&update_id)
    }

    /// Records `update_id`. Returns false when it was already present.
    pub fn insert(&mut self, update_id: i64) -> bool {
        if !self.seen.insert(update_id) {
            return false;
        }
        self.order.push_back(update_id);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.seen.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl ConsumedUpdates for RecentUpdateIds {
    fn is_consumed(&self, update_id: i64) -> bool {
        self.contains(update_id)
    }

    fn mark_consumed(&mut self, update_id: i64) {
        self.insert(update_id);
    }
}
