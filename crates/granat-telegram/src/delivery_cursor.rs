//! Bookmark of the last update handed to the router.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Next update id the ingress is willing to accept.
///
/// Starts unset (no update consumed in this process) and only moves forward.
/// It is never persisted: a restart replays whatever the transport still
/// retains.
pub struct DeliveryCursor {
    next_update_id: Option<i64>,
}

impl DeliveryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for the `offset` parameter of `getUpdates`.
    pub fn offset(&self) -> Option<i64> {
        self.next_update_id
    }

    /// True when `update_id` has not been consumed yet.
    pub fn accepts(&self, update_id: i64) -> bool {
        self.next_update_id
            .map_or(true, |next_update_id| update_id >= next_update_id)
    }

    /// Marks `update_id` as consumed. Returns false when the cursor was
    /// already past it.
    pub fn advance_past(&mut self, update_id: i64) -> bool {
        if !self.accepts(update_id) {
            return false;
        }
        self.next_update_id = Some(update_id.saturating_add(1));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_fresh_cursor_accepts_everything_and_has_no_offset() {
        let cursor = DeliveryCursor::new();
        assert_eq!(cursor.offset(), None);
        assert!(cursor.accepts(0));
        assert!(cursor.accepts(i64::MAX));
    }

    #[test]
    fn functional_advance_moves_offset_past_consumed_update() {
        let mut cursor = DeliveryCursor::new();
        assert!(cursor.advance_past(100));
        assert_eq!(cursor.offset(), Some(101));
        assert!(!cursor.accepts(100));
        assert!(cursor.accepts(101));
    }

    #[test]
    fn regression_cursor_never_moves_backwards() {
        let mut cursor = DeliveryCursor::new();
        cursor.advance_past(200);
        assert!(!cursor.advance_past(150));
        assert!(!cursor.advance_past(200));
        assert_eq!(cursor.offset(), Some(201));
    }

    #[test]
    fn regression_advance_saturates_at_max_id() {
        let mut cursor = DeliveryCursor::new();
        assert!(cursor.advance_past(i64::MAX));
        assert_eq!(cursor.offset(), Some(i64::MAX));
    }
}
