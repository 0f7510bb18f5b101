use {
    crate::domain::id::EventId,
    std::{
        collections::{HashSet, VecDeque},
        sync::Mutex,
    },
};

pub const DELIVERY_LEDGER_CAPACITY: usize = 1024;

/// Remembers the most recent event ids so repeat deliveries are skipped.
#[derive(Debug)]
pub struct DeliveryLedger {
    inner: Mutex<Seen>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Seen {
    ids: HashSet<EventId>,
    order: VecDeque<EventId>,
}

impl DeliveryLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Seen::default()),
            capacity: capacity.max(1),
        }
    }

    /// Records `id` and returns `true` the first time it is seen.
    pub fn first_delivery(&self, id: &EventId) -> bool {
        let mut seen = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if seen.ids.contains(id) {
            return false;
        }
        if seen.order.len() == self.capacity {
            if let Some(oldest) = seen.order.pop_front() {
                seen.ids.remove(&oldest);
            }
        }
        seen.ids.insert(id.clone());
        seen.order.push_back(id.clone());
        true
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::new(DELIVERY_LEDGER_CAPACITY)
    }
}
