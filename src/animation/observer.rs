//! Subscription registry for current-frame publications.

use super::decoder::Frame;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A single publication of the player's current frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameUpdate<'a> {
    /// Cursor position of the published frame.
    pub index: usize,
    pub frame: &'a Frame,
}

type Callback = Box<dyn FnMut(&FrameUpdate<'_>)>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Deliver `update` to one subscriber.
    pub(crate) fn notify_one(&mut self, id: SubscriptionId, update: &FrameUpdate<'_>) {
        if let Some((_, callback)) = self.entries.iter_mut().find(|(entry_id, _)| *entry_id == id) {
            callback(update);
        }
    }

    /// Deliver `update` to every subscriber, in subscription order.
    pub(crate) fn notify(&mut self, update: &FrameUpdate<'_>) {
        for (_, callback) in &mut self.entries {
            callback(update);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Bitmap, Frame};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::time::Duration;

    fn frame() -> Frame {
        Frame::new(Arc::new(Bitmap::blank(1, 1)), Duration::from_millis(100))
    }

    #[test]
    fn test_notify_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            observers.add(Box::new(move |u| seen.borrow_mut().push((tag, u.index))));
        }

        let frame = frame();
        observers.notify(&FrameUpdate {
            index: 3,
            frame: &frame,
        });
        assert_eq!(*seen.borrow(), vec![("a", 3), ("b", 3)]);
    }

    #[test]
    fn test_remove() {
        let count = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();
        let c = Rc::clone(&count);
        let id = observers.add(Box::new(move |_| *c.borrow_mut() += 1));

        assert!(observers.remove(id));
        assert!(!observers.remove(id));
        assert_eq!(observers.len(), 0);

        let frame = frame();
        observers.notify(&FrameUpdate {
            index: 0,
            frame: &frame,
        });
        assert_eq!(*count.borrow(), 0);
    }
}
