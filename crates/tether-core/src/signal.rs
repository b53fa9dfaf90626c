use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    /// Handle returned by [`Signal::subscribe`].
    pub struct SubId;
}

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Cloneable handle to an observable value. Clones share the same value.
pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

struct Inner<T: 'static> {
    value: T,
    subs: SlotMap<SubId, Subscriber<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value,
            subs: SlotMap::with_key(),
        })))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().value.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow().value)
    }

    pub fn set(&self, v: T) {
        self.0.borrow_mut().value = v;
        self.notify();
    }

    /// Writes only when the value differs. Returns whether subscribers were notified.
    pub fn set_if_changed(&self, v: T) -> bool
    where
        T: PartialEq,
    {
        {
            let mut inner = self.0.borrow_mut();
            if inner.value == v {
                return false;
            }
            inner.value = v;
        }
        self.notify();
        true
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        f(&mut self.0.borrow_mut().value);
        self.notify();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.borrow_mut().subs.insert(Rc::new(f))
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.0.borrow_mut().subs.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    // Subscribers may read the signal; writing to it from a subscriber panics.
    fn notify(&self) {
        let subs: SmallVec<[Subscriber<T>; 4]> = self.0.borrow().subs.values().cloned().collect();
        if subs.is_empty() {
            return;
        }
        let inner = self.0.borrow();
        for s in subs {
            s(&inner.value);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Signal")
            .field(&self.0.borrow().value)
            .finish()
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}
