use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::scope::Scope;
use crate::{Signal, signal};

thread_local! {
    static BINDINGS: RefCell<Vec<Rc<BindingShared>>> = const { RefCell::new(Vec::new()) };
}

#[derive(Default)]
struct SlotTable {
    slots: Vec<Box<dyn Any>>,
    cursor: usize,
    keyed_slots: HashMap<String, Box<dyn Any>>,
}

#[derive(Default)]
struct BindingShared {
    slots: RefCell<SlotTable>,
    dirty: Cell<bool>,
    renders: Cell<u64>,
    on_invalidate: RefCell<Option<Rc<dyn Fn()>>>,
}

impl BindingShared {
    fn invalidate(&self) {
        self.dirty.set(true);
        let cb = self.on_invalidate.borrow().clone();
        if let Some(cb) = cb {
            cb();
        }
    }
}

/// One live component instance: its remembered slots, its teardown scope and a dirty flag
/// raised whenever state created with [`use_state`] changes.
///
/// ```rust
/// use tether_core::*;
///
/// let binding = Binding::new();
/// let count = binding.compose(|| use_state(|| 0));
/// count.set(1);
/// assert!(binding.take_dirty());
/// assert_eq!(binding.compose(|| use_state(|| 0)).get(), 1);
/// binding.unmount();
/// ```
pub struct Binding {
    shared: Rc<BindingShared>,
    scope: Scope,
}

impl Default for Binding {
    fn default() -> Self {
        Self::new()
    }
}

impl Binding {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(BindingShared::default()),
            scope: Scope::new(),
        }
    }

    /// Runs one render pass. Order-based `remember` calls resolve against this binding's
    /// slots, effects register their cleanups in its scope.
    pub fn compose<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Pop;
        impl Drop for Pop {
            fn drop(&mut self) {
                BINDINGS.with(|b| {
                    b.borrow_mut().pop();
                });
            }
        }

        if self.scope.is_disposed() {
            log::warn!("compose on an unmounted binding");
        }

        self.shared.slots.borrow_mut().cursor = 0;
        self.shared.dirty.set(false);
        self.shared.renders.set(self.shared.renders.get() + 1);

        BINDINGS.with(|b| b.borrow_mut().push(self.shared.clone()));
        let _pop = Pop;
        self.scope.run(f)
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.dirty.get()
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&self) -> bool {
        self.shared.dirty.replace(false)
    }

    pub fn render_count(&self) -> u64 {
        self.shared.renders.get()
    }

    /// Called on every state change; hosts use it to schedule the next pass.
    pub fn set_on_invalidate(&self, f: impl Fn() + 'static) {
        *self.shared.on_invalidate.borrow_mut() = Some(Rc::new(f));
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn is_mounted(&self) -> bool {
        !self.scope.is_disposed()
    }

    /// Runs every registered cleanup and drops remembered state.
    pub fn unmount(self) {
        self.scope.dispose();
        let table = std::mem::take(&mut *self.shared.slots.borrow_mut());
        drop(table);
        log::debug!(
            "binding unmounted after {} render(s)",
            self.shared.renders.get()
        );
    }
}

fn current_binding() -> Option<Rc<BindingShared>> {
    BINDINGS.with(|b| b.borrow().last().cloned())
}

/// Slot-based remember (sequential composition only)
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let Some(binding) = current_binding() else {
        log::warn!("remember outside of a binding; value will not persist");
        return Rc::new(init());
    };

    let cursor = {
        let mut guard = binding.slots.borrow_mut();
        let table = &mut *guard;
        let cursor = table.cursor;
        table.cursor += 1;

        match table.slots.get(cursor) {
            Some(slot) => {
                if let Some(rc) = slot.downcast_ref::<Rc<T>>() {
                    return rc.clone();
                }
                log::warn!(
                    "remember: slot {} type changed; replacing. \
                     If this is due to conditional composition, prefer remember_with_key.",
                    cursor
                );
            }
            // Reserve the index so nested remembers in `init` land after it.
            None => table.slots.push(Box::new(())),
        }
        cursor
    };

    let rc: Rc<T> = Rc::new(init());
    binding.slots.borrow_mut().slots[cursor] = Box::new(rc.clone());
    rc
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let Some(binding) = current_binding() else {
        log::warn!("remember_with_key '{key}' outside of a binding; value will not persist");
        return Rc::new(init());
    };

    if let Some(existing) = binding.slots.borrow().keyed_slots.get(&key) {
        if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
            return rc.clone();
        }
        log::warn!(
            "remember_with_key: key '{}' reused with a different type; replacing.",
            key
        );
    }

    let rc: Rc<T> = Rc::new(init());
    binding
        .slots
        .borrow_mut()
        .keyed_slots
        .insert(key, Box::new(rc.clone()));
    rc
}

/// Remembered signal whose writes mark the owning binding dirty.
pub fn use_state<T: 'static>(init: impl FnOnce() -> T) -> Signal<T> {
    let owner = current_binding().map(|b| Rc::downgrade(&b));
    let state = remember(move || {
        let s = signal(init());
        if let Some(owner) = owner {
            s.subscribe(move |_| {
                if let Some(b) = owner.upgrade() {
                    b.invalidate();
                }
            });
        }
        s
    });
    (*state).clone()
}
