use std::cell::{Cell, RefCell};

use crate::{Dispose, on_unmount, remember, scoped_effect};

struct EffectSlot<K> {
    key: RefCell<Option<K>>,
    cleanup: RefCell<Option<Dispose>>,
    installed: Cell<bool>,
}

impl<K> EffectSlot<K> {
    fn release(&self) {
        let d = self.cleanup.borrow_mut().take();
        if let Some(d) = d {
            d.run();
        }
    }
}

/// Runs `effect` when `key` differs from the previous pass. The previous registration is
/// disposed first; the last one is disposed when the binding unmounts.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(key: K, effect: impl FnOnce() -> Dispose) {
    // Slot-based, so the call order inside a binding must be stable.
    let slot = remember(|| EffectSlot::<K> {
        key: RefCell::new(None),
        cleanup: RefCell::new(None),
        installed: Cell::new(false),
    });

    if !slot.installed.replace(true) {
        let slot = slot.clone();
        scoped_effect(move || on_unmount(move || slot.release()));
    }

    let changed = slot.key.borrow().as_ref() != Some(&key);
    if changed {
        *slot.key.borrow_mut() = Some(key);
        slot.release();
        let d = effect();
        *slot.cleanup.borrow_mut() = Some(d);
    }
}

/// runs on every recomposition
pub fn side_effect(effect: impl FnOnce()) {
    effect();
}
