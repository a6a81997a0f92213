//! Mutation effect record threaded through the engine cores.

/// Records what a single mutating operation did to a tree.
///
/// `modified` is set once per operation when the structure changed (a
/// key was added or removed); `previous_value` carries the value
/// displaced by a replacement or removal. Replacing a value alone sets
/// `previous_value` without `modified`. Both fields are monotonic within
/// one operation.
#[derive(Debug)]
pub(crate) struct EffectRecord<V> {
    modified: bool,
    previous_value: Option<V>,
}

impl<V> EffectRecord<V> {
    pub(crate) const fn new() -> Self {
        Self {
            modified: false,
            previous_value: None,
        }
    }

    pub(crate) fn set_modified(&mut self) {
        self.modified = true;
    }

    pub(crate) fn set_previous(&mut self, value: V) {
        debug_assert!(self.previous_value.is_none(), "previous value recorded twice");
        self.previous_value = Some(value);
    }

    pub(crate) const fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn take_previous(&mut self) -> Option<V> {
        self.previous_value.take()
    }
}
