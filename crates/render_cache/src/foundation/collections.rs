//! Specialized collection types

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Generational handle to a slot reserved in a surface atlas set.
    ///
    /// A handle whose slot has been evicted or released no longer resolves,
    /// which is how cache consumers detect that their pixels are gone.
    pub struct AtlasSlotKey;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;
