//! Entity state flags

use bitflags::bitflags;

bitflags! {
    /// Independently togglable entity state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityStateFlags: u32 {
        /// Entity and its children are skipped during rendering
        const HIDDEN = 1 << 0;
        /// The cache surface holds an up-to-date bitmap
        const CACHED = 1 << 1;
        /// Appearance changed since the host last collected modifications
        const MODIFIED = 1 << 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_toggle_independently() {
        let mut flags = EntityStateFlags::default();
        flags.insert(EntityStateFlags::CACHED | EntityStateFlags::HIDDEN);
        flags.remove(EntityStateFlags::HIDDEN);
        assert!(flags.contains(EntityStateFlags::CACHED));
        assert!(!flags.contains(EntityStateFlags::HIDDEN));
        assert!(!flags.contains(EntityStateFlags::MODIFIED));
    }
}
