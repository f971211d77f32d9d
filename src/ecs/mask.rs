//! Capability bitmasks of *entities*.

/// Bit-per-component-type summary of what an entity owns.
///
/// Bit `i` is set iff the entity owns the component type with ordinal `i`.
///
pub type ComponentMask = u64;

/// Maximal count of component types one manager can register.
pub const MAX_COMPONENT_TYPES: usize = ComponentMask::BITS as usize;

/// Converts ordinal of component type into the mask with the single bit set.
#[inline(always)]
pub const fn index_to_mask(index: usize) -> ComponentMask {
    1 << index
}

/// Returns `true` if every bit of `required` is set in `mask`.
#[inline(always)]
pub const fn has_all(mask: ComponentMask, required: ComponentMask) -> bool {
    mask & required == required
}
