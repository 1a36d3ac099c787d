use num_traits::{One, PrimInt};

/// Trait implemented by flag enums stored in a [`BitmaskFlags`] container.
///
/// The enum's discriminant (via `#[repr(u8)]`) typically determines the bit
/// index. The backing integer type is chosen through the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // Equivalent to: 1 << index
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A small, copyable bitmask container for per-body status flags.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new() -> Self {
        Self { bits: T::zero() }
    }

    pub fn set<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn clear<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn contains<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn clear_all(&mut self) {
        self.bits = T::zero();
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}
