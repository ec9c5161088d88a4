// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A declarative macro generating lightweight bitflag newtypes.

/// Declares a `Copy` bitflag newtype with named constants and set operations.
///
/// The generated type stores its raw bits in a single integer and exposes
/// `EMPTY`, `bits`, `from_bits_truncate`, `contains`, `intersects`, `insert`,
/// `remove`, `is_empty` and the usual bitwise operators. Its `Debug` output
/// lists the named flags that are set.
#[macro_export]
#[doc(hidden)]
macro_rules! ember_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// The set with no flag raised.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Wraps raw bits, keeping bits that match no named flag.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw bits of this set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` when every flag of `other` is raised in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// `true` when `self` and `other` share at least one flag.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// `true` when no flag is raised.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Raises the flags of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Lowers the flags of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl ::core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl ::core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl ::core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                let mut remaining = self.bits;
                let mut names = f.debug_set();
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        names.entry(&format_args!("{}", stringify!($flag_name)));
                        remaining &= !$flag_value;
                    }
                )*
                if remaining != 0 {
                    names.entry(&format_args!("{:#x}", remaining));
                }
                names.finish()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::ember_bitflags;

    ember_bitflags! {
        /// Flags used only by these tests.
        pub struct Channels: u8 {
            const RED = 1 << 0;
            const GREEN = 1 << 1;
            const BLUE = 1 << 2;
            const RGB = 0b111;
        }
    }

    #[test]
    fn test_empty_set() {
        let empty = Channels::EMPTY;
        assert!(empty.is_empty());
        assert_eq!(empty, Channels::default());
        assert_eq!(format!("{empty:?}"), "{}");
    }

    #[test]
    fn test_insert_remove_contains() {
        let mut set = Channels::RED;
        set.insert(Channels::BLUE);
        assert!(set.contains(Channels::RED | Channels::BLUE));
        assert!(!set.contains(Channels::GREEN));
        assert!(set.intersects(Channels::RGB));

        set.remove(Channels::RED);
        assert_eq!(set, Channels::BLUE);
    }

    #[test]
    fn test_operators() {
        let mut set = Channels::RED | Channels::GREEN;
        assert_eq!((set & Channels::GREEN).bits(), 0b010);
        set |= Channels::BLUE;
        assert_eq!(set, Channels::RGB);
    }

    #[test]
    fn test_debug_lists_flags_and_unknown_bits() {
        let set = Channels::RED | Channels::from_bits_truncate(0x80);
        assert_eq!(format!("{set:?}"), "{RED, 0x80}");
    }
}
