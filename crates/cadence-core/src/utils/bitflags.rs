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

//! Declarative bitmask types.
//!
//! The pacing core passes several small bitmasks around (marker filters,
//! timestamp output targets, keep-updating reasons). They are all declared
//! through [`cadence_bitflags!`](crate::cadence_bitflags), which gives each
//! mask the usual set operations plus a readable `Debug` output and an
//! iterator over the names of the flags that are set.

/// Declares a bitmask newtype over an unsigned integer.
///
/// Every `const` inside the block becomes an associated constant. `ALL` is the
/// union of every declared flag and `EMPTY` has no bit set.
#[macro_export]
macro_rules! cadence_bitflags {
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
            /// No flag set.
            pub const EMPTY: Self = Self { bits: 0 };

            /// Every declared flag set.
            pub const ALL: Self = Self { bits: 0 $(| $flag_value)* };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Builds a mask from raw bits, dropping the bits no flag declares.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits: bits & Self::ALL.bits }
            }

            /// Builds a mask from raw bits, keeping undeclared bits as they are.
            pub const fn from_bits_retain(bits: $ty) -> Self {
                Self { bits }
            }

            /// The raw value.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// `true` when no bit is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// `true` when every bit of `other` is set in `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// `true` when `self` and `other` share at least one bit.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Sets the bits of `other`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Clears the bits of `other`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }

            /// Sets or clears the bits of `other` depending on `value`.
            pub fn set(&mut self, other: Self, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }

            /// Copy of `self` with `other` set.
            #[must_use]
            pub const fn with(mut self, other: Self) -> Self {
                self.bits |= other.bits;
                self
            }

            /// Copy of `self` with `other` cleared.
            #[must_use]
            pub const fn without(mut self, other: Self) -> Self {
                self.bits &= !other.bits;
                self
            }

            /// Names of the declared non-zero flags that are fully set, in
            /// declaration order.
            pub fn names(&self) -> impl Iterator<Item = &'static str> {
                let bits = self.bits;
                [$((stringify!($flag_name), $flag_value)),*]
                    .into_iter()
                    .filter(move |&(_, value)| value != 0 && (bits & value) == value)
                    .map(|(name, _)| name)
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

        impl ::core::ops::BitAndAssign for $name {
            fn bitand_assign(&mut self, other: Self) {
                self.bits &= other.bits;
            }
        }

        impl ::core::ops::Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self { bits: !self.bits }
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                let mut remaining = self.bits;
                let mut first = true;
                $(
                    if $flag_value != 0 && (remaining & $flag_value) == $flag_value {
                        if !first {
                            write!(f, " | ")?;
                        }
                        write!(f, "{}", stringify!($flag_name))?;
                        remaining &= !$flag_value;
                        first = false;
                    }
                )*
                if remaining != 0 {
                    if !first {
                        write!(f, " | ")?;
                    }
                    write!(f, "{:#x}", remaining)?;
                    first = false;
                }
                if first {
                    write!(f, "EMPTY")?;
                }
                write!(f, ")")
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::cadence_bitflags;

    cadence_bitflags! {
        /// Flags used only by these tests.
        pub struct Probe: u32 {
            const RED = 1 << 0;
            const GREEN = 1 << 1;
            const BLUE = 1 << 2;
            const CYAN = Self::GREEN.bits() | Self::BLUE.bits();
        }
    }

    #[test]
    fn test_all_is_union_of_declared_flags() {
        assert_eq!(Probe::ALL.bits(), 0b111);
        assert!(Probe::ALL.contains(Probe::CYAN));
    }

    #[test]
    fn test_from_bits_truncate_drops_unknown_bits() {
        let mask = Probe::from_bits_truncate(0b1001);
        assert_eq!(mask, Probe::RED);
        let retained = Probe::from_bits_retain(0b1001);
        assert_eq!(retained.bits(), 0b1001);
    }

    #[test]
    fn test_set_insert_and_remove() {
        let mut mask = Probe::EMPTY;
        assert!(mask.is_empty());
        mask.insert(Probe::RED);
        mask.set(Probe::BLUE, true);
        assert!(mask.contains(Probe::RED | Probe::BLUE));
        mask.set(Probe::RED, false);
        assert!(!mask.intersects(Probe::RED));
        assert_eq!(mask.without(Probe::BLUE), Probe::EMPTY);
    }

    #[test]
    fn test_names_lists_fully_set_flags() {
        let names: Vec<_> = (Probe::RED | Probe::GREEN).names().collect();
        assert_eq!(names, vec!["RED", "GREEN"]);
        let names: Vec<_> = Probe::ALL.names().collect();
        assert_eq!(names, vec!["RED", "GREEN", "BLUE", "CYAN"]);
    }

    #[test]
    fn test_debug_output() {
        assert_eq!(format!("{:?}", Probe::EMPTY), "Probe(EMPTY)");
        assert_eq!(format!("{:?}", Probe::RED | Probe::BLUE), "Probe(RED | BLUE)");
        assert_eq!(format!("{:?}", Probe::CYAN), "Probe(GREEN | BLUE)");
        assert_eq!(
            format!("{:?}", Probe::from_bits_retain(0b1_0001)),
            "Probe(RED | 0x10)"
        );
    }
}
