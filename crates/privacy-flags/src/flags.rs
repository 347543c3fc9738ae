use std::fmt::{self, Write as _};
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use thiserror::Error;

/// Privacy flags bitmask of a protection database entry.
///
/// The eight named bits match the values the protection server stores; they
/// are opaque masks as far as callers are concerned and must not be
/// reconstructed from other sources. A value may carry bits outside the
/// named set (the server reserves the rest of the word); such bits survive
/// [`bits`](Self::bits) round-trips but never appear in the string form.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PrivacyFlags(u32);

impl PrivacyFlags {
    /// Anyone may examine the entry's status.
    pub const STATUS_ANY: Self = Self(0x80);
    /// Members may examine the entry's status.
    pub const STATUS_MEM: Self = Self(0x40);
    /// Anyone may list the groups the entry owns.
    pub const OWNED_ANY: Self = Self(0x20);
    /// Anyone may list the entry's membership.
    pub const MEMBER_ANY: Self = Self(0x10);
    /// Members may list the entry's membership.
    pub const MEMBER_MEM: Self = Self(0x08);
    /// Anyone may add members to the entry.
    pub const ADD_ANY: Self = Self(0x04);
    /// Members may add members to the entry.
    pub const ADD_MEM: Self = Self(0x02);
    /// Members may remove members from the entry.
    pub const REMOVE_MEM: Self = Self(0x01);

    /// Returns the empty flag set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Wraps a raw mask. Never fails; unrecognized bits are kept as-is.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw mask, including any unrecognized bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reports whether no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Reports whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Reports whether any bit of `other` is set in `self`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Renders the canonical 5-character form.
    ///
    /// One position per flag category, `'-'` for an unset position. Where a
    /// category has an "anyone" and a "members" bit, the "anyone" bit wins
    /// when both are set, matching how the administration tools print
    /// entries.
    const fn encode(self) -> [char; 5] {
        let mut out = ['-'; 5];
        if self.intersects(Self::STATUS_ANY) {
            out[0] = 'S';
        } else if self.intersects(Self::STATUS_MEM) {
            out[0] = 's';
        }
        if self.intersects(Self::OWNED_ANY) {
            out[1] = 'O';
        }
        if self.intersects(Self::MEMBER_ANY) {
            out[2] = 'M';
        } else if self.intersects(Self::MEMBER_MEM) {
            out[2] = 'm';
        }
        if self.intersects(Self::ADD_ANY) {
            out[3] = 'A';
        } else if self.intersects(Self::ADD_MEM) {
            out[3] = 'a';
        }
        if self.intersects(Self::REMOVE_MEM) {
            out[4] = 'r';
        }
        out
    }
}

impl BitOr for PrivacyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PrivacyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for PrivacyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for position in self.encode() {
            f.write_char(position)?;
        }
        Ok(())
    }
}

/// Error returned when parsing a privacy flags string fails.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("invalid privacy flag character '{character}' at index {position}")]
pub struct InvalidFlagCharacter {
    character: char,
    position: usize,
}

impl InvalidFlagCharacter {
    /// Returns the character that is not a recognized flag.
    #[must_use]
    pub const fn character(&self) -> char {
        self.character
    }

    /// Returns the character's index in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }
}

impl FromStr for PrivacyFlags {
    type Err = InvalidFlagCharacter;

    /// Parses a privacy flags string.
    ///
    /// Each recognized character contributes its bit regardless of where it
    /// appears; `'-'` contributes nothing. Neither length nor canonical
    /// positions are enforced, so any string the encoder can produce parses
    /// back to the same value, while non-canonical inputs (flags out of
    /// position, or both cases of one category present) still parse but
    /// re-encode to the collapsed canonical form.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut flags = Self::empty();
        for (position, character) in text.chars().enumerate() {
            flags |= match character {
                'S' => Self::STATUS_ANY,
                's' => Self::STATUS_MEM,
                'O' => Self::OWNED_ANY,
                'M' => Self::MEMBER_ANY,
                'm' => Self::MEMBER_MEM,
                'A' => Self::ADD_ANY,
                'a' => Self::ADD_MEM,
                'r' => Self::REMOVE_MEM,
                '-' => Self::empty(),
                character => return Err(InvalidFlagCharacter {
                    character,
                    position,
                }),
            };
        }
        Ok(flags)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl serde::Serialize for PrivacyFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> serde::Deserialize<'de> for PrivacyFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Converts a raw privacy flags mask to its 5-character string form.
///
/// Never fails; bits outside the eight named flags are silently ignored.
#[must_use]
pub fn privacy_flags_to_string(mask: u32) -> String {
    PrivacyFlags::from_bits(mask).to_string()
}

/// Parses a privacy flags string into a raw mask.
pub fn string_to_privacy_flags(text: &str) -> Result<u32, InvalidFlagCharacter> {
    text.parse::<PrivacyFlags>().map(PrivacyFlags::bits)
}

#[cfg(test)]
mod tests {
    use super::{InvalidFlagCharacter, PrivacyFlags, privacy_flags_to_string, string_to_privacy_flags};

    #[test]
    fn empty_mask_encodes_to_dashes() {
        assert_eq!(privacy_flags_to_string(0), "-----");
        assert_eq!(PrivacyFlags::empty().to_string(), "-----");
    }

    #[test]
    fn anyone_bits_encode_to_upper_case() {
        let flags = PrivacyFlags::STATUS_ANY
            | PrivacyFlags::OWNED_ANY
            | PrivacyFlags::MEMBER_ANY
            | PrivacyFlags::ADD_ANY
            | PrivacyFlags::REMOVE_MEM;
        assert_eq!(flags.to_string(), "SOMAr");
    }

    #[test]
    fn member_bits_encode_to_lower_case() {
        let flags =
            PrivacyFlags::STATUS_MEM | PrivacyFlags::MEMBER_MEM | PrivacyFlags::ADD_MEM;
        assert_eq!(flags.to_string(), "s-m-a");
    }

    #[test]
    fn anyone_bit_wins_over_member_bit() {
        assert_eq!(
            (PrivacyFlags::STATUS_ANY | PrivacyFlags::STATUS_MEM).to_string(),
            "S----"
        );
        assert_eq!(
            (PrivacyFlags::MEMBER_ANY | PrivacyFlags::MEMBER_MEM).to_string(),
            "--M--"
        );
        assert_eq!(
            (PrivacyFlags::ADD_ANY | PrivacyFlags::ADD_MEM).to_string(),
            "---A-"
        );
    }

    #[test]
    fn unrecognized_bits_are_kept_but_not_displayed() {
        let flags = PrivacyFlags::from_bits(0xff00 | PrivacyFlags::REMOVE_MEM.bits());
        assert_eq!(flags.to_string(), "----r");
        assert_eq!(flags.bits(), 0xff01);
    }

    #[test]
    fn dashes_parse_to_empty() {
        assert_eq!(string_to_privacy_flags("-----"), Ok(0));
        assert!("-----".parse::<PrivacyFlags>().unwrap().is_empty());
    }

    #[test]
    fn canonical_string_parses_to_named_bits() {
        let mask = string_to_privacy_flags("SOMAr").expect("parse");
        let expected = PrivacyFlags::STATUS_ANY
            | PrivacyFlags::OWNED_ANY
            | PrivacyFlags::MEMBER_ANY
            | PrivacyFlags::ADD_ANY
            | PrivacyFlags::REMOVE_MEM;
        assert_eq!(mask, expected.bits());
    }

    #[test]
    fn parsing_ignores_positions() {
        // The decoder only looks at which characters appear, not where.
        assert_eq!(
            string_to_privacy_flags("rAMOs"),
            string_to_privacy_flags("sOMAr")
        );
        assert_eq!(string_to_privacy_flags("r----"), Ok(0x01));
    }

    #[test]
    fn repeated_characters_are_idempotent() {
        assert_eq!(
            string_to_privacy_flags("SSSSS"),
            Ok(PrivacyFlags::STATUS_ANY.bits())
        );
    }

    #[test]
    fn length_is_not_enforced() {
        assert_eq!(string_to_privacy_flags(""), Ok(0));
        assert_eq!(
            string_to_privacy_flags("SOMArSOMAr"),
            string_to_privacy_flags("SOMAr")
        );
    }

    #[test]
    fn invalid_character_reports_character_and_index() {
        let error = match string_to_privacy_flags("X----") {
            Ok(_) => panic!("'X' is not a privacy flag"),
            Err(error) => error,
        };
        assert_eq!(error.character(), 'X');
        assert_eq!(error.position(), 0);

        let error = "SOMa?".parse::<PrivacyFlags>().unwrap_err();
        assert_eq!(error, InvalidFlagCharacter {
            character: '?',
            position: 4,
        });
    }

    #[test]
    fn non_canonical_input_re_encodes_collapsed() {
        // Both cases of the status category parse, but re-encoding keeps
        // only the winning upper-case form.
        let flags = "Ss---".parse::<PrivacyFlags>().expect("parse");
        assert!(flags.contains(PrivacyFlags::STATUS_ANY | PrivacyFlags::STATUS_MEM));
        assert_eq!(flags.to_string(), "S----");
    }
}
