/*!
# Configurable UTF-8 engine

This module implements UTF-8 as it is found in the wild rather than only
as the standard describes it: CESU-8 surrogate pairs, Java-style two-byte
NUL, over-long sequences, non-characters and sequences of up to seven
bytes (the original 31-bit design, extended to a full `u32`).

Which of those variants are accepted (when decoding) or produced (when
encoding) is controlled by [`Utf8Options`]. Decoding never fails: bytes
which cannot be decoded under the given options become error characters
(see [`crate::unichar`]). With [`Utf8Options::ALLOW_ERROR_ESCAPES`] the
encoder turns error characters back into the original bytes, which makes
decode followed by encode lossless for arbitrary input.
*/
use std::fmt;
use std::ops::{BitOr, BitOrAssign, Sub};

mod decode;
mod encode;
pub mod position;

pub use decode::{decode, Utf8Reader};
pub use encode::{encode_into, encoded};
pub use position::{byte_to_char_pos, char_at, char_to_byte_pos, length, substr};

/// Longest sequence the engine produces or accepts: a lead byte plus six
/// continuation bytes.
pub const MAX_SEQUENCE_LEN: usize = 7;

/// Set of leniency flags for one encoder or decoder.
///
/// There is no canonical default; every call site picks the combination it
/// needs. [`Default`] is the strict, empty set.
///
/// # Example
///
/// ```
/// use utfxml::utf8::{self, Utf8Options};
/// let opts = Utf8Options::ALLOW_ENCODED_ZERO | Utf8Options::ALLOW_SURROGATES;
/// assert_eq!(utf8::encoded(&[0], opts), b"\xc0\x80");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Utf8Options(u8);

impl Utf8Options {
	/// Accept and produce NUL as the two bytes `C0 80`.
	pub const ALLOW_ENCODED_ZERO: Utf8Options = Utf8Options(0x01);
	/// Accept and produce supplementary-plane codepoints as UTF-8 encoded
	/// surrogate pairs (CESU-8).
	pub const ALLOW_SURROGATES: Utf8Options = Utf8Options(0x02);
	/// Accept over-long sequences.
	pub const ALLOW_NON_MINIMAL: Utf8Options = Utf8Options(0x04);
	/// Accept values beyond `U+10FFFF`, `..FFFE`/`..FFFF` in any plane and
	/// lone surrogate halves.
	pub const ALLOW_NON_CHARACTERS: Utf8Options = Utf8Options(0x08);
	/// Encode error characters as their original byte, and reject sequences
	/// which decode to an error character value.
	pub const ALLOW_ERROR_ESCAPES: Utf8Options = Utf8Options(0x10);

	const NAMES: &'static [(Utf8Options, &'static str)] = &[
		(Self::ALLOW_ENCODED_ZERO, "ALLOW_ENCODED_ZERO"),
		(Self::ALLOW_SURROGATES, "ALLOW_SURROGATES"),
		(Self::ALLOW_NON_MINIMAL, "ALLOW_NON_MINIMAL"),
		(Self::ALLOW_NON_CHARACTERS, "ALLOW_NON_CHARACTERS"),
		(Self::ALLOW_ERROR_ESCAPES, "ALLOW_ERROR_ESCAPES"),
	];

	/// The strict set: standard UTF-8 only.
	pub const fn empty() -> Utf8Options {
		Utf8Options(0)
	}

	/// Every flag at once.
	pub const fn all() -> Utf8Options {
		Utf8Options(0x1f)
	}

	pub const fn bits(self) -> u8 {
		self.0
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// Return true if all flags of `other` are set in `self`.
	pub const fn contains(self, other: Utf8Options) -> bool {
		self.0 & other.0 == other.0
	}

	pub const fn union(self, other: Utf8Options) -> Utf8Options {
		Utf8Options(self.0 | other.0)
	}

	pub const fn difference(self, other: Utf8Options) -> Utf8Options {
		Utf8Options(self.0 & !other.0)
	}
}

impl BitOr for Utf8Options {
	type Output = Utf8Options;

	fn bitor(self, rhs: Utf8Options) -> Utf8Options {
		self.union(rhs)
	}
}

impl BitOrAssign for Utf8Options {
	fn bitor_assign(&mut self, rhs: Utf8Options) {
		*self = self.union(rhs);
	}
}

impl Sub for Utf8Options {
	type Output = Utf8Options;

	fn sub(self, rhs: Utf8Options) -> Utf8Options {
		self.difference(rhs)
	}
}

impl fmt::Debug for Utf8Options {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		if self.is_empty() {
			return f.write_str("Utf8Options(empty)");
		}
		f.write_str("Utf8Options(")?;
		let mut first = true;
		for (flag, name) in Self::NAMES.iter() {
			if self.contains(*flag) {
				if !first {
					f.write_str(" | ")?;
				}
				f.write_str(name)?;
				first = false;
			}
		}
		f.write_str(")")
	}
}
