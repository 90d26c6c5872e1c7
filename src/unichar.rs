/*!
# Codepoints and error characters

A [`Unichar`] is a plain 32-bit value. It is deliberately not a [`char`]:
the decoders in this crate are lenient and may hand out lone surrogate
halves, values beyond `U+10FFFF` or *error characters*.

Error characters occupy `U+EF80..=U+EFFF`, a slice of the Private Use
Area. Each stands for exactly one byte `0x80..=0xFF` which could not be
decoded, so that a later encode can put the original byte back.
*/

/// A single decoded codepoint (or error character).
pub type Unichar = u32;

/// First value which is not a Unicode codepoint anymore.
pub const UNICODE_MAX: Unichar = 0x110000;

/// Lowest error character. `make_error(0x80)`.
pub const UNICODE_ERROR_MIN: Unichar = 0xef80;

/// Highest error character. `make_error(0xff)`.
pub const UNICODE_ERROR_MAX: Unichar = 0xefff;

const UNICODE_ERROR_BASE: Unichar = 0xef00;

pub const HIGH_SURROGATE_MIN: Unichar = 0xd800;
pub const HIGH_SURROGATE_MAX: Unichar = 0xdbff;
pub const LOW_SURROGATE_MIN: Unichar = 0xdc00;
pub const LOW_SURROGATE_MAX: Unichar = 0xdfff;

/// Return true if `c` is an error character.
#[inline]
pub fn is_error(c: Unichar) -> bool {
	UNICODE_ERROR_MIN <= c && c <= UNICODE_ERROR_MAX
}

/// Construct the error character standing in for the byte `b`.
///
/// Only bytes `0x80..=0xff` have an error character. ASCII bytes always
/// decode fine and never need one.
#[inline]
pub fn make_error(b: u8) -> Unichar {
	debug_assert!(b >= 0x80);
	UNICODE_ERROR_BASE + b as Unichar
}

/// Return the byte an error character stands for.
///
/// The result is meaningless if `c` is not an error character.
#[inline]
pub fn error_id(c: Unichar) -> u8 {
	debug_assert!(is_error(c));
	(c.wrapping_sub(UNICODE_ERROR_BASE) & 0xff) as u8
}

#[inline]
pub fn is_high_surrogate(c: Unichar) -> bool {
	HIGH_SURROGATE_MIN <= c && c <= HIGH_SURROGATE_MAX
}

#[inline]
pub fn is_low_surrogate(c: Unichar) -> bool {
	LOW_SURROGATE_MIN <= c && c <= LOW_SURROGATE_MAX
}

/// Split a supplementary-plane codepoint into its UTF-16 surrogate halves.
///
/// `c` must be in `0x10000..UNICODE_MAX`.
#[inline]
pub fn split_surrogates(c: Unichar) -> (Unichar, Unichar) {
	debug_assert!(c >= 0x10000 && c < UNICODE_MAX);
	let v = c - 0x10000;
	(HIGH_SURROGATE_MIN + (v >> 10), LOW_SURROGATE_MIN + (v & 0x3ff))
}

/// Combine a high and a low surrogate half into one codepoint.
#[inline]
pub fn combine_surrogates(high: Unichar, low: Unichar) -> Unichar {
	0x10000 + ((high & 0x3ff) << 10) + (low & 0x3ff)
}

/// Return true for the values Unicode will never assign: anything ending
/// in `FFFE`/`FFFF` in any plane, and anything at or beyond
/// [`UNICODE_MAX`].
#[inline]
pub fn is_non_character(c: Unichar) -> bool {
	c >= UNICODE_MAX || c & 0xfffe == 0xfffe
}
