use crate::unichar::*;

use super::Utf8Options;

/// Smallest value which needs `extra` continuation bytes.
const CLASS_MIN: [Unichar; 7] = [0, 0x80, 0x800, 0x10000, 0x200000, 0x4000000, 0x80000000];

/// Number of continuation bytes announced by a lead byte, or `None` if the
/// byte cannot start a sequence.
#[inline]
fn continuation_count(lead: u8) -> Option<usize> {
	match lead.leading_ones() {
		0 => Some(0),
		// 10xxxxxx is a continuation byte, 11111111 announces nothing
		1 | 8 => None,
		n => Some(n as usize - 1),
	}
}

/// Decode one sequence from the front of `src` and apply the option
/// checks, without any surrogate handling.
///
/// Returns the value and the number of bytes it used. Every failure is
/// reported as the error character of the lead byte with a length of one,
/// so the next attempt starts at the byte after the lead.
fn decode_sequence(src: &[u8], opts: Utf8Options) -> (Unichar, usize) {
	let lead = match src.first() {
		Some(b) => *b,
		None => return (0, 0),
	};
	let extra = match continuation_count(lead) {
		Some(0) => return (lead as Unichar, 1),
		Some(n) => n,
		None => return (make_error(lead), 1),
	};
	let fail = (make_error(lead), 1);

	let mut acc = (lead & (0x7f >> (extra + 1))) as Unichar;
	for i in 1..=extra {
		let b = match src.get(i) {
			Some(b) => *b,
			None => return fail,
		};
		if b & 0xc0 != 0x80 {
			return fail;
		}
		// the next shift would push set bits out of the top
		if acc & 0xfc000000 != 0 {
			return fail;
		}
		acc = (acc << 6) | (b & 0x3f) as Unichar;
	}

	if opts.contains(Utf8Options::ALLOW_ERROR_ESCAPES) && is_error(acc) {
		return fail;
	}
	if acc < CLASS_MIN[extra]
		&& !opts.contains(Utf8Options::ALLOW_NON_MINIMAL)
		&& !(extra == 1 && acc == 0 && opts.contains(Utf8Options::ALLOW_ENCODED_ZERO))
	{
		return fail;
	}
	if is_non_character(acc) && !opts.contains(Utf8Options::ALLOW_NON_CHARACTERS) {
		return fail;
	}
	(acc, 1 + extra)
}

/// Decode one logical character, combining surrogate pairs if allowed.
fn decode_char(src: &[u8], opts: Utf8Options) -> (Unichar, usize) {
	let (c, len) = decode_sequence(src, opts);
	if len == 0 {
		return (c, len);
	}
	if is_high_surrogate(c) {
		if opts.contains(Utf8Options::ALLOW_SURROGATES) {
			let (low, low_len) = decode_sequence(&src[len..], opts);
			if low_len > 0 && is_low_surrogate(low) {
				return (combine_surrogates(c, low), len + low_len);
			}
			return (make_error(src[0]), 1);
		}
		if opts.contains(Utf8Options::ALLOW_NON_CHARACTERS) {
			return (c, len);
		}
		return (make_error(src[0]), 1);
	}
	if is_low_surrogate(c) && !opts.contains(Utf8Options::ALLOW_NON_CHARACTERS) {
		return (make_error(src[0]), 1);
	}
	(c, len)
}

/**
# Streaming UTF-8 decoder

Reads [`Unichar`]s from the front of a borrowed byte slice. The reader is
`Copy`: taking a snapshot of the position is as cheap as copying the
reader, and [`Utf8Reader::remaining`] recovers the unread bytes.

Malformed input never stops the reader. Each byte which cannot be decoded
under the reader's [`Utf8Options`] comes out as one error character, and
decoding continues with the next byte.

## Example

```
use utfxml::utf8::{Utf8Options, Utf8Reader};
use utfxml::unichar::{is_error, error_id};
let mut r = Utf8Reader::new(b"\xc223", Utf8Options::empty());
let c = r.eat();
assert!(is_error(c));
assert_eq!(error_id(c), 0xc2);
assert_eq!(r.count(), 2);
```
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Reader<'x> {
	src: &'x [u8],
	opts: Utf8Options,
}

impl<'x> Utf8Reader<'x> {
	pub fn new(src: &'x [u8], opts: Utf8Options) -> Utf8Reader<'x> {
		Utf8Reader { src, opts }
	}

	pub fn options(&self) -> Utf8Options {
		self.opts
	}

	/// Return true while there are bytes left to decode.
	#[inline]
	pub fn has_more(&self) -> bool {
		!self.src.is_empty()
	}

	/// Consume one character's worth of bytes (one to fourteen, the latter
	/// for a surrogate pair of two seven-byte sequences) and return it.
	///
	/// Must only be called while [`has_more`](Self::has_more) is true;
	/// otherwise `0` is returned and nothing happens.
	pub fn eat(&mut self) -> Unichar {
		let (c, len) = decode_char(self.src, self.opts);
		self.src = &self.src[len..];
		c
	}

	/// The bytes which have not been decoded yet.
	pub fn remaining(&self) -> &'x [u8] {
		self.src
	}

	/// Number of characters left, counted on a copy of the reader.
	pub fn count(&self) -> usize {
		let mut copy = *self;
		let mut n = 0;
		while copy.has_more() {
			copy.eat();
			n += 1;
		}
		n
	}
}

impl<'x> Iterator for Utf8Reader<'x> {
	type Item = Unichar;

	fn next(&mut self) -> Option<Unichar> {
		if self.has_more() {
			Some(self.eat())
		} else {
			None
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		// at most 14 bytes form a single character
		((self.src.len() + 13) / 14, Some(self.src.len()))
	}
}

/// Decode a whole buffer.
pub fn decode(src: &[u8], opts: Utf8Options) -> Vec<Unichar> {
	Utf8Reader::new(src, opts).collect()
}
