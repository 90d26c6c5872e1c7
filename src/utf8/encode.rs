use bytes::BufMut;

use crate::unichar::*;

use super::Utf8Options;

/// Append the (possibly extended) UTF-8 sequence for `c` without looking at
/// any options.
///
/// Values beyond the 21-bit range use the pre-2003 five- and six-byte forms,
/// and anything from `0x80000000` on uses a seven-byte form with lead byte
/// `0xfe`. The encoding is total over `u32`.
fn encode_raw<B: BufMut + ?Sized>(buf: &mut B, c: Unichar) {
	if c < 0x80 {
		buf.put_u8(c as u8);
		return;
	}
	let extra: u32 = if c < 0x800 {
		1
	} else if c < 0x10000 {
		2
	} else if c < 0x200000 {
		3
	} else if c < 0x4000000 {
		4
	} else if c < 0x80000000 {
		5
	} else {
		6
	};
	// widen so that the shift for the seven-byte form stays in range
	let wide = c as u64;
	let prefix = (0xff00u32 >> (extra + 1)) as u8;
	buf.put_u8(prefix | (wide >> (6 * extra)) as u8);
	for i in (0..extra).rev() {
		buf.put_u8(0x80 | ((wide >> (6 * i)) & 0x3f) as u8);
	}
}

/// Append the encoding of a single codepoint to `buf`.
///
/// The cases are checked in order:
///
/// 1. With [`Utf8Options::ALLOW_ERROR_ESCAPES`], an error character is
///    written as the single byte it stands for.
/// 2. With [`Utf8Options::ALLOW_SURROGATES`], a supplementary-plane
///    codepoint is written as two three-byte surrogate halves (CESU-8).
/// 3. With [`Utf8Options::ALLOW_ENCODED_ZERO`], NUL is written as `C0 80`.
/// 4. Everything else gets the shortest sequence for its value.
///
/// This never fails, whatever `c` is.
pub fn encode_into<B: BufMut + ?Sized>(buf: &mut B, c: Unichar, opts: Utf8Options) {
	if opts.contains(Utf8Options::ALLOW_ERROR_ESCAPES) && is_error(c) {
		buf.put_u8(error_id(c));
	} else if c >= 0x10000 && c < UNICODE_MAX && opts.contains(Utf8Options::ALLOW_SURROGATES) {
		let (high, low) = split_surrogates(c);
		encode_raw(buf, high);
		encode_raw(buf, low);
	} else if c == 0 && opts.contains(Utf8Options::ALLOW_ENCODED_ZERO) {
		buf.put_slice(&[0xc0, 0x80]);
	} else {
		encode_raw(buf, c);
	}
}

/// Encode a sequence of codepoints into a fresh buffer.
pub fn encoded(chars: &[Unichar], opts: Utf8Options) -> Vec<u8> {
	let mut result = Vec::with_capacity(chars.len());
	for c in chars {
		encode_into(&mut result, *c, opts);
	}
	result
}
