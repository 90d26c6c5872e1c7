/*!
# Character positions in UTF-8 text

Everything here walks the text from the start with a [`Utf8Reader`]; there
is no random access into multi-byte text. Positions past the end of the
input saturate at the end instead of failing.
*/
use crate::unichar::Unichar;

use super::{Utf8Options, Utf8Reader};

/// Number of characters in `src`.
pub fn length(src: &[u8], opts: Utf8Options) -> usize {
	Utf8Reader::new(src, opts).count()
}

/// Return a reader which has skipped the first `n` characters of `src` (or
/// all of them, if there are fewer).
fn skip_chars(src: &[u8], n: usize, opts: Utf8Options) -> Utf8Reader<'_> {
	let mut r = Utf8Reader::new(src, opts);
	for _ in 0..n {
		if !r.has_more() {
			break;
		}
		r.eat();
	}
	r
}

/// Byte offset at which character number `char_pos` starts.
///
/// A position beyond the last character returns `src.len()`.
pub fn char_to_byte_pos(src: &[u8], char_pos: usize, opts: Utf8Options) -> usize {
	src.len() - skip_chars(src, char_pos, opts).remaining().len()
}

/// Number of complete characters within the first `byte_pos` bytes.
///
/// If `byte_pos` points into the middle of a character, that character is
/// not counted.
pub fn byte_to_char_pos(src: &[u8], byte_pos: usize, opts: Utf8Options) -> usize {
	let mut r = Utf8Reader::new(src, opts);
	let mut n = 0;
	while r.has_more() {
		let mut next = r;
		next.eat();
		if src.len() - next.remaining().len() > byte_pos {
			break;
		}
		r = next;
		n += 1;
	}
	n
}

/// The bytes of `len` characters starting at character `start`.
///
/// This borrows from `src` and never copies.
pub fn substr(src: &[u8], start: usize, len: usize, opts: Utf8Options) -> &[u8] {
	let head = skip_chars(src, start, opts).remaining();
	let tail = skip_chars(head, len, opts).remaining();
	&head[..head.len() - tail.len()]
}

/// The character at position `pos`, or `None` past the end.
pub fn char_at(src: &[u8], pos: usize, opts: Utf8Options) -> Option<Unichar> {
	let mut r = skip_chars(src, pos, opts);
	if r.has_more() {
		Some(r.eat())
	} else {
		None
	}
}
