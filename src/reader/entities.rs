/*!
# Entity expansion

Text and attribute values are scanned for `&name;` after they have been
extracted. Each reference is handed to an [`EntityHandler`], which writes
its replacement.
*/
use bytes::BytesMut;

use crate::unichar::Unichar;
use crate::utf8::{self, Utf8Options};

/// Replaces entity references.
pub trait EntityHandler {
	/// Write the expansion of `&name;` to `into`. `name` excludes the `&`
	/// and the `;`.
	fn expand(&self, name: &[u8], into: &mut BytesMut);
}

impl<F: Fn(&[u8], &mut BytesMut)> EntityHandler for F {
	fn expand(&self, name: &[u8], into: &mut BytesMut) {
		self(name, into)
	}
}

/// The five predefined XML entities and numeric character references.
///
/// Anything else is written back unchanged, including the `&` and `;`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardEntities {
	/// Options used to encode numeric character references.
	pub utf8: Utf8Options,
}

fn named_entity(name: &[u8]) -> Option<u8> {
	match name {
		b"amp" => Some(b'&'),
		b"lt" => Some(b'<'),
		b"gt" => Some(b'>'),
		b"apos" => Some(b'\''),
		b"quot" => Some(b'"'),
		_ => None,
	}
}

fn parse_number(digits: &[u8], radix: u32) -> Option<Unichar> {
	if digits.is_empty() {
		return None;
	}
	let mut result: Unichar = 0;
	for b in digits {
		let d = (*b as char).to_digit(radix)?;
		result = result.checked_mul(radix)?.checked_add(d)?;
	}
	Some(result)
}

fn char_reference(name: &[u8]) -> Option<Unichar> {
	match name {
		[b'#', b'x', hex @ ..] | [b'#', b'X', hex @ ..] => parse_number(hex, 16),
		[b'#', dec @ ..] => parse_number(dec, 10),
		_ => None,
	}
}

impl EntityHandler for StandardEntities {
	fn expand(&self, name: &[u8], into: &mut BytesMut) {
		if let Some(b) = named_entity(name) {
			into.extend_from_slice(&[b]);
		} else if let Some(c) = char_reference(name) {
			utf8::encode_into(into, c, self.utf8);
		} else {
			into.extend_from_slice(b"&");
			into.extend_from_slice(name);
			into.extend_from_slice(b";");
		}
	}
}

/// Copy `raw` to `into`, replacing each `&name;` through `handler`.
///
/// An `&` without a later `;` is copied as-is, along with everything after
/// it.
pub fn expand_entities<E: EntityHandler + ?Sized>(handler: &E, raw: &[u8], into: &mut BytesMut) {
	let mut rest = raw;
	while let Some(amp) = rest.iter().position(|b| *b == b'&') {
		into.extend_from_slice(&rest[..amp]);
		let tail = &rest[amp + 1..];
		match tail.iter().position(|b| *b == b';') {
			Some(semi) => {
				handler.expand(&tail[..semi], into);
				rest = &tail[semi + 1..];
			}
			None => {
				into.extend_from_slice(&rest[amp..]);
				return;
			}
		}
	}
	into.extend_from_slice(rest);
}
