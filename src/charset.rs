/*!
# Charsets

The set of transcoders is closed: UTF-8 (with its [`Utf8Options`]) or a
single-byte codepage described by a 128-entry table for the bytes
`0x80..=0xff`. [`Charset`] selects between them without dynamic dispatch.
*/
use bytes::BufMut;

use crate::unichar::*;
use crate::utf8::{self, Utf8Options, Utf8Reader};

/// A single-byte codepage.
///
/// Bytes below `0x80` are always ASCII. `table[i]` holds the codepoint for
/// byte `0x80 + i`; a `0` entry marks a byte the codepage leaves undefined.
#[derive(Debug, PartialEq, Eq)]
pub struct Codepage {
	pub name: &'static str,
	pub aliases: &'static [&'static str],
	pub table: [Unichar; 128],
}

const fn latin1_table() -> [Unichar; 128] {
	let mut table = [0; 128];
	let mut i = 0;
	while i < 128 {
		table[i] = 0x80 + i as Unichar;
		i += 1;
	}
	table
}

const fn windows1252_table() -> [Unichar; 128] {
	const C1: [Unichar; 32] = [
		0x20ac, 0, 0x201a, 0x0192, 0x201e, 0x2026, 0x2020, 0x2021,
		0x02c6, 0x2030, 0x0160, 0x2039, 0x0152, 0, 0x017d, 0,
		0, 0x2018, 0x2019, 0x201c, 0x201d, 0x2022, 0x2013, 0x2014,
		0x02dc, 0x2122, 0x0161, 0x203a, 0x0153, 0, 0x017e, 0x0178,
	];
	let mut table = latin1_table();
	let mut i = 0;
	while i < C1.len() {
		table[i] = C1[i];
		i += 1;
	}
	table
}

pub static ISO_8859_1: Codepage = Codepage {
	name: "iso-8859-1",
	aliases: &["latin1", "l1", "iso8859-1", "iso_8859-1", "cp819"],
	table: latin1_table(),
};

pub static WINDOWS_1252: Codepage = Codepage {
	name: "windows-1252",
	aliases: &["cp1252", "x-cp1252"],
	table: windows1252_table(),
};

impl Codepage {
	/// Decode a single byte. Undefined bytes become error characters.
	#[inline]
	pub fn decode_byte(&self, b: u8) -> Unichar {
		if b < 0x80 {
			return b as Unichar;
		}
		match self.table[(b - 0x80) as usize] {
			0 => make_error(b),
			c => c,
		}
	}

	/// Find the byte for `c`, if the codepage has one.
	///
	/// Error characters map back to the byte they stand for.
	pub fn encode_char(&self, c: Unichar) -> Option<u8> {
		if c < 0x80 {
			return Some(c as u8);
		}
		if is_error(c) {
			return Some(error_id(c));
		}
		self.table.iter().position(|v| *v == c).map(|i| 0x80 + i as u8)
	}

	/// Match an encoding label against the name and aliases, ignoring
	/// ASCII case.
	pub fn matches(&self, label: &[u8]) -> bool {
		let label = trim_ascii(label);
		self.name.as_bytes().eq_ignore_ascii_case(label)
			|| self.aliases.iter().any(|a| a.as_bytes().eq_ignore_ascii_case(label))
	}
}

fn trim_ascii(mut s: &[u8]) -> &[u8] {
	while let [first, rest @ ..] = s {
		if !first.is_ascii_whitespace() {
			break;
		}
		s = rest;
	}
	while let [rest @ .., last] = s {
		if !last.is_ascii_whitespace() {
			break;
		}
		s = rest;
	}
	s
}

/// Find the codepage for an encoding label among `registry`.
pub fn lookup(label: &[u8], registry: &[&'static Codepage]) -> Option<&'static Codepage> {
	registry.iter().copied().find(|cp| cp.matches(label))
}

/// Return true if `label` names UTF-8.
pub fn is_utf8_label(label: &[u8]) -> bool {
	let label = trim_ascii(label);
	label.eq_ignore_ascii_case(b"utf-8") || label.eq_ignore_ascii_case(b"utf8")
}

/// One of the supported transcoders.
#[derive(Debug, Clone, Copy)]
pub enum Charset {
	Utf8(Utf8Options),
	Codepage(&'static Codepage),
}

impl Charset {
	/// Decode all of `src`, appending to `into`.
	pub fn decode_into(&self, src: &[u8], into: &mut Vec<Unichar>) {
		match self {
			Self::Utf8(opts) => into.extend(Utf8Reader::new(src, *opts)),
			Self::Codepage(cp) => into.extend(src.iter().map(|b| cp.decode_byte(*b))),
		}
	}

	/// Encode one character, appending to `buf`.
	///
	/// Characters a codepage cannot represent are written as `?`.
	pub fn encode_into<B: BufMut + ?Sized>(&self, c: Unichar, buf: &mut B) {
		match self {
			Self::Utf8(opts) => utf8::encode_into(buf, c, *opts),
			Self::Codepage(cp) => buf.put_u8(cp.encode_char(c).unwrap_or(b'?')),
		}
	}

	pub fn decode(&self, src: &[u8]) -> Vec<Unichar> {
		let mut result = Vec::with_capacity(src.len());
		self.decode_into(src, &mut result);
		result
	}

	pub fn encode(&self, chars: &[Unichar]) -> Vec<u8> {
		let mut result = Vec::with_capacity(chars.len());
		for c in chars {
			self.encode_into(*c, &mut result);
		}
		result
	}
}

/// Convert `src` from one charset to another.
pub fn transcode(src: &[u8], from: Charset, to: Charset) -> Vec<u8> {
	let mut result = Vec::with_capacity(src.len());
	match from {
		Charset::Utf8(opts) => {
			for c in Utf8Reader::new(src, opts) {
				to.encode_into(c, &mut result);
			}
		}
		Charset::Codepage(cp) => {
			for b in src {
				to.encode_into(cp.decode_byte(*b), &mut result);
			}
		}
	}
	result
}
