/*!
# Byte sources and character streams

[`ByteSource`] is the seam between the tokenizer and whatever holds the
document. [`CharStream`] sits on top of it: it keeps a fixed-size buffer of
raw bytes, decodes one character of lookahead in the active [`Encoding`]
and writes characters back out as UTF-8.
*/
use std::io;

use bytes::BytesMut;
use log::debug;

use crate::charset::Codepage;
use crate::error::{Error, Result};
use crate::unichar::Unichar;
use crate::utf8::{self, Utf8Options, Utf8Reader};

use super::selectors::{is_space, CharSelect, Endpoint, DQUOTE, SQUOTE};

/// Smallest accepted buffer size, in bytes.
pub const MIN_BUFFER_SIZE: usize = 32;

/// Bytes to keep buffered before decoding a UTF-8 character. This is enough
/// for the longest sequence plus a surrogate partner.
const UTF8_LOOKAHEAD: usize = 2 * utf8::MAX_SEQUENCE_LEN;

/// A seekable source of document bytes.
///
/// Offsets are absolute byte positions in the document; the source is
/// expected to be at offset 0 when a [`Reader`](super::Reader) is created
/// from it.
pub trait ByteSource {
	/// Read bytes into `buf`, returning how many were read. Zero means the
	/// end of the document.
	fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize>;

	/// Reposition to the absolute byte `offset`.
	fn seek_to(&mut self, offset: u64) -> io::Result<()>;
}

impl<T: io::Read + io::Seek + ?Sized> ByteSource for T {
	fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		loop {
			match self.read(buf) {
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				other => return other,
			}
		}
	}

	fn seek_to(&mut self, offset: u64) -> io::Result<()> {
		self.seek(io::SeekFrom::Start(offset)).map(|_| ())
	}
}

/// Byte encoding of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
	Utf8,
	Utf16Le,
	Utf16Be,
	Codepage(&'static Codepage),
}

impl Encoding {
	pub fn is_16bit(&self) -> bool {
		match self {
			Self::Utf16Le | Self::Utf16Be => true,
			_ => false,
		}
	}
}

struct ChunkBuffer {
	data: Box<[u8]>,
	start: usize,
	end: usize,
	/// Document offset of `data[0]`.
	offset: u64,
	eof: bool,
}

impl ChunkBuffer {
	fn new(size: usize) -> ChunkBuffer {
		ChunkBuffer {
			data: vec![0u8; size].into_boxed_slice(),
			start: 0,
			end: 0,
			offset: 0,
			eof: false,
		}
	}

	/// Document offset of the first unconsumed byte.
	#[inline]
	fn position(&self) -> u64 {
		self.offset + self.start as u64
	}

	#[inline]
	fn available(&self) -> &[u8] {
		&self.data[self.start..self.end]
	}

	#[inline]
	fn consume(&mut self, n: usize) {
		debug_assert!(self.start + n <= self.end);
		self.start += n;
	}

	/// Make at least `want` bytes available, unless the source runs dry
	/// first.
	fn fill_at_least<S: ByteSource + ?Sized>(&mut self, src: &mut S, want: usize) -> io::Result<()> {
		debug_assert!(want <= self.data.len());
		if self.end - self.start >= want || self.eof {
			return Ok(());
		}
		if self.start > 0 {
			self.data.copy_within(self.start..self.end, 0);
			self.offset += self.start as u64;
			self.end -= self.start;
			self.start = 0;
		}
		while self.end < want && !self.eof {
			let n = src.fill(&mut self.data[self.end..])?;
			if n == 0 {
				self.eof = true;
			} else {
				self.end += n;
			}
		}
		Ok(())
	}

	fn reset(&mut self, offset: u64) {
		self.start = 0;
		self.end = 0;
		self.offset = offset;
		self.eof = false;
	}
}

/// Decoding reader with one character of lookahead.
pub struct CharStream<S> {
	source: S,
	buf: ChunkBuffer,
	encoding: Encoding,
	/// Options for decoding UTF-8 input
	utf8: Utf8Options,
	/// Options for encoding output
	out: Utf8Options,
	ch: Option<Unichar>,
	ch_pos: u64,
}

impl<S: ByteSource> CharStream<S> {
	/// Sniff the encoding from the first bytes of `source` and prime the
	/// lookahead.
	pub fn new(source: S, buffer_size: usize, utf8: Utf8Options) -> Result<CharStream<S>> {
		let mut result = CharStream {
			source,
			buf: ChunkBuffer::new(buffer_size.max(MIN_BUFFER_SIZE)),
			encoding: Encoding::Utf8,
			utf8,
			out: utf8,
			ch: None,
			ch_pos: 0,
		};
		result.detect_encoding()?;
		result.advance()?;
		Ok(result)
	}

	fn detect_encoding(&mut self) -> Result<()> {
		self.buf.fill_at_least(&mut self.source, 3)?;
		let (encoding, bom) = match self.buf.available() {
			[0xef, 0xbb, 0xbf, ..] => (Encoding::Utf8, 3),
			[0xfe, 0xff, ..] => (Encoding::Utf16Be, 2),
			[0xff, 0xfe, ..] => (Encoding::Utf16Le, 2),
			[0, b, ..] if *b != 0 => (Encoding::Utf16Be, 0),
			[a, 0, ..] if *a != 0 => (Encoding::Utf16Le, 0),
			_ => (Encoding::Utf8, 0),
		};
		debug!("detected {:?} (byte order mark: {} bytes)", encoding, bom);
		self.buf.consume(bom);
		self.set_encoding(encoding);
		Ok(())
	}

	pub fn encoding(&self) -> Encoding {
		self.encoding
	}

	/// Switch the decoder. Takes effect with the character after the
	/// current lookahead.
	pub fn set_encoding(&mut self, encoding: Encoding) {
		self.encoding = encoding;
		// 16-bit code units in the error range are real characters there
		self.out = if encoding.is_16bit() {
			self.utf8 - Utf8Options::ALLOW_ERROR_ESCAPES
		} else {
			self.utf8
		};
	}

	/// The lookahead character; `None` at the end of the document.
	#[inline]
	pub fn current(&self) -> Option<Unichar> {
		self.ch
	}

	/// Document offset of the lookahead character.
	#[inline]
	pub fn position(&self) -> u64 {
		self.ch_pos
	}

	/// Write `c` to `into` as UTF-8.
	#[inline]
	pub fn put(&self, c: Unichar, into: &mut BytesMut) {
		utf8::encode_into(into, c, self.out);
	}

	fn read_char(&mut self) -> Result<Option<Unichar>> {
		match self.encoding {
			Encoding::Utf8 => {
				self.buf.fill_at_least(&mut self.source, UTF8_LOOKAHEAD)?;
				let avail = self.buf.available();
				if avail.is_empty() {
					return Ok(None);
				}
				let mut r = Utf8Reader::new(avail, self.utf8);
				let c = r.eat();
				let used = avail.len() - r.remaining().len();
				self.buf.consume(used);
				Ok(Some(c))
			}
			Encoding::Utf16Le | Encoding::Utf16Be => {
				self.buf.fill_at_least(&mut self.source, 2)?;
				let unit = match self.buf.available() {
					[a, b, ..] if self.encoding == Encoding::Utf16Le => u16::from_le_bytes([*a, *b]),
					[a, b, ..] => u16::from_be_bytes([*a, *b]),
					// a dangling odd byte ends the document
					_ => return Ok(None),
				};
				self.buf.consume(2);
				Ok(Some(unit as Unichar))
			}
			Encoding::Codepage(cp) => {
				self.buf.fill_at_least(&mut self.source, 1)?;
				let b = match self.buf.available().first() {
					Some(b) => *b,
					None => return Ok(None),
				};
				self.buf.consume(1);
				Ok(Some(cp.decode_byte(b)))
			}
		}
	}

	/// Move to the next character.
	pub fn advance(&mut self) -> Result<()> {
		self.ch_pos = self.buf.position();
		self.ch = self.read_char()?;
		Ok(())
	}

	/// Continue decoding at the absolute byte `offset`.
	pub fn seek(&mut self, offset: u64) -> Result<()> {
		self.source.seek_to(offset).map_err(|e| Error::seek(offset, e))?;
		self.buf.reset(offset);
		self.advance()
	}

	pub fn skip_spaces(&mut self) -> Result<()> {
		while let Some(c) = self.ch {
			if !is_space(c) {
				break;
			}
			self.advance()?;
		}
		Ok(())
	}

	/// Copy characters to `into` until one matches `delimiters`. The
	/// delimiter is left as lookahead.
	///
	/// With `quotes`, delimiters between a pair of `"` or `'` do not count.
	pub fn read_until<D: CharSelect + ?Sized>(&mut self, delimiters: &D, quotes: bool, into: &mut BytesMut) -> Result<Endpoint> {
		let mut quote: Option<Unichar> = None;
		while let Some(c) = self.ch {
			match quote {
				Some(q) if c == q => quote = None,
				Some(_) => (),
				None if delimiters.select(c) => return Ok(Endpoint::Delimiter(c)),
				None if quotes && (c == DQUOTE || c == SQUOTE) => quote = Some(c),
				None => (),
			}
			self.put(c, into);
			self.advance()?;
		}
		Ok(Endpoint::Eof)
	}

	/// Like [`read_until`](Self::read_until), but discard what was read.
	pub fn skip_until<D: CharSelect + ?Sized>(&mut self, delimiters: &D, quotes: bool) -> Result<Endpoint> {
		let mut quote: Option<Unichar> = None;
		while let Some(c) = self.ch {
			match quote {
				Some(q) if c == q => quote = None,
				Some(_) => (),
				None if delimiters.select(c) => return Ok(Endpoint::Delimiter(c)),
				None if quotes && (c == DQUOTE || c == SQUOTE) => quote = Some(c),
				None => (),
			}
			self.advance()?;
		}
		Ok(Endpoint::Eof)
	}

	pub fn into_inner(self) -> S {
		self.source
	}
}
