/*!
# Streaming XML tokenizer

The [`Reader`] pulls bytes from a [`ByteSource`], sniffs their encoding,
and turns them into a flat stream of [`Token`]s. It does not validate: it
never reports broken markup as an error, it skips what it does not know
and ends with [`Token::Eof`] where input runs out mid-construct.

Token payloads are UTF-8. With the default options, bytes which are not
valid UTF-8 are carried through as-is (see
[`Utf8Options::ALLOW_ERROR_ESCAPES`]).

The absolute byte offset of each `TagStart`, `PIStart` and `Text` token is
available from [`Reader::token_pos`]; passing it to [`Reader::set_pos`]
later replays the document from that token on.
*/
use std::fmt;

use bytes::{Bytes, BytesMut};
use log::{debug, trace};

use crate::charset::{self, Codepage};
use crate::error::Result;
use crate::utf8::Utf8Options;

mod entities;
mod selectors;
mod source;

pub use entities::{expand_entities, EntityHandler, StandardEntities};
pub use source::{ByteSource, Encoding, MIN_BUFFER_SIZE};

use selectors::*;
use source::CharStream;

/// Treatment of text which consists of whitespace only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
	/// Drop it.
	Trim,
	/// Replace it with a single space.
	Single,
	/// Keep it unchanged.
	All,
}

impl Default for Whitespace {
	fn default() -> Whitespace {
		Whitespace::Trim
	}
}

#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
	pub whitespace: Whitespace,
	/// Decoder options for UTF-8 documents. Token text is encoded with the
	/// same options.
	pub utf8: Utf8Options,
	/// Size of the read buffer; at least [`MIN_BUFFER_SIZE`].
	pub buffer_size: usize,
	/// Codepages an `<?xml encoding="..."?>` declaration may select.
	pub codepages: &'static [&'static Codepage],
}

impl Default for ReaderOptions {
	fn default() -> ReaderOptions {
		ReaderOptions {
			whitespace: Whitespace::Trim,
			utf8: Utf8Options::ALLOW_ERROR_ESCAPES,
			buffer_size: 4096,
			codepages: &[],
		}
	}
}

impl ReaderOptions {
	pub fn whitespace(mut self, v: Whitespace) -> ReaderOptions {
		self.whitespace = v;
		self
	}

	pub fn utf8(mut self, v: Utf8Options) -> ReaderOptions {
		self.utf8 = v;
		self
	}

	pub fn buffer_size(mut self, v: usize) -> ReaderOptions {
		self.buffer_size = v.max(MIN_BUFFER_SIZE);
		self
	}

	pub fn codepages(mut self, v: &'static [&'static Codepage]) -> ReaderOptions {
		self.codepages = v;
		self
	}
}

#[derive(Clone, PartialEq, Eq)]
pub enum Token {
	/// End of input, or input ended in the middle of a construct.
	Eof,
	/// `<tag`
	TagStart { tag: Bytes },
	/// `name="value"` in a tag; a name without value repeats the name.
	TagAttribute { tag: Bytes, name: Bytes, value: Bytes },
	/// `</tag>` or the `/>` of an empty element
	TagEnd { tag: Bytes },
	/// `<?tag`
	PIStart { tag: Bytes },
	PIAttribute { tag: Bytes, name: Bytes, value: Bytes },
	/// The text between `<!--` and `-->`
	Comment(Bytes),
	/// Character data, including CDATA sections
	Text(Bytes),
}

impl Token {
	pub const NAME_EOF: &'static str = "Eof";
	pub const NAME_TAGSTART: &'static str = "TagStart";
	pub const NAME_TAGATTRIBUTE: &'static str = "TagAttribute";
	pub const NAME_TAGEND: &'static str = "TagEnd";
	pub const NAME_PISTART: &'static str = "PIStart";
	pub const NAME_PIATTRIBUTE: &'static str = "PIAttribute";
	pub const NAME_COMMENT: &'static str = "Comment";
	pub const NAME_TEXT: &'static str = "Text";

	pub fn name(&self) -> &'static str {
		match self {
			Self::Eof => Self::NAME_EOF,
			Self::TagStart { .. } => Self::NAME_TAGSTART,
			Self::TagAttribute { .. } => Self::NAME_TAGATTRIBUTE,
			Self::TagEnd { .. } => Self::NAME_TAGEND,
			Self::PIStart { .. } => Self::NAME_PISTART,
			Self::PIAttribute { .. } => Self::NAME_PIATTRIBUTE,
			Self::Comment(..) => Self::NAME_COMMENT,
			Self::Text(..) => Self::NAME_TEXT,
		}
	}

	/// Name of the tag or processing instruction the token belongs to.
	pub fn tag(&self) -> Option<&Bytes> {
		match self {
			Self::TagStart { tag }
			| Self::TagAttribute { tag, .. }
			| Self::TagEnd { tag }
			| Self::PIStart { tag }
			| Self::PIAttribute { tag, .. } => Some(tag),
			_ => None,
		}
	}

	pub fn is_eof(&self) -> bool {
		match self {
			Self::Eof => true,
			_ => false,
		}
	}
}

struct DebugBytes<'a>(&'a [u8]);

impl<'a> fmt::Debug for DebugBytes<'a> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str("b\"")?;
		for b in self.0.iter().copied().flat_map(std::ascii::escape_default) {
			write!(f, "{}", b as char)?;
		}
		f.write_str("\"")
	}
}

impl fmt::Debug for Token {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Eof => f.write_str(Self::NAME_EOF),
			Self::TagStart { tag } | Self::TagEnd { tag } | Self::PIStart { tag } => f
				.debug_struct(self.name())
				.field("tag", &DebugBytes(tag))
				.finish(),
			Self::TagAttribute { tag, name, value } | Self::PIAttribute { tag, name, value } => f
				.debug_struct(self.name())
				.field("tag", &DebugBytes(tag))
				.field("name", &DebugBytes(name))
				.field("value", &DebugBytes(value))
				.finish(),
			Self::Comment(text) | Self::Text(text) => f
				.debug_tuple(self.name())
				.field(&DebugBytes(text))
				.finish(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Main,
	InTag,
	InProcessingInstruction,
}

struct ST(State, Option<Token>);

impl ST {
	fn splice<'a>(self, st: &'a mut State) -> Option<Token> {
		*st = self.0;
		self.1
	}
}

fn is_space_only(s: &[u8]) -> bool {
	s.iter().all(|b| CLASS_XML_SPACE.contains(b))
}

/// Streaming XML tokenizer over a [`ByteSource`].
pub struct Reader<S, E = StandardEntities> {
	stream: CharStream<S>,
	entities: E,
	opts: ReaderOptions,
	state: State,
	/// Name of the tag or PI being read, shared with its tokens
	tag: Bytes,
	declared_encoding: Option<Bytes>,
	token_pos: u64,
	scratch: BytesMut,
}

impl<S: ByteSource> Reader<S> {
	/// Create a reader with default options.
	///
	/// This reads the first bytes of `source` to detect the encoding.
	pub fn new(source: S) -> Result<Reader<S>> {
		Self::with_options(source, ReaderOptions::default())
	}

	pub fn with_options(source: S, opts: ReaderOptions) -> Result<Reader<S>> {
		Reader::with_entities(source, opts, StandardEntities::default())
	}
}

impl<S: ByteSource, E: EntityHandler> Reader<S, E> {
	/// Create a reader which resolves entity references through `entities`.
	pub fn with_entities(source: S, opts: ReaderOptions, entities: E) -> Result<Reader<S, E>> {
		let stream = CharStream::new(source, opts.buffer_size, opts.utf8)?;
		Ok(Reader {
			stream,
			entities,
			opts,
			state: State::Main,
			tag: Bytes::new(),
			declared_encoding: None,
			token_pos: 0,
			scratch: BytesMut::new(),
		})
	}

	pub fn options(&self) -> &ReaderOptions {
		&self.opts
	}

	/// Encoding currently used to decode the document.
	pub fn encoding(&self) -> Encoding {
		self.stream.encoding()
	}

	/// The value of the `encoding` pseudo-attribute of the XML declaration,
	/// if one has been read.
	pub fn declared_encoding(&self) -> Option<&Bytes> {
		self.declared_encoding.as_ref()
	}

	/// Byte offset at which the most recent `TagStart`, `PIStart` or `Text`
	/// token started.
	pub fn token_pos(&self) -> u64 {
		self.token_pos
	}

	pub fn into_inner(self) -> S {
		self.stream.into_inner()
	}

	/// Continue reading at byte `offset` of the document.
	///
	/// The detected encoding is kept. Any partially read tag is forgotten;
	/// reading resumes as if a document started at `offset`.
	pub fn set_pos(&mut self, offset: u64) -> Result<()> {
		debug!("seeking to byte {}", offset);
		self.stream.seek(offset)?;
		self.state = State::Main;
		self.scratch.clear();
		self.token_pos = offset;
		Ok(())
	}

	/// Read the next token.
	///
	/// After [`Token::Eof`] has been returned once, it is returned on every
	/// further call until [`set_pos`](Self::set_pos) is used.
	pub fn read_next(&mut self) -> Result<Token> {
		self.scratch.clear();
		loop {
			let st = match self.state {
				State::Main => self.lex_main(),
				State::InTag => self.lex_tag(),
				State::InProcessingInstruction => self.lex_pi(),
			}?;
			if let Some(tok) = st.splice(&mut self.state) {
				trace!("{:?} at {}", tok, self.token_pos);
				return Ok(tok);
			}
		}
	}

	/// Read all tokens up to the end of the document and hand them to `cb`.
	/// The final [`Token::Eof`] is not passed on.
	pub fn read_all<F: FnMut(Token)>(&mut self, mut cb: F) -> Result<()> {
		loop {
			match self.read_next()? {
				Token::Eof => return Ok(()),
				tok => cb(tok),
			}
		}
	}

	fn eof(&mut self) -> ST {
		self.scratch.clear();
		ST(State::Main, Some(Token::Eof))
	}

	fn take_scratch(&mut self) -> Bytes {
		self.scratch.split().freeze()
	}

	/// Take the scratch buffer and expand entity references in it.
	fn take_expanded(&mut self) -> Bytes {
		let raw = self.scratch.split();
		if !raw.contains(&b'&') {
			return raw.freeze();
		}
		let mut result = BytesMut::with_capacity(raw.len());
		expand_entities(&self.entities, &raw, &mut result);
		result.freeze()
	}

	/// Skip up to and including the next `>`.
	fn skip_markup(&mut self) -> Result<ST> {
		match self.stream.skip_until(&GT, true)? {
			Endpoint::Eof => Ok(self.eof()),
			Endpoint::Delimiter(_) => {
				self.stream.advance()?;
				Ok(ST(State::Main, None))
			}
		}
	}

	fn lex_main(&mut self) -> Result<ST> {
		self.token_pos = self.stream.position();
		match self.stream.current() {
			None => Ok(self.eof()),
			Some(LT) => {
				self.stream.advance()?;
				self.lex_markup()
			}
			Some(_) => self.lex_text(),
		}
	}

	fn lex_text(&mut self) -> Result<ST> {
		self.stream.read_until(&LT, false, &mut self.scratch)?;
		if is_space_only(&self.scratch) {
			let text = match self.opts.whitespace {
				Whitespace::Trim => {
					self.scratch.clear();
					return Ok(ST(State::Main, None));
				}
				Whitespace::Single => {
					self.scratch.clear();
					Bytes::from_static(b" ")
				}
				Whitespace::All => self.take_scratch(),
			};
			return Ok(ST(State::Main, Some(Token::Text(text))));
		}
		let text = self.take_expanded();
		Ok(ST(State::Main, Some(Token::Text(text))))
	}

	/// Dispatch on the character after a `<`.
	fn lex_markup(&mut self) -> Result<ST> {
		match self.stream.current() {
			None => Ok(self.eof()),
			Some(QUESTION) => {
				self.stream.advance()?;
				if let Endpoint::Eof = self.stream.read_until(&DELIM_PI_NAME, false, &mut self.scratch)? {
					return Ok(self.eof());
				}
				let tag = self.take_scratch();
				self.tag = tag.clone();
				Ok(ST(State::InProcessingInstruction, Some(Token::PIStart { tag })))
			}
			Some(SLASH) => {
				self.stream.advance()?;
				if let Endpoint::Eof = self.stream.read_until(&DELIM_END_TAG_NAME, false, &mut self.scratch)? {
					return Ok(self.eof());
				}
				let tag = self.take_scratch();
				if let Endpoint::Eof = self.stream.skip_until(&GT, true)? {
					return Ok(self.eof());
				}
				self.stream.advance()?;
				Ok(ST(State::Main, Some(Token::TagEnd { tag })))
			}
			Some(BANG) => {
				self.stream.advance()?;
				self.lex_bang()
			}
			Some(_) => {
				if let Endpoint::Eof = self.stream.read_until(&DELIM_TAG_NAME, false, &mut self.scratch)? {
					return Ok(self.eof());
				}
				let tag = self.take_scratch();
				self.tag = tag.clone();
				Ok(ST(State::InTag, Some(Token::TagStart { tag })))
			}
		}
	}

	/// Dispatch on the character after `<!`.
	fn lex_bang(&mut self) -> Result<ST> {
		match self.stream.current() {
			None => Ok(self.eof()),
			Some(LBRACKET) => {
				self.stream.advance()?;
				if let Endpoint::Eof = self.stream.read_until(&LBRACKET, false, &mut self.scratch)? {
					return Ok(self.eof());
				}
				self.stream.advance()?;
				let is_cdata = &self.scratch[..] == b"CDATA";
				self.scratch.clear();
				if is_cdata {
					self.lex_cdata()
				} else {
					self.skip_markup()
				}
			}
			Some(DASH) => {
				self.stream.advance()?;
				if self.stream.current() == Some(DASH) {
					self.stream.advance()?;
					self.lex_comment()
				} else {
					self.skip_markup()
				}
			}
			Some(_) => self.skip_markup(),
		}
	}

	/// Read a CDATA section after its `<![CDATA[`.
	fn lex_cdata(&mut self) -> Result<ST> {
		let mut pending = 0usize;
		loop {
			let c = match self.stream.current() {
				None => return Ok(self.eof()),
				Some(c) => c,
			};
			self.stream.advance()?;
			match pending {
				0 if c == RBRACKET => pending = 1,
				0 => self.stream.put(c, &mut self.scratch),
				1 if c == RBRACKET => pending = 2,
				1 => {
					self.stream.put(RBRACKET, &mut self.scratch);
					self.stream.put(c, &mut self.scratch);
					pending = 0;
				}
				_ if c == GT => break,
				// only the last two brackets can belong to the terminator
				_ if c == RBRACKET => self.stream.put(RBRACKET, &mut self.scratch),
				_ => {
					self.stream.put(RBRACKET, &mut self.scratch);
					self.stream.put(RBRACKET, &mut self.scratch);
					self.stream.put(c, &mut self.scratch);
					pending = 0;
				}
			}
		}
		let text = self.take_scratch();
		Ok(ST(State::Main, Some(Token::Text(text))))
	}

	/// Read a comment after its `<!--`.
	fn lex_comment(&mut self) -> Result<ST> {
		let mut dash = false;
		loop {
			let c = match self.stream.current() {
				None => return Ok(self.eof()),
				Some(c) => c,
			};
			self.stream.advance()?;
			if c == DASH {
				if dash {
					break;
				}
				dash = true;
				continue;
			}
			if dash {
				self.stream.put(DASH, &mut self.scratch);
				dash = false;
			}
			self.stream.put(c, &mut self.scratch);
		}
		let text = self.take_scratch();
		if let Endpoint::Eof = self.stream.skip_until(&GT, false)? {
			return Ok(self.eof());
		}
		self.stream.advance()?;
		Ok(ST(State::Main, Some(Token::Comment(text))))
	}

	/// Read one `name` or `name=value` pair. `None` means the input ended.
	fn lex_attribute(&mut self, name_delims: &'static [u8], value_delims: &'static [u8]) -> Result<Option<(Bytes, Bytes)>> {
		if let Endpoint::Eof = self.stream.read_until(&name_delims, false, &mut self.scratch)? {
			return Ok(None);
		}
		let name = self.take_scratch();
		self.stream.skip_spaces()?;
		if self.stream.current() != Some(EQ) {
			return Ok(Some((name.clone(), name)));
		}
		self.stream.advance()?;
		self.stream.skip_spaces()?;
		match self.stream.current() {
			None => return Ok(None),
			Some(q) if q == DQUOTE || q == SQUOTE => {
				self.stream.advance()?;
				if let Endpoint::Eof = self.stream.read_until(&q, false, &mut self.scratch)? {
					return Ok(None);
				}
				self.stream.advance()?;
			}
			Some(_) => {
				if let Endpoint::Eof = self.stream.read_until(&value_delims, true, &mut self.scratch)? {
					return Ok(None);
				}
			}
		}
		let value = self.take_expanded();
		Ok(Some((name, value)))
	}

	fn lex_tag(&mut self) -> Result<ST> {
		self.stream.skip_spaces()?;
		match self.stream.current() {
			None => Ok(self.eof()),
			Some(GT) => {
				self.stream.advance()?;
				Ok(ST(State::Main, None))
			}
			Some(SLASH) => {
				if let Endpoint::Eof = self.stream.skip_until(&GT, true)? {
					return Ok(self.eof());
				}
				self.stream.advance()?;
				Ok(ST(State::Main, Some(Token::TagEnd { tag: self.tag.clone() })))
			}
			Some(_) => match self.lex_attribute(DELIM_ATTR_NAME, DELIM_ATTR_VALUE)? {
				None => Ok(self.eof()),
				Some((name, value)) => Ok(ST(
					State::InTag,
					Some(Token::TagAttribute {
						tag: self.tag.clone(),
						name,
						value,
					}),
				)),
			},
		}
	}

	fn lex_pi(&mut self) -> Result<ST> {
		self.stream.skip_spaces()?;
		match self.stream.current() {
			None => Ok(self.eof()),
			Some(QUESTION) | Some(GT) => self.skip_markup(),
			Some(_) => match self.lex_attribute(DELIM_PI_ATTR_NAME, DELIM_PI_ATTR_VALUE)? {
				None => Ok(self.eof()),
				Some((name, value)) => {
					if &self.tag[..] == b"xml" && &name[..] == b"encoding" {
						self.apply_encoding_declaration(&value);
					}
					Ok(ST(
						State::InProcessingInstruction,
						Some(Token::PIAttribute {
							tag: self.tag.clone(),
							name,
							value,
						}),
					))
				}
			},
		}
	}

	fn apply_encoding_declaration(&mut self, label: &Bytes) {
		self.declared_encoding = Some(label.clone());
		let current = self.stream.encoding();
		if current.is_16bit() {
			debug!("ignoring declared encoding {:?}, document is {:?}", DebugBytes(label), current);
			return;
		}
		if charset::is_utf8_label(label) {
			debug!("declared encoding {:?}, decoding as UTF-8", DebugBytes(label));
			self.stream.set_encoding(Encoding::Utf8);
			return;
		}
		match charset::lookup(label, self.opts.codepages) {
			Some(cp) => {
				debug!("declared encoding {:?}, decoding as {}", DebugBytes(label), cp.name);
				self.stream.set_encoding(Encoding::Codepage(cp));
			}
			None => {
				debug!("unknown encoding {:?}, falling back to UTF-8", DebugBytes(label));
				self.stream.set_encoding(Encoding::Utf8);
			}
		}
	}
}

impl<S, E> fmt::Debug for Reader<S, E> {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("Reader")
			.field("state", &self.state)
			.field("opts", &self.opts)
			.field("tag", &DebugBytes(&self.tag))
			.field("token_pos", &self.token_pos)
			.finish()
	}
}
