use super::*;

use std::io;
use std::io::Cursor;

use bytes::Bytes;

static EXAMPLE_DOC: &'static str = "<?xml version='1.0'?>\n<foo><bar zot></bar><text id=1>\u{80}</text></foo>";

static CODEPAGES: [&'static Codepage; 2] = [&ISO_8859_1, &WINDOWS_1252];

fn b(s: &str) -> Bytes {
	Bytes::copy_from_slice(s.as_bytes())
}

fn utf16(s: &str, little_endian: bool) -> Vec<u8> {
	let mut result = Vec::new();
	for unit in s.encode_utf16() {
		if little_endian {
			result.extend_from_slice(&unit.to_le_bytes());
		} else {
			result.extend_from_slice(&unit.to_be_bytes());
		}
	}
	result
}

fn read_tokens<S: ByteSource>(r: &mut Reader<S>) -> Vec<(u64, Token)> {
	let mut result = Vec::new();
	loop {
		let tok = r.read_next().unwrap();
		let pos = r.token_pos();
		let eof = tok.is_eof();
		result.push((pos, tok));
		if eof {
			return result;
		}
	}
}

fn tokenize_with(doc: &[u8], opts: ReaderOptions) -> Vec<Token> {
	let mut r = Reader::with_options(Cursor::new(doc.to_vec()), opts).unwrap();
	read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect()
}

fn tokenize(doc: &[u8]) -> Vec<Token> {
	tokenize_with(doc, ReaderOptions::default())
}

fn example_tokens() -> Vec<Token> {
	vec![
		Token::PIStart { tag: b("xml") },
		Token::PIAttribute { tag: b("xml"), name: b("version"), value: b("1.0") },
		Token::TagStart { tag: b("foo") },
		Token::TagStart { tag: b("bar") },
		Token::TagAttribute { tag: b("bar"), name: b("zot"), value: b("zot") },
		Token::TagEnd { tag: b("bar") },
		Token::TagStart { tag: b("text") },
		Token::TagAttribute { tag: b("text"), name: b("id"), value: b("1") },
		Token::Text(b("\u{80}")),
		Token::TagEnd { tag: b("text") },
		Token::TagEnd { tag: b("foo") },
		Token::Eof,
	]
}

/// Hands out one byte per fill.
struct Dribble {
	inner: Cursor<Vec<u8>>,
}

impl ByteSource for Dribble {
	fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let n = buf.len().min(1);
		io::Read::read(&mut self.inner, &mut buf[..n])
	}

	fn seek_to(&mut self, offset: u64) -> io::Result<()> {
		self.inner.set_position(offset);
		Ok(())
	}
}

struct Broken;

impl ByteSource for Broken {
	fn fill(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
		Err(io::Error::new(io::ErrorKind::Other, "broken"))
	}

	fn seek_to(&mut self, _offset: u64) -> io::Result<()> {
		Err(io::Error::new(io::ErrorKind::Other, "broken"))
	}
}

#[test]
fn reader_tokenizes_utf8_document() {
	let mut r = Reader::new(Cursor::new(EXAMPLE_DOC.as_bytes())).unwrap();
	assert_eq!(r.encoding(), Encoding::Utf8);
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(tokens, example_tokens());
	assert!(r.declared_encoding().is_none());
}

#[test]
fn reader_tokenizes_utf16le_with_bom() {
	let mut doc = vec![0xff, 0xfe];
	doc.extend(utf16(EXAMPLE_DOC, true));
	let mut r = Reader::new(Cursor::new(doc)).unwrap();
	assert_eq!(r.encoding(), Encoding::Utf16Le);
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(tokens, example_tokens());
}

#[test]
fn reader_detects_utf16be_without_bom() {
	let doc = utf16(EXAMPLE_DOC, false);
	let mut r = Reader::new(Cursor::new(doc)).unwrap();
	assert_eq!(r.encoding(), Encoding::Utf16Be);
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(tokens, example_tokens());
}

#[test]
fn reader_skips_utf8_bom() {
	let mut doc = b"\xef\xbb\xbf".to_vec();
	doc.extend_from_slice(EXAMPLE_DOC.as_bytes());
	let mut r = Reader::new(Cursor::new(doc)).unwrap();
	let tokens = read_tokens(&mut r);
	assert_eq!(tokens[0], (3, Token::PIStart { tag: b("xml") }));
}

#[test]
fn reader_reports_token_offsets() {
	let mut r = Reader::new(Cursor::new(EXAMPLE_DOC.as_bytes())).unwrap();
	let starts: Vec<(u64, Token)> = read_tokens(&mut r)
		.into_iter()
		.filter(|(_, tok)| match tok {
			Token::TagStart { .. } | Token::Text(..) | Token::PIStart { .. } => true,
			_ => false,
		})
		.collect();
	let offsets: Vec<u64> = starts.iter().map(|(pos, _)| *pos).collect();
	assert_eq!(offsets, vec![0, 22, 27, 42, 53]);
	assert_eq!(&EXAMPLE_DOC[42..47], "<text");
}

#[test]
fn set_pos_replays_from_every_token() {
	let docs = vec![
		EXAMPLE_DOC.as_bytes().to_vec(),
		{
			let mut doc = vec![0xff, 0xfe];
			doc.extend(utf16(EXAMPLE_DOC, true));
			doc
		},
		b"<a x='1'>one &amp; two<![CDATA[<raw>]]><!-- c --><b/>tail</a>".to_vec(),
		b"<a/><?pi x='1'?><b>t</b>".to_vec(),
		b"<?xml version='1.0' encoding='utf-8'?><a>x</a>".to_vec(),
	];
	for doc in docs {
		let mut r = Reader::new(Cursor::new(doc)).unwrap();
		let all = read_tokens(&mut r);
		for (i, (pos, tok)) in all.iter().enumerate() {
			match tok {
				Token::TagStart { .. } | Token::PIStart { .. } | Token::Text(..) => (),
				_ => continue,
			}
			r.set_pos(*pos).unwrap();
			let replay = read_tokens(&mut r);
			let expected: Vec<&Token> = all[i..].iter().map(|(_, tok)| tok).collect();
			let got: Vec<&Token> = replay.iter().map(|(_, tok)| tok).collect();
			assert_eq!(got, expected, "replay from {}", pos);
			assert_eq!(replay[0].0, *pos);
		}
	}
}

#[test]
fn set_pos_after_eof() {
	let mut r = Reader::new(Cursor::new(&b"<a>x</a>"[..])).unwrap();
	assert_eq!(read_tokens(&mut r).len(), 4);
	r.set_pos(3).unwrap();
	assert_eq!(r.read_next().unwrap(), Token::Text(b("x")));
}

#[test]
fn set_pos_reports_seek_failures() {
	match Reader::new(Broken) {
		Err(Error::IO(_)) => (),
		other => panic!("unexpected result: {:?}", other.map(|_| ())),
	}

	let mut r = Reader::new(BadSeek(Cursor::new(&b"<a/>"[..]))).unwrap();
	assert_eq!(r.read_next().unwrap(), Token::TagStart { tag: b("a") });
	match r.set_pos(0) {
		Err(Error::Seek { offset: 0, .. }) => (),
		other => panic!("unexpected result: {:?}", other),
	}
}

struct BadSeek<T>(T);

impl<T: io::Read> ByteSource for BadSeek<T> {
	fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		io::Read::read(&mut self.0, buf)
	}

	fn seek_to(&mut self, _offset: u64) -> io::Result<()> {
		Err(io::Error::new(io::ErrorKind::Other, "no seeking"))
	}
}

#[test]
fn whitespace_between_tags() {
	let doc = b"<a>\n  <b/>\t</a>";
	let text = |ws: Whitespace| -> Vec<Token> {
		tokenize_with(doc, ReaderOptions::default().whitespace(ws))
			.into_iter()
			.filter(|tok| match tok {
				Token::Text(..) => true,
				_ => false,
			})
			.collect()
	};
	assert!(text(Whitespace::Trim).is_empty());
	assert_eq!(text(Whitespace::Single), vec![Token::Text(b(" ")), Token::Text(b(" "))]);
	assert_eq!(text(Whitespace::All), vec![Token::Text(b("\n  ")), Token::Text(b("\t"))]);
}

#[test]
fn tiny_buffers_give_identical_tokens() {
	let mut doc = String::from("<?xml version='1.0'?><root>");
	for i in 0..50 {
		doc.push_str(&format!("<item n='{}' label=\"ä€🎉\">text {} with ümläuts &amp; 🎉</item>", i, i));
	}
	doc.push_str("<![CDATA[]]]]><!-- done --></root>");
	let reference = tokenize(doc.as_bytes());
	let small = tokenize_with(doc.as_bytes(), ReaderOptions::default().buffer_size(1));
	assert_eq!(small, reference);

	let mut r = Reader::with_options(
		Dribble { inner: Cursor::new(doc.as_bytes().to_vec()) },
		ReaderOptions::default().buffer_size(32),
	)
	.unwrap();
	let dribbled: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(dribbled, reference);
	assert_eq!(reference[reference.len() - 4], Token::Text(b("]]")));
}

#[test]
fn malformed_bytes_survive_into_tokens() {
	let tokens = tokenize(b"<a v='\xff\xfe'>caf\xe9 \xc0\x80</a>");
	assert_eq!(
		tokens[1],
		Token::TagAttribute {
			tag: b("a"),
			name: b("v"),
			value: Bytes::from_static(b"\xff\xfe"),
		}
	);
	assert_eq!(tokens[2], Token::Text(Bytes::from_static(b"caf\xe9 \xc0\x80")));
}

#[test]
fn strict_options_replace_malformed_bytes() {
	let tokens = tokenize_with(b"<a>\xff</a>", ReaderOptions::default().utf8(Utf8Options::empty()));
	// the error character itself is written out
	assert_eq!(tokens[1], Token::Text(b("\u{efff}")));
}

#[test]
fn encoding_declaration_selects_registered_codepage() {
	let doc = b"<?xml version='1.0' encoding='Windows-1252'?><a>\x80\x81</a>";
	let mut r = Reader::with_options(Cursor::new(&doc[..]), ReaderOptions::default().codepages(&CODEPAGES)).unwrap();
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(r.encoding(), Encoding::Codepage(&WINDOWS_1252));
	assert_eq!(r.declared_encoding(), Some(&b("Windows-1252")));
	assert_eq!(tokens[4], Token::Text(Bytes::from_static(b"\xe2\x82\xac\x81")));
}

#[test]
fn utf8_declaration_keeps_utf8() {
	let doc = "<?xml encoding='UTF-8'?><a>ä</a>";
	let mut r = Reader::with_options(Cursor::new(doc.as_bytes()), ReaderOptions::default().codepages(&CODEPAGES)).unwrap();
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(r.encoding(), Encoding::Utf8);
	assert_eq!(r.declared_encoding(), Some(&b("UTF-8")));
	assert_eq!(tokens[3], Token::Text(b("ä")));
}

#[test]
fn unknown_encoding_declaration_falls_back_to_utf8() {
	let doc = b"<?xml encoding='koi8-r'?><a>\x80</a>";
	let mut r = Reader::with_options(Cursor::new(&doc[..]), ReaderOptions::default().codepages(&CODEPAGES)).unwrap();
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(r.encoding(), Encoding::Utf8);
	assert_eq!(tokens[3], Token::Text(Bytes::from_static(b"\x80")));

	// no registry: the declaration changes nothing
	let doc = b"<?xml encoding='iso-8859-1'?><a>\xe4</a>";
	let mut r = Reader::new(Cursor::new(&doc[..])).unwrap();
	read_tokens(&mut r);
	assert_eq!(r.encoding(), Encoding::Utf8);
}

#[test]
fn encoding_declaration_cannot_override_utf16() {
	let doc = utf16("<?xml encoding='iso-8859-1'?><a>ä</a>", true);
	let mut r = Reader::with_options(Cursor::new(doc), ReaderOptions::default().codepages(&CODEPAGES)).unwrap();
	let tokens: Vec<Token> = read_tokens(&mut r).into_iter().map(|(_, tok)| tok).collect();
	assert_eq!(r.encoding(), Encoding::Utf16Le);
	assert_eq!(r.declared_encoding(), Some(&b("iso-8859-1")));
	assert_eq!(tokens[3], Token::Text(b("ä")));
}

#[test]
fn mixed_document() {
	let tokens = tokenize(b"<!DOCTYPE html><html lang=en><body><p class=\"x\">a &lt; b</p><br></body></html>");
	assert_eq!(
		tokens,
		vec![
			Token::TagStart { tag: b("html") },
			Token::TagAttribute { tag: b("html"), name: b("lang"), value: b("en") },
			Token::TagStart { tag: b("body") },
			Token::TagStart { tag: b("p") },
			Token::TagAttribute { tag: b("p"), name: b("class"), value: b("x") },
			Token::Text(b("a < b")),
			Token::TagEnd { tag: b("p") },
			Token::TagStart { tag: b("br") },
			Token::TagEnd { tag: b("body") },
			Token::TagEnd { tag: b("html") },
			Token::Eof,
		]
	);
}

#[test]
fn into_inner_returns_source() {
	let r = Reader::new(Cursor::new(&b"<a/>"[..])).unwrap();
	let cursor = r.into_inner();
	assert_eq!(cursor.get_ref(), &&b"<a/>"[..]);
}

#[test]
fn transcode_then_tokenize() {
	let latin1 = b"<a>gr\xfc\xdfe</a>";
	let utf8 = transcode(latin1, Charset::Codepage(&ISO_8859_1), Charset::Utf8(Utf8Options::empty()));
	assert_eq!(tokenize(&utf8)[1], Token::Text(b("grüße")));
}
