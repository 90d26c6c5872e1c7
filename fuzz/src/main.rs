#[macro_use]
extern crate afl;
extern crate utfxml;

use std::io::Cursor;

use utfxml::utf8::{self, Utf8Options};
use utfxml::{Reader, ReaderOptions, Token};

fn check_tokenizer(data: &[u8]) {
	let opts = ReaderOptions::default().buffer_size(32);
	let mut reader = match Reader::with_options(Cursor::new(data), opts) {
		Ok(r) => r,
		Err(e) => panic!("reading from memory failed: {}", e),
	};
	let mut tokens = Vec::new();
	// every token consumes input, so there cannot be more tokens than bytes
	for _ in 0..=data.len() + 1 {
		let tok = reader.read_next().unwrap();
		let pos = reader.token_pos();
		let eof = tok.is_eof();
		tokens.push((pos, tok));
		if eof {
			break;
		}
	}
	assert!(tokens.last().map(|(_, tok)| tok.is_eof()).unwrap_or(false));

	for (i, (pos, tok)) in tokens.iter().enumerate() {
		match tok {
			Token::TagStart { .. } | Token::PIStart { .. } | Token::Text(..) => (),
			_ => continue,
		}
		reader.set_pos(*pos).unwrap();
		assert_eq!(&reader.read_next().unwrap(), tok);
		if let Some((_, next)) = tokens.get(i + 1) {
			assert_eq!(&reader.read_next().unwrap(), next);
		}
	}
}

fn check_escapes(data: &[u8]) {
	let opts = Utf8Options::ALLOW_ERROR_ESCAPES;
	let chars = utf8::decode(data, opts);
	assert_eq!(chars.len(), utf8::length(data, opts));
	assert_eq!(utf8::encoded(&chars, opts), data);
}

fn main() {
	fuzz!(|data: &[u8]| {
		check_escapes(data);
		check_tokenizer(data);
	});
}
