/*!
# Lenient UTF-8 transcoding and streaming XML tokenizing

This crate handles text which does not always play by the rules: UTF-8
with overlong sequences, CESU-8 surrogate pairs, Java-style encoded NUL
bytes or plain garbage, and XML documents which are not quite well-formed.

## Features

* UTF-8 encoder and decoder for sequences of up to seven bytes
* Opt-in leniency via [`Utf8Options`]: encoded zero, CESU-8 surrogates,
  non-minimal forms, non-characters
* Lossless error escapes: each byte which cannot be decoded becomes a
  character in `U+EF80..=U+EFFF` and is written back as the same byte
* Character position helpers for UTF-8 text
* Single-byte codepages ([`ISO_8859_1`], [`WINDOWS_1252`]) behind the same
  [`Charset`] interface
* A pull-based XML tokenizer with encoding detection (UTF-8 and UTF-16 with
  or without byte order mark) and seek/resume by byte offset

## Example

```
use std::io::Cursor;
use utfxml::{Reader, Token};

let doc = b"<hello who='world'>Hi!</hello>";
let mut reader = Reader::new(Cursor::new(&doc[..])).unwrap();
let mut names = Vec::new();
reader.read_all(|tok| names.push(tok.name())).unwrap();
assert_eq!(names, ["TagStart", "TagAttribute", "Text", "TagEnd"]);
```

## Decoding with error escapes

```
use utfxml::{decode, encoded, Utf8Options};

let src = b"caf\xe9";
let chars = decode(src, Utf8Options::ALLOW_ERROR_ESCAPES);
assert_eq!(chars.len(), 4);
assert!(utfxml::unichar::is_error(chars[3]));
assert_eq!(encoded(&chars, Utf8Options::ALLOW_ERROR_ESCAPES), src);
```
*/
pub mod charset;
pub mod error;
pub mod reader;
pub mod unichar;
pub mod utf8;

#[cfg(test)]
mod tests;

pub use charset::{transcode, Charset, Codepage, ISO_8859_1, WINDOWS_1252};
pub use error::{Error, Result};
pub use reader::{
	ByteSource, EntityHandler, Encoding, Reader, ReaderOptions, StandardEntities, Token, Whitespace,
};
pub use unichar::Unichar;
pub use utf8::{decode, encode_into, encoded, Utf8Options, Utf8Reader};

/// Package version
pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
