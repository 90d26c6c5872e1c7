use crate::unichar::Unichar;

pub trait CharSelect {
	fn select(&self, c: Unichar) -> bool;
}

impl CharSelect for u8 {
	#[inline]
	fn select(&self, c: Unichar) -> bool {
		c == *self as Unichar
	}
}

impl CharSelect for Unichar {
	#[inline]
	fn select(&self, c: Unichar) -> bool {
		c == *self
	}
}

/// A slice of ASCII delimiters. Non-ASCII characters never match.
impl CharSelect for &'_ [u8] {
	#[inline]
	fn select(&self, c: Unichar) -> bool {
		c < 0x80 && self.contains(&(c as u8))
	}
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Endpoint {
	Eof,
	Delimiter(Unichar),
}

pub const LT: Unichar = b'<' as Unichar;
pub const GT: Unichar = b'>' as Unichar;
pub const SLASH: Unichar = b'/' as Unichar;
pub const QUESTION: Unichar = b'?' as Unichar;
pub const BANG: Unichar = b'!' as Unichar;
pub const DASH: Unichar = b'-' as Unichar;
pub const EQ: Unichar = b'=' as Unichar;
pub const LBRACKET: Unichar = b'[' as Unichar;
pub const RBRACKET: Unichar = b']' as Unichar;
pub const DQUOTE: Unichar = b'"' as Unichar;
pub const SQUOTE: Unichar = b'\'' as Unichar;

/// XML whitespace
pub static CLASS_XML_SPACE: &'static [u8] = b" \t\r\n";

pub static DELIM_TAG_NAME: &'static [u8] = b" \t\r\n>/";
pub static DELIM_END_TAG_NAME: &'static [u8] = b" \t\r\n>";
pub static DELIM_PI_NAME: &'static [u8] = b" \t\r\n?>";
pub static DELIM_ATTR_NAME: &'static [u8] = b" \t\r\n=>/";
pub static DELIM_ATTR_VALUE: &'static [u8] = b" \t\r\n>";
pub static DELIM_PI_ATTR_NAME: &'static [u8] = b" \t\r\n=?>";
pub static DELIM_PI_ATTR_VALUE: &'static [u8] = b" \t\r\n?>";

#[inline]
pub fn is_space(c: Unichar) -> bool {
	CLASS_XML_SPACE.select(c)
}
