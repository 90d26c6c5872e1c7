/*!
# Error types

Malformed input is never an error in this crate: the decoders produce
error characters and the tokenizer skips or ends at broken markup. What is
left are failures of the byte source the [`Reader`](crate::Reader) pulls
from.
*/
use std::error;
use std::fmt;
use std::io;
use std::result::Result as StdResult;

#[derive(Debug)]
pub enum Error {
	/// Reading from the byte source failed.
	IO(io::Error),
	/// Repositioning the byte source failed.
	Seek {
		offset: u64,
		err: io::Error,
	},
}

pub type Result<T> = StdResult<T, Error>;

impl Error {
	pub fn io(e: io::Error) -> Error {
		Error::IO(e)
	}

	pub(crate) fn seek(offset: u64, err: io::Error) -> Error {
		Error::Seek { offset, err }
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Error {
		Error::io(e)
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::IO(e) => write!(f, "I/O error: {}", e),
			Error::Seek { offset, err } => write!(f, "failed to seek to byte {}: {}", offset, err),
		}
	}
}

impl error::Error for Error {
	fn source(&self) -> Option<&(dyn error::Error + 'static)> {
		match self {
			Error::IO(e) => Some(e),
			Error::Seek { err, .. } => Some(err),
		}
	}
}
