use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The input is not well-formed XML, or the root element is not <rfc>.
    InvalidXml(String),
    /// The tree is structurally inconsistent (e.g. a table with no columns);
    /// the render is aborted, not patched up.
    Layout(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "i/o error: {e}"),
            Error::InvalidXml(msg) => write!(f, "invalid XML input: {msg}"),
            Error::Layout(msg) => write!(f, "layout error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
