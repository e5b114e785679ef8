use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of characters a UUID holds once the hyphens are removed.
pub const UUID_HEX_LEN: usize = 32;

/// Hyphen-separated group widths of a canonical UUID.
const UUID_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// A function rendering a fully populated candidate buffer.
pub type FormatFn = fn(&[char]) -> Result<String>;

/// How a candidate buffer is rendered into the string handed to callers.
///
/// The discriminants are stable: checkpoints store a formatter as its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Formatter {
    /// The characters verbatim.
    Simple = 0,
    /// The characters as UUID hex digits, hyphenated `8-4-4-4-12`.
    Uuid4 = 1,
}

impl Formatter {
    /// Returns the rendering function for this formatter.
    pub const fn as_fn(self) -> FormatFn {
        match self {
            Self::Simple => format_simple,
            Self::Uuid4 => format_uuid4,
        }
    }

    /// Renders `buf` with this formatter.
    ///
    /// # Errors
    /// - [`Error::InvalidUuidLength`] if `self` is [`Formatter::Uuid4`] and
    ///   `buf` does not hold exactly [`UUID_HEX_LEN`] characters
    pub fn format(self, buf: &[char]) -> Result<String> {
        (self.as_fn())(buf)
    }
}

impl TryFrom<u8> for Formatter {
    type Error = Error;

    fn try_from(ordinal: u8) -> Result<Self> {
        match ordinal {
            0 => Ok(Self::Simple),
            1 => Ok(Self::Uuid4),
            _ => Err(Error::UnsupportedFormatter {
                selector: ordinal.to_string(),
            }),
        }
    }
}

impl From<Formatter> for u8 {
    fn from(formatter: Formatter) -> Self {
        formatter as Self
    }
}

impl FromStr for Formatter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "uuid" | "uuid4" => Ok(Self::Uuid4),
            _ => Err(Error::UnsupportedFormatter {
                selector: s.to_owned(),
            }),
        }
    }
}

fn format_simple(buf: &[char]) -> Result<String> {
    Ok(buf.iter().collect())
}

fn format_uuid4(buf: &[char]) -> Result<String> {
    if buf.len() != UUID_HEX_LEN {
        return Err(Error::InvalidUuidLength { len: buf.len() });
    }
    let mut out = String::with_capacity(UUID_HEX_LEN + UUID_GROUPS.len() - 1);
    let mut start = 0;
    for (i, width) in UUID_GROUPS.iter().enumerate() {
        if i > 0 {
            out.push('-');
        }
        out.extend(&buf[start..start + width]);
        start += width;
    }
    Ok(out)
}
