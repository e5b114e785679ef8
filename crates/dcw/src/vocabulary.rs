use core::str::FromStr;

use crate::{Error, Result};

const DECIMALS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

const HEX: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

const BASE36: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

const BASE64: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j',
    'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1',
    '2', '3', '4', '5', '6', '7', '8', '9', '+', '/',
];

/// The symbol sets a generator can draw candidates from.
///
/// The built-in sets are listed in their conventional order. Generators sort
/// every vocabulary before use, so the order here never affects which index a
/// symbol ends up at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// `0-9`
    Decimals,
    /// `0-9a-f`
    Hex,
    /// `A-Z0-9`
    Base36,
    /// The standard base64 alphabet, `A-Za-z0-9+/`
    Base64,
    /// Caller-supplied symbols. Has no built-in set.
    Custom,
}

impl Vocabulary {
    /// Returns the built-in symbol set.
    ///
    /// # Errors
    /// - [`Error::CustomVocabularyNotSupported`] for [`Vocabulary::Custom`]
    pub fn symbols(self) -> Result<&'static [char]> {
        match self {
            Self::Decimals => Ok(DECIMALS),
            Self::Hex => Ok(HEX),
            Self::Base36 => Ok(BASE36),
            Self::Base64 => Ok(BASE64),
            Self::Custom => Err(Error::CustomVocabularyNotSupported),
        }
    }
}

impl FromStr for Vocabulary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "decimal" | "decimals" => Ok(Self::Decimals),
            "hex" => Ok(Self::Hex),
            "base36" => Ok(Self::Base36),
            "base64" => Ok(Self::Base64),
            "custom" => Ok(Self::Custom),
            _ => Err(Error::UnknownVocabulary { name: s.to_owned() }),
        }
    }
}
