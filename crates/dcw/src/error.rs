use core::fmt;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `dcw` can produce.
///
/// Construction errors are reported synchronously and prevent a generator
/// from being built. [`Error::SpaceExhausted`] is terminal for a generator:
/// the only way forward is a new generator over a different space.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested output length was zero.
    InvalidOutputLength,

    /// The vocabulary had no symbols.
    InvalidVocabularyLength,

    /// The formatter selector did not name a known formatter.
    UnsupportedFormatter {
        /// The selector as it was supplied (an ordinal or a name).
        selector: String,
    },

    /// The vocabulary name did not match any known vocabulary.
    UnknownVocabulary {
        /// The name as it was supplied.
        name: String,
    },

    /// [`Vocabulary::Custom`] has no built-in symbol set; supply the symbols
    /// explicitly instead.
    ///
    /// [`Vocabulary::Custom`]: crate::Vocabulary::Custom
    CustomVocabularyNotSupported,

    /// A batch of zero candidates was requested.
    InvalidBatchSize,

    /// Every candidate in the space has already been handed out.
    SpaceExhausted,

    /// A UUID-shaped candidate needs exactly 32 characters.
    InvalidUuidLength {
        /// The length of the rejected buffer.
        len: usize,
    },

    /// A checkpoint holds a different number of positions than its output
    /// length.
    InvalidPositions {
        /// The output length of the checkpoint.
        expected: usize,
        /// The number of positions it holds.
        found: usize,
    },

    /// A checkpoint could not be serialized or deserialized.
    Serialization(serde_json::Error),

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, locks do **not** poison, so this
    /// variant is never constructed.
    LockPoisoned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOutputLength => write!(f, "output length must be greater than zero"),
            Self::InvalidVocabularyLength => write!(f, "vocabulary must not be empty"),
            Self::UnsupportedFormatter { selector } => {
                write!(f, "unsupported formatter: {selector}")
            }
            Self::UnknownVocabulary { name } => write!(f, "unknown vocabulary: {name}"),
            Self::CustomVocabularyNotSupported => {
                write!(f, "custom vocabulary has no built-in symbol set")
            }
            Self::InvalidBatchSize => write!(f, "batch size must be greater than zero"),
            Self::SpaceExhausted => write!(f, "candidate space exhausted"),
            Self::InvalidUuidLength { len } => {
                write!(f, "uuid formatter expects 32 characters, got {len}")
            }
            Self::InvalidPositions { expected, found } => {
                write!(f, "checkpoint holds {found} positions, expected {expected}")
            }
            Self::Serialization(e) => write!(f, "checkpoint serialization failed: {e}"),
            Self::LockPoisoned => write!(f, "generator lock poisoned"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{PoisonError, RwLockReadGuard, RwLockWriteGuard};

// Convert all poisoned lock errors to a simplified `LockPoisoned`
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<RwLockReadGuard<'_, T>>> for Error {
    fn from(_: PoisonError<RwLockReadGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<RwLockWriteGuard<'_, T>>> for Error {
    fn from(_: PoisonError<RwLockWriteGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
