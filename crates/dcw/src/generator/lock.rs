use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    CandidateGenerator, Config, Formatter, Result, State, Vocabulary,
    generator::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// A lock-based candidate generator suitable for multi-threaded environments.
///
/// The checkpoint lives behind an [`Arc<RwLock<_>>`]. Advancing the position
/// counter takes the write lock for the whole read-modify-write, so two
/// concurrent callers can never be handed overlapping batches. Serializing the
/// checkpoint only takes the read lock. Expanding a batch into strings happens
/// after the lock is released, against an immutable copy of the [`Config`].
///
/// Cloning the generator yields another handle to the *same* checkpoint.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Resumable from a serialized checkpoint
///
/// ## Recommended When
/// - A controller hands batches to workers while another thread persists
///   progress
/// - The candidate space is too large to enumerate in one process lifetime
#[derive(Clone, Debug)]
pub struct LockCandidateGenerator {
    pub(crate) state: Arc<RwLock<State>>,
    pub(crate) config: Arc<Config>,
}

impl LockCandidateGenerator {
    /// Creates a generator over one of the built-in vocabularies.
    ///
    /// # Errors
    /// - [`Error::CustomVocabularyNotSupported`] if `vocabulary` is
    ///   [`Vocabulary::Custom`]; use [`Self::for_custom`] instead
    /// - [`Error::InvalidOutputLength`] if `output_length` is zero
    ///
    /// # Example
    /// ```
    /// use dcw::{Formatter, LockCandidateGenerator, Vocabulary};
    ///
    /// let generator = LockCandidateGenerator::for_standard(Vocabulary::Hex, 2, Formatter::Simple)?;
    /// assert_eq!(generator.try_next_batch(3)?, ["00", "01", "02"]);
    /// # Ok::<(), dcw::Error>(())
    /// ```
    ///
    /// [`Error::CustomVocabularyNotSupported`]: crate::Error::CustomVocabularyNotSupported
    /// [`Error::InvalidOutputLength`]: crate::Error::InvalidOutputLength
    pub fn for_standard(
        vocabulary: Vocabulary,
        output_length: usize,
        formatter: Formatter,
    ) -> Result<Self> {
        Self::for_custom(output_length, vocabulary.symbols()?, formatter)
    }

    /// Creates a generator over caller-supplied symbols.
    ///
    /// The symbols are sorted so the candidate order does not depend on the
    /// order they were passed in.
    ///
    /// # Errors
    /// - [`Error::InvalidOutputLength`] if `output_length` is zero
    /// - [`Error::InvalidVocabularyLength`] if `vocabulary` is empty
    ///
    /// [`Error::InvalidOutputLength`]: crate::Error::InvalidOutputLength
    /// [`Error::InvalidVocabularyLength`]: crate::Error::InvalidVocabularyLength
    pub fn for_custom(
        output_length: usize,
        vocabulary: &[char],
        formatter: Formatter,
    ) -> Result<Self> {
        let config = Config::new(vocabulary, output_length, formatter)?;
        Ok(Self::from_state(State::new(config)))
    }

    /// Wraps an existing checkpoint without validating it.
    pub fn from_state(state: State) -> Self {
        let config = Arc::new(state.config.clone());
        Self {
            state: Arc::new(RwLock::new(state)),
            config,
        }
    }

    /// Rebuilds a generator from the bytes returned by
    /// [`Self::current_state`]. The checkpoint is trusted: only its shape is
    /// checked (see [`State::validate`]), not its business invariants.
    ///
    /// # Errors
    /// - [`Error::Serialization`] if `checkpoint` is not a valid checkpoint
    ///   document
    /// - [`Error::InvalidVocabularyLength`], [`Error::InvalidOutputLength`] or
    ///   [`Error::InvalidPositions`] if the document cannot be walked
    ///
    /// [`Error::Serialization`]: crate::Error::Serialization
    /// [`Error::InvalidVocabularyLength`]: crate::Error::InvalidVocabularyLength
    /// [`Error::InvalidOutputLength`]: crate::Error::InvalidOutputLength
    /// [`Error::InvalidPositions`]: crate::Error::InvalidPositions
    pub fn resume(checkpoint: &[u8]) -> Result<Self> {
        let state: State = serde_json::from_slice(checkpoint)?;
        state.validate()?;
        Ok(Self::from_state(state))
    }

    /// The configuration this generator enumerates.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the next `batch_size` candidates in lexicographic order and
    /// advances the checkpoint past them.
    ///
    /// The batch that exhausts the space is still returned, holding only the
    /// candidates that were left. Every call after that fails.
    ///
    /// # Errors
    /// - [`Error::SpaceExhausted`] once every candidate has been handed out
    /// - [`Error::InvalidBatchSize`] if `batch_size` is zero
    /// - [`Error::InvalidUuidLength`] if the formatter rejects a candidate;
    ///   the checkpoint has already advanced past the whole batch
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (only without `parking-lot`)
    ///
    /// [`Error::SpaceExhausted`]: crate::Error::SpaceExhausted
    /// [`Error::InvalidBatchSize`]: crate::Error::InvalidBatchSize
    /// [`Error::InvalidUuidLength`]: crate::Error::InvalidUuidLength
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_batch(&self, batch_size: usize) -> Result<Vec<String>> {
        let window = self.advance(batch_size)?;
        self.config.expand(&window, batch_size)
    }

    /// Serializes the checkpoint under the read lock.
    ///
    /// The returned bytes are an independent snapshot; later batches do not
    /// change them.
    ///
    /// # Errors
    /// - [`Error::Serialization`] if the checkpoint cannot be encoded
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (only without `parking-lot`)
    ///
    /// [`Error::Serialization`]: crate::Error::Serialization
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    pub fn current_state(&self) -> Result<Vec<u8>> {
        let state = self.read()?;
        Ok(serde_json::to_vec(&*state)?)
    }

    /// Returns a copy of the checkpoint.
    ///
    /// # Errors
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (only without `parking-lot`)
    ///
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    pub fn state(&self) -> Result<State> {
        Ok(self.read()?.clone())
    }

    /// Whether the whole space has been handed out.
    ///
    /// # Errors
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (only without `parking-lot`)
    ///
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    pub fn is_done(&self) -> Result<bool> {
        Ok(self.read()?.done)
    }

    /// Advances the checkpoint by `batch_size` and returns the window the
    /// batch starts at. The guard is scoped to this call, so every exit path
    /// releases it.
    pub(crate) fn advance(&self, batch_size: usize) -> Result<Vec<usize>> {
        let mut state = self.write()?;
        state.advance(batch_size)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.read())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.read()?)
        }
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.write())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.write()?)
        }
    }
}

impl CandidateGenerator for LockCandidateGenerator {
    fn try_next_batch(&self, batch_size: usize) -> Result<Vec<String>> {
        self.try_next_batch(batch_size)
    }

    fn current_state(&self) -> Result<Vec<u8>> {
        self.current_state()
    }
}
