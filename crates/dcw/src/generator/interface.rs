use crate::Result;

/// A minimal interface for handing out batches of candidates
pub trait CandidateGenerator {
    /// Returns the next `batch_size` candidates and advances the checkpoint
    /// past them.
    fn try_next_batch(&self, batch_size: usize) -> Result<Vec<String>>;

    /// Returns the serialized checkpoint, suitable for resuming later.
    fn current_state(&self) -> Result<Vec<u8>>;
}
