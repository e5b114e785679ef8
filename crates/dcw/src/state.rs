use serde::{Deserialize, Serialize};

use crate::{Error, Formatter, Result};

/// Upper bound on the candidates reserved up front by a batch expansion.
/// Larger batches grow the output as they fill.
const MAX_PREALLOCATED: usize = 1 << 16;

/// The immutable description of a candidate space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Symbols usable at every position, sorted ascending.
    pub vocabulary: Vec<char>,
    /// Number of characters in every candidate.
    pub output_length: usize,
    /// How a candidate buffer is rendered.
    pub formatter: Formatter,
}

impl Config {
    /// Validates the parts of a fresh configuration and sorts the vocabulary.
    ///
    /// # Errors
    /// - [`Error::InvalidOutputLength`] if `output_length` is zero
    /// - [`Error::InvalidVocabularyLength`] if `vocabulary` is empty
    pub fn new(vocabulary: &[char], output_length: usize, formatter: Formatter) -> Result<Self> {
        if output_length == 0 {
            return Err(Error::InvalidOutputLength);
        }
        if vocabulary.is_empty() {
            return Err(Error::InvalidVocabularyLength);
        }
        let mut vocabulary = vocabulary.to_vec();
        vocabulary.sort_unstable();
        Ok(Self {
            vocabulary,
            output_length,
            formatter,
        })
    }

    /// The radix shared by every digit of the position counter.
    pub fn radix(&self) -> usize {
        self.vocabulary.len()
    }

    /// Total number of candidates in the space, or `None` if it does not fit
    /// in a `u128`.
    pub fn space_size(&self) -> Option<u128> {
        let radix = u128::try_from(self.radix()).ok()?;
        let exp = u32::try_from(self.output_length).ok()?;
        radix.checked_pow(exp)
    }

    /// Number of candidates from `window` to the end of the space, saturating
    /// at `usize::MAX`.
    fn remaining(&self, window: &[usize]) -> usize {
        let radix = self.radix() as u128;
        let Some(size) = self.space_size() else {
            return usize::MAX;
        };
        let offset = window.iter().try_fold(0u128, |acc, &digit| {
            acc.checked_mul(radix)?.checked_add(digit as u128)
        });
        match offset {
            Some(offset) => usize::try_from(size.saturating_sub(offset)).unwrap_or(usize::MAX),
            None => 0,
        }
    }

    /// Expands up to `limit` candidates starting at `window`, in the same
    /// odometer order the position counter advances in.
    ///
    /// The walk descends exactly `output_length` levels. It stops as soon as
    /// `limit` candidates are produced or the space runs out, whichever comes
    /// first. A formatter failure aborts the walk.
    pub(crate) fn expand(&self, window: &[usize], limit: usize) -> Result<Vec<String>> {
        let mut walk = Walk {
            config: self,
            format: self.formatter.as_fn(),
            cursor: window.to_vec(),
            buf: vec!['\0'; self.output_length],
            out: Vec::with_capacity(limit.min(self.remaining(window)).min(MAX_PREALLOCATED)),
            limit,
        };
        walk.descend(0)?;
        Ok(walk.out)
    }
}

struct Walk<'a> {
    config: &'a Config,
    format: crate::FormatFn,
    cursor: Vec<usize>,
    buf: Vec<char>,
    out: Vec<String>,
    limit: usize,
}

impl Walk<'_> {
    /// Returns `Ok(true)` once the batch is full.
    fn descend(&mut self, depth: usize) -> Result<bool> {
        if self.out.len() == self.limit {
            return Ok(true);
        }
        if depth == self.buf.len() {
            self.out.push((self.format)(&self.buf)?);
            return Ok(self.out.len() == self.limit);
        }

        let start = self.cursor[depth];
        for i in start..self.config.radix() {
            self.buf[depth] = self.config.vocabulary[i];
            if self.descend(depth + 1)? {
                return Ok(true);
            }
        }
        // Later siblings of the parent start this level from the first symbol.
        self.cursor[depth] = 0;
        Ok(false)
    }
}

/// A resumable checkpoint: the configuration, how far through the space the
/// generator is, and whether the space is exhausted.
///
/// `current_positions` is a big-endian mixed-radix number: element `0` is the
/// most significant digit and every digit has radix `config.vocabulary.len()`.
/// It counts the candidates already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub config: Config,
    pub current_positions: Vec<usize>,
    pub done: bool,
}

impl State {
    /// Creates a state positioned at the first candidate of `config`.
    pub fn new(config: Config) -> Self {
        let current_positions = vec![0; config.output_length];
        Self {
            config,
            current_positions,
            done: false,
        }
    }

    /// Checks that a deserialized checkpoint has a shape the generator can
    /// walk: a non-empty vocabulary, a positive length and one position per
    /// output character.
    ///
    /// # Errors
    /// - [`Error::InvalidVocabularyLength`] if the vocabulary is empty
    /// - [`Error::InvalidOutputLength`] if the output length is zero
    /// - [`Error::InvalidPositions`] if the position count differs from the
    ///   output length
    pub fn validate(&self) -> Result<()> {
        if self.config.vocabulary.is_empty() {
            return Err(Error::InvalidVocabularyLength);
        }
        if self.config.output_length == 0 {
            return Err(Error::InvalidOutputLength);
        }
        if self.current_positions.len() != self.config.output_length {
            return Err(Error::InvalidPositions {
                expected: self.config.output_length,
                found: self.current_positions.len(),
            });
        }
        Ok(())
    }

    /// Advances the position counter by `batch_size` and returns the
    /// positions it held before, which mark the start of the batch.
    ///
    /// The addition carries from the least significant digit upward. A carry
    /// out of the most significant digit means the space had no room for the
    /// whole batch; the state is then marked done and the counter wraps.
    ///
    /// # Errors
    /// - [`Error::SpaceExhausted`] if the state is already done. Nothing is
    ///   mutated.
    /// - [`Error::InvalidBatchSize`] if `batch_size` is zero
    pub(crate) fn advance(&mut self, batch_size: usize) -> Result<Vec<usize>> {
        if self.done {
            return Err(Error::SpaceExhausted);
        }
        if batch_size == 0 {
            return Err(Error::InvalidBatchSize);
        }

        let radix = self.config.radix();
        let previous = self.current_positions.clone();

        let mut carry = batch_size;
        for digit in self.current_positions.iter_mut().rev() {
            if carry == 0 {
                break;
            }
            // A resumed digit may sit at `radix`, the rolled-over sentinel;
            // the division folds it into the carry.
            let sum = *digit + carry % radix;
            carry = carry / radix + sum / radix;
            *digit = sum % radix;
        }

        if carry > 0 {
            self.done = true;
        }
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(output_length: usize) -> Config {
        Config::new(
            &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'],
            output_length,
            Formatter::Simple,
        )
        .unwrap()
    }

    #[test]
    fn remaining_counts_to_end_of_space() {
        let config = decimal(3);
        assert_eq!(config.remaining(&[0, 0, 0]), 1000);
        assert_eq!(config.remaining(&[9, 9, 5]), 5);
        // Rolled-over sentinel digit past the end.
        assert_eq!(config.remaining(&[10, 0, 0]), 0);
    }

    #[test]
    fn remaining_saturates_for_huge_spaces() {
        let config = Config::new(&['a', 'b'], 200, Formatter::Simple).unwrap();
        assert_eq!(config.remaining(&[0; 200]), usize::MAX);
    }

    #[test]
    fn validate_checks_checkpoint_shape() {
        let mut state = State::new(decimal(3));
        assert!(state.validate().is_ok());

        state.current_positions.pop();
        assert!(matches!(
            state.validate(),
            Err(Error::InvalidPositions {
                expected: 3,
                found: 2
            })
        ));

        let mut state = State::new(decimal(3));
        state.config.vocabulary.clear();
        assert!(matches!(
            state.validate(),
            Err(Error::InvalidVocabularyLength)
        ));
    }

    #[test]
    fn config_sorts_vocabulary() {
        let config = Config::new(&['z', 'a', 'm'], 2, Formatter::Simple).unwrap();
        assert_eq!(config.vocabulary, ['a', 'm', 'z']);
    }

    #[test]
    fn config_rejects_bad_input() {
        assert!(matches!(
            Config::new(&['a'], 0, Formatter::Simple),
            Err(Error::InvalidOutputLength)
        ));
        assert!(matches!(
            Config::new(&[], 3, Formatter::Simple),
            Err(Error::InvalidVocabularyLength)
        ));
    }

    #[test]
    fn space_size_is_radix_to_the_length() {
        assert_eq!(decimal(3).space_size(), Some(1000));
        assert_eq!(decimal(38).space_size(), Some(10u128.pow(38)));
        assert_eq!(decimal(39).space_size(), None);
    }

    #[test]
    fn advance_carries_through_every_digit() {
        let mut state = State::new(decimal(4));
        state.current_positions = vec![0, 9, 9, 9];
        let previous = state.advance(1).unwrap();
        assert_eq!(previous, [0, 9, 9, 9]);
        assert_eq!(state.current_positions, [1, 0, 0, 0]);
        assert!(!state.done);
    }

    #[test]
    fn advance_folds_rolled_over_digit() {
        let mut state = State::new(decimal(3));
        state.current_positions = vec![0, 0, 10];
        state.advance(5).unwrap();
        assert_eq!(state.current_positions, [0, 1, 5]);
    }

    #[test]
    fn advance_marks_done_on_exact_fill() {
        let mut state = State::new(decimal(2));
        state.advance(99).unwrap();
        assert!(!state.done);
        assert_eq!(state.current_positions, [9, 9]);
        state.advance(1).unwrap();
        assert!(state.done);
    }

    #[test]
    fn advance_with_single_symbol_vocabulary() {
        let config = Config::new(&['x'], 3, Formatter::Simple).unwrap();
        let mut state = State::new(config);
        state.advance(1).unwrap();
        assert!(state.done);
    }

    #[test]
    fn expand_walks_in_odometer_order() {
        let config = decimal(2);
        let batch = config.expand(&[0, 8], 4).unwrap();
        assert_eq!(batch, ["08", "09", "10", "11"]);
    }

    #[test]
    fn expand_stops_at_end_of_space() {
        let config = decimal(2);
        let batch = config.expand(&[9, 7], 10).unwrap();
        assert_eq!(batch, ["97", "98", "99"]);
    }

    #[test]
    fn expand_depth_is_output_length() {
        // Output length larger than the vocabulary must not run past the
        // buffer.
        let config = Config::new(&['b', 'a'], 5, Formatter::Simple).unwrap();
        let batch = config.expand(&[0, 0, 0, 0, 0], 32).unwrap();
        assert_eq!(batch.len(), 32);
        assert_eq!(batch.first().map(String::as_str), Some("aaaaa"));
        assert_eq!(batch.last().map(String::as_str), Some("bbbbb"));
        assert!(batch.iter().all(|c| c.len() == 5));
    }

    #[test]
    fn expand_propagates_formatter_errors() {
        let config = Config::new(&['0', '1'], 4, Formatter::Uuid4).unwrap();
        assert!(matches!(
            config.expand(&[0, 0, 0, 0], 2),
            Err(Error::InvalidUuidLength { len: 4 })
        ));
    }

    #[test]
    fn serialized_field_names() {
        let state = State::new(Config::new(&['1', '0'], 2, Formatter::Uuid4).unwrap());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "config": {
                    "vocabulary": ["0", "1"],
                    "outputLength": 2,
                    "formatter": 1
                },
                "currentPositions": [0, 0],
                "done": false
            })
        );
    }
}
