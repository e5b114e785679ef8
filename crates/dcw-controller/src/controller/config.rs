use core::time::Duration;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use dcw::{Formatter, Vocabulary};
use dcw_dispatch::{ClientConfig, DEFAULT_MAX_FRAME_LENGTH, Generator};

/// Runtime configuration for the `dcw-controller` binary.
///
/// Every option can be given on the command line or through the environment
/// (a `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dcw-controller",
    version,
    about = "Walks a candidate space in batches and ships every batch to a worker"
)]
pub struct CliArgs {
    /// Built-in vocabulary: `decimal`, `hex`, `base36`, `base64`, or `custom`.
    ///
    /// Environment variable: `VOCABULARY`
    #[arg(long, env = "VOCABULARY", default_value_t = String::from("decimal"))]
    pub vocabulary: String,

    /// Symbols of the custom vocabulary, one character each. Required when
    /// `VOCABULARY=custom` and rejected otherwise.
    ///
    /// Environment variable: `CUSTOM_VOCABULARY`
    #[arg(long, env = "CUSTOM_VOCABULARY")]
    pub custom_vocabulary: Option<String>,

    /// Number of characters in every candidate.
    ///
    /// Environment variable: `OUTPUT_LENGTH`
    #[arg(long, env = "OUTPUT_LENGTH", default_value_t = 8)]
    pub output_length: usize,

    /// How candidates are rendered: `simple` or `uuid4`.
    ///
    /// Environment variable: `FORMATTER`
    #[arg(long, env = "FORMATTER", default_value_t = String::from("simple"))]
    pub formatter: String,

    /// Candidates generated and shipped per batch.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = 1000)]
    pub batch_size: usize,

    /// File the generator checkpoint is read from and written to.
    ///
    /// Environment variable: `CHECKPOINT_PATH`
    #[arg(long, env = "CHECKPOINT_PATH", default_value = "dcw_checkpoint.json")]
    pub checkpoint_path: PathBuf,

    /// Persist the checkpoint after this many acknowledged batches.
    ///
    /// Environment variable: `CHECKPOINT_EVERY`
    #[arg(long, env = "CHECKPOINT_EVERY", default_value_t = 1)]
    pub checkpoint_every: u64,

    /// Environment variable: `WORKER_HOST`
    #[arg(long, env = "WORKER_HOST", default_value_t = String::from("127.0.0.1"))]
    pub worker_host: String,

    /// Environment variable: `WORKER_PORT`
    #[arg(long, env = "WORKER_PORT", default_value_t = 5555)]
    pub worker_port: u16,

    /// Identifies this controller to the worker.
    ///
    /// Environment variable: `CLIENT_ID`
    #[arg(long, env = "CLIENT_ID", default_value_t = String::from("controller"))]
    pub client_id: String,

    /// Connection attempts before giving up, including the first.
    ///
    /// Environment variable: `MAX_CONNECT_ATTEMPTS`
    #[arg(long, env = "MAX_CONNECT_ATTEMPTS", default_value_t = 5)]
    pub max_connect_attempts: u32,

    /// Pause between connection attempts, in milliseconds.
    ///
    /// Environment variable: `CONNECT_RETRY_DELAY_MS`
    #[arg(long, env = "CONNECT_RETRY_DELAY_MS", default_value_t = 1000)]
    pub connect_retry_delay_ms: u64,

    /// Ignore an existing checkpoint and start from the first candidate.
    #[arg(long, default_value_t = false)]
    pub fresh: bool,
}

/// Where the symbols of a fresh generator come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularySource {
    Standard(Vocabulary),
    Custom(Vec<char>),
}

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub vocabulary: VocabularySource,
    pub output_length: usize,
    pub formatter: Formatter,
    pub batch_size: usize,
    pub checkpoint_path: PathBuf,
    pub checkpoint_every: u64,
    pub client: ClientConfig,
    pub fresh: bool,
}

impl ControllerConfig {
    /// Builds a generator positioned at the first candidate.
    pub fn fresh_generator(&self) -> dcw::Result<Generator> {
        match &self.vocabulary {
            VocabularySource::Standard(vocabulary) => {
                Generator::for_standard(*vocabulary, self.output_length, self.formatter)
            }
            VocabularySource::Custom(symbols) => {
                Generator::for_custom(self.output_length, symbols, self.formatter)
            }
        }
    }
}

impl TryFrom<CliArgs> for ControllerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.batch_size == 0 {
            bail!("BATCH_SIZE must be greater than 0");
        }

        if args.checkpoint_every == 0 {
            bail!("CHECKPOINT_EVERY must be greater than 0");
        }

        if args.output_length == 0 {
            bail!("OUTPUT_LENGTH must be greater than 0");
        }

        if args.max_connect_attempts == 0 {
            bail!("MAX_CONNECT_ATTEMPTS must be greater than 0");
        }

        let formatter: Formatter = args.formatter.parse()?;

        let vocabulary = match (args.vocabulary.parse::<Vocabulary>()?, args.custom_vocabulary) {
            (Vocabulary::Custom, None) => {
                bail!("CUSTOM_VOCABULARY is required when VOCABULARY is custom")
            }
            (Vocabulary::Custom, Some(symbols)) => {
                let symbols: Vec<char> = symbols.chars().collect();
                if symbols.is_empty() {
                    bail!("CUSTOM_VOCABULARY must not be empty");
                }
                let mut sorted = symbols.clone();
                sorted.sort_unstable();
                if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
                    bail!("CUSTOM_VOCABULARY repeats the symbol {:?}", pair[0]);
                }
                VocabularySource::Custom(symbols)
            }
            (_, Some(_)) => {
                bail!("CUSTOM_VOCABULARY is only allowed when VOCABULARY is custom")
            }
            (vocabulary, None) => VocabularySource::Standard(vocabulary),
        };

        if formatter == Formatter::Uuid4 && args.output_length != dcw::UUID_HEX_LEN {
            bail!(
                "FORMATTER uuid4 needs OUTPUT_LENGTH {} (got {})",
                dcw::UUID_HEX_LEN,
                args.output_length
            );
        }

        let client = ClientConfig {
            id: args.client_id,
            max_connect_attempts: args.max_connect_attempts,
            retry_delay: Duration::from_millis(args.connect_retry_delay_ms),
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            ..ClientConfig::new(args.worker_host, args.worker_port)
        };

        Ok(Self {
            vocabulary,
            output_length: args.output_length,
            formatter,
            batch_size: args.batch_size,
            checkpoint_path: args.checkpoint_path,
            checkpoint_every: args.checkpoint_every,
            client,
            fresh: args.fresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["dcw-controller"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    fn config(extra: &[&str]) -> anyhow::Result<ControllerConfig> {
        ControllerConfig::try_from(args(extra))
    }

    #[test]
    fn flags_override_defaults() {
        let config = config(&[
            "--vocabulary",
            "hex",
            "--output-length",
            "4",
            "--batch-size",
            "16",
            "--worker-port",
            "6000",
            "--client-id",
            "c1",
            "--connect-retry-delay-ms",
            "250",
            "--fresh",
        ])
        .unwrap();

        assert_eq!(config.vocabulary, VocabularySource::Standard(Vocabulary::Hex));
        assert_eq!(config.output_length, 4);
        assert_eq!(config.batch_size, 16);
        assert_eq!(config.client.port, 6000);
        assert_eq!(config.client.id, "c1");
        assert_eq!(config.client.retry_delay, Duration::from_millis(250));
        assert!(config.fresh);

        let generator = config.fresh_generator().unwrap();
        assert_eq!(generator.try_next_batch(2).unwrap(), ["0000", "0001"]);
    }

    #[test]
    fn custom_vocabulary_is_used() {
        let config = config(&[
            "--vocabulary",
            "custom",
            "--custom-vocabulary",
            "zyx",
            "--output-length",
            "2",
        ])
        .unwrap();

        assert_eq!(
            config.vocabulary,
            VocabularySource::Custom(vec!['z', 'y', 'x'])
        );
        let generator = config.fresh_generator().unwrap();
        assert_eq!(generator.try_next_batch(3).unwrap(), ["xx", "xy", "xz"]);
    }

    #[test]
    fn custom_vocabulary_must_match_selector() {
        assert!(config(&["--vocabulary", "custom"]).is_err());
        assert!(config(&["--vocabulary", "custom", "--custom-vocabulary", ""]).is_err());
        assert!(config(&["--vocabulary", "custom", "--custom-vocabulary", "abca"]).is_err());
        assert!(config(&["--vocabulary", "hex", "--custom-vocabulary", "ab"]).is_err());
    }

    #[test]
    fn zero_values_are_rejected() {
        assert!(config(&["--batch-size", "0"]).is_err());
        assert!(config(&["--checkpoint-every", "0"]).is_err());
        assert!(config(&["--output-length", "0"]).is_err());
        assert!(config(&["--max-connect-attempts", "0"]).is_err());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(config(&["--vocabulary", "octal"]).is_err());
        assert!(config(&["--formatter", "base58"]).is_err());
    }

    #[test]
    fn uuid_formatter_needs_32_symbols() {
        assert!(config(&["--formatter", "uuid4", "--vocabulary", "hex"]).is_err());

        let config = config(&[
            "--formatter",
            "uuid4",
            "--vocabulary",
            "hex",
            "--output-length",
            "32",
        ])
        .unwrap();
        assert_eq!(config.formatter, Formatter::Uuid4);
    }
}
