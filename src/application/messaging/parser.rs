//! Command parser - Parses slash-command text into validated requests

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::ParseError;
use crate::domain::entities::{CommandRequest, Species, Subcommand};

/// Target sequence alphabet for custom design (N allowed)
static DESIGN_BASES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ACGTNacgtn]+$").expect("valid pattern"));

/// Protospacer alphabet for the sequence checker
static CHECK_BASES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ACGTacgt]+$").expect("valid pattern"));

pub const DESIGN_MIN_LEN: usize = 23;
pub const DESIGN_MAX_LEN: usize = 1000;
pub const PROTOSPACER_LEN: usize = 20;

/// Parses `/crispr` text into a CommandRequest
#[derive(Debug, Clone, Default)]
pub struct CommandParser {
    default_species: Species,
}

impl CommandParser {
    pub fn new(default_species: Species) -> Self {
        Self { default_species }
    }

    pub fn default_species(&self) -> Species {
        self.default_species
    }

    /// Parse the raw text of one invocation
    ///
    /// The slash-command name itself may be included (`/crispr check ...`) and
    /// is skipped. Empty text or an unrecognized subcommand yields help.
    pub fn parse(&self, raw_text: &str) -> Result<CommandRequest, ParseError> {
        let mut tokens = raw_text.split_whitespace().peekable();
        if tokens.peek().is_some_and(|t| t.starts_with('/')) {
            tokens.next();
        }

        let Some(first) = tokens.next() else {
            return Ok(CommandRequest::help());
        };

        let subcommand = Subcommand::from_token(first);
        if !subcommand.calls_vendor() {
            return Ok(CommandRequest::help());
        }

        let args: Vec<&str> = tokens.collect();
        let usage = subcommand.usage();

        let target = match args.first() {
            Some(t) => *t,
            None => {
                return Err(ParseError::MissingArgument {
                    what: Self::argument_name(subcommand),
                    usage,
                })
            }
        };

        if args.len() > 2 {
            return Err(ParseError::TooManyArguments { found: args.len(), usage });
        }

        let species = match args.get(1) {
            Some(name) => Species::parse(name).ok_or_else(|| ParseError::UnknownSpecies(name.to_string()))?,
            None => self.default_species,
        };

        let target = match subcommand {
            Subcommand::Design => Self::validate_design_sequence(target)?,
            Subcommand::Check => Self::validate_protospacer(target)?,
            Subcommand::Predesign => target.to_uppercase(),
            Subcommand::Help => String::new(),
        };

        Ok(CommandRequest::new(subcommand, target, species))
    }

    fn argument_name(subcommand: Subcommand) -> &'static str {
        match subcommand {
            Subcommand::Predesign => "gene symbol",
            _ => "sequence",
        }
    }

    fn validate_design_sequence(sequence: &str) -> Result<String, ParseError> {
        const ALLOWED: &str = "A, C, G, T, N";
        if !DESIGN_BASES.is_match(sequence) {
            return Err(Self::invalid_base(sequence, "ACGTN", ALLOWED));
        }

        let len = sequence.chars().count();
        if !(DESIGN_MIN_LEN..=DESIGN_MAX_LEN).contains(&len) {
            return Err(ParseError::SequenceLength {
                expected: "23-1000 bp",
                actual: len,
            });
        }

        Ok(sequence.to_uppercase())
    }

    fn validate_protospacer(sequence: &str) -> Result<String, ParseError> {
        const ALLOWED: &str = "A, C, G, T";
        if !CHECK_BASES.is_match(sequence) {
            return Err(Self::invalid_base(sequence, "ACGT", ALLOWED));
        }

        let len = sequence.chars().count();
        if len != PROTOSPACER_LEN {
            return Err(ParseError::SequenceLength {
                expected: "exactly 20 bases",
                actual: len,
            });
        }

        Ok(sequence.to_uppercase())
    }

    fn invalid_base(sequence: &str, alphabet: &str, allowed: &'static str) -> ParseError {
        let found = sequence
            .chars()
            .find(|c| !alphabet.contains(c.to_ascii_uppercase()))
            .unwrap_or('?');
        ParseError::InvalidBase { found, allowed }
    }
}
