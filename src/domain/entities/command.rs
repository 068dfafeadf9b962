use std::fmt;
use serde::{Deserialize, Serialize};

/// Subcommands of the `/crispr` slash command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    Design,
    Check,
    Predesign,
    Help,
}

impl Subcommand {
    /// Select a subcommand from its token. Unrecognized tokens fall back to help.
    pub fn from_token(token: &str) -> Self {
        match token.to_lowercase().as_str() {
            "design" => Subcommand::Design,
            "check" => Subcommand::Check,
            "predesign" => Subcommand::Predesign,
            _ => Subcommand::Help,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Design => "design",
            Subcommand::Check => "check",
            Subcommand::Predesign => "predesign",
            Subcommand::Help => "help",
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Subcommand::Design => "/crispr design <sequence> [species]",
            Subcommand::Check => "/crispr check <20bp_sequence> [species]",
            Subcommand::Predesign => "/crispr predesign <gene_symbol> [species]",
            Subcommand::Help => "/crispr help",
        }
    }

    /// Whether this subcommand reaches the vendor API
    pub fn calls_vendor(&self) -> bool {
        !matches!(self, Subcommand::Help)
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Species supported for off-target analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    #[default]
    Human,
    Mouse,
    Rat,
    Zebrafish,
    Celegans,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Human,
        Species::Mouse,
        Species::Rat,
        Species::Zebrafish,
        Species::Celegans,
    ];

    /// Case-insensitive lookup by short name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    /// Short name, also the value sent to the vendor
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Human => "human",
            Species::Mouse => "mouse",
            Species::Rat => "rat",
            Species::Zebrafish => "zebrafish",
            Species::Celegans => "celegans",
        }
    }

    pub fn scientific_name(&self) -> &'static str {
        match self {
            Species::Human => "Homo sapiens",
            Species::Mouse => "Mus musculus",
            Species::Rat => "Rattus norvegicus",
            Species::Zebrafish => "Danio rerio",
            Species::Celegans => "Caenorhabditis elegans",
        }
    }

    pub fn supported_list() -> String {
        Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated `/crispr` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub subcommand: Subcommand,
    /// Sequence (design/check) or gene symbol (predesign); empty for help
    pub target: String,
    pub species: Species,
}

impl CommandRequest {
    pub fn new(subcommand: Subcommand, target: impl Into<String>, species: Species) -> Self {
        Self {
            subcommand,
            target: target.into(),
            species,
        }
    }

    pub fn help() -> Self {
        Self::new(Subcommand::Help, String::new(), Species::default())
    }

    pub fn is_help(&self) -> bool {
        self.subcommand == Subcommand::Help
    }
}
