use crate::validation;
use charla_common::*;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Loads dialog graphs and corpora from their JSON form.
#[derive(Debug, Default)]
pub struct Parser {
    file_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}invalid dialog data: {source}", file_prefix(.file))]
    Json {
        file: Option<PathBuf>,
        #[source]
        source: serde_json::Error,
    },
}

fn file_prefix(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!("{}: ", path.display()),
        None => String::new(),
    }
}

/// Problem found in a graph that does not stop it from loading.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub file: Option<PathBuf>,
    pub dialog: Option<DialogName>,
    pub state: Option<StateName>,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    MissingEntry,
    UnknownJump { target: StateName },
    ResponseWithoutJump { index: usize },
    UnknownResponseJump { index: usize, target: StateName },
    AutoAdvanceWithResponses,
    MalformedTag(crate::TagError),
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingEntry => {
                write!(f, "no `{}` state to start from", ENTRY_STATE)
            }
            WarningKind::UnknownJump { target } => {
                write!(f, "jump to unknown state `{}`", target)
            }
            WarningKind::ResponseWithoutJump { index } => {
                write!(f, "response {} has no jump", index + 1)
            }
            WarningKind::UnknownResponseJump { index, target } => {
                write!(f, "response {} jumps to unknown state `{}`", index + 1, target)
            }
            WarningKind::AutoAdvanceWithResponses => {
                write!(f, "autoAdvanceAfter is ignored on a state with responses")
            }
            WarningKind::MalformedTag(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.dialog, &self.state) {
            (Some(dialog), Some(state)) => write!(f, "{}/{}: {}", dialog, state, self.kind),
            (Some(dialog), None) => write!(f, "{}: {}", dialog, self.kind),
            (None, Some(state)) => write!(f, "{}: {}", state, self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<P>(file_path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            file_path: Some(file_path.into()),
        }
    }

    /// Parses a single graph: a JSON object of state name to state.
    pub fn parse_graph<A>(&self, json: A) -> Result<(DialogGraph, Vec<ParseWarning>), ParseError>
    where
        A: AsRef<str>,
    {
        let graph: DialogGraph = serde_json::from_str(json.as_ref()).map_err(|source| {
            ParseError::Json {
                file: self.file_path.clone(),
                source,
            }
        })?;

        let warnings = validation::validate(&graph, None, self.file_path.as_deref());
        Ok((graph, warnings))
    }

    /// Parses a corpus: a JSON object of dialog name to graph.
    pub fn parse_corpus<A>(&self, json: A) -> Result<(DialogCorpus, Vec<ParseWarning>), ParseError>
    where
        A: AsRef<str>,
    {
        let corpus: DialogCorpus = serde_json::from_str(json.as_ref()).map_err(|source| {
            ParseError::Json {
                file: self.file_path.clone(),
                source,
            }
        })?;

        let warnings = corpus
            .iter()
            .flat_map(|(name, graph)| {
                validation::validate(graph, Some(name), self.file_path.as_deref())
            })
            .collect();

        Ok((corpus, warnings))
    }

    /// Reads and parses the corpus at the parser's file path.
    pub fn load_corpus(&self) -> Result<(DialogCorpus, Vec<ParseWarning>), ParseError> {
        let path = self.file_path.clone().unwrap_or_default();
        let json = std::fs::read_to_string(&path).map_err(|source| ParseError::Io {
            path: path.clone(),
            source,
        })?;
        self.parse_corpus(json)
    }
}
