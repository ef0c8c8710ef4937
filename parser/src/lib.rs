use charla_common::*;

mod parser;
pub use parser::{ParseError, ParseWarning, Parser, WarningKind};

pub mod tag;
pub use tag::{Tag, TagError};

mod validation;
pub use validation::validate;


pub fn parse_graph(json: &str) -> Result<(DialogGraph, Vec<ParseWarning>), ParseError> {
    Parser::new().parse_graph(json)
}

pub fn parse_corpus(json: &str) -> Result<(DialogCorpus, Vec<ParseWarning>), ParseError> {
    Parser::new().parse_corpus(json)
}
