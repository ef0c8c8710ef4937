use std::path::Path;
use std::path::PathBuf;

/// A compatibility case: a corpus, the commands fed to the player and the
/// transcript they must produce.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub corpus: String,
    pub input: String,
    pub result: String,
    pub path: PathBuf,
    pub disabled: bool,
}

fn parse_name(content: &str) -> String {
    content
        .lines()
        .next()
        .and_then(|line| line.strip_prefix("# "))
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn parse_markdown_block(content: &str, language: &str) -> String {
    content
        .split(&format!("```{}\n", language))
        .nth(1)
        .and_then(|block| block.split("```").next())
        .unwrap_or_default()
        .trim()
        .to_string()
}

impl TestCase {
    pub fn from_string<A, B>(content: A, path: B) -> Self
    where
        A: AsRef<str>,
        B: AsRef<Path>,
    {
        let content = content.as_ref();
        let name = parse_name(content);
        let corpus = parse_markdown_block(content, "json");
        let input = parse_markdown_block(content, "input");
        let result = parse_markdown_block(content, "result");
        let disabled = content.trim().ends_with("!!! disabled");

        TestCase {
            name,
            corpus,
            input,
            result,
            path: path.as_ref().into(),
            disabled,
        }
    }

    /// Inputs as the comma separated list the command line expects.
    pub fn input_commands(&self) -> String {
        self.input
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>()
            .join(",")
    }
}

#[cfg(test)]
mod test {
    #[test]
    fn test_case_from_string_with_simple_test() {
        let content = include_str!("../../compatibility-tests/00000000001-single-line-and-end.md");

        let test_case = super::TestCase::from_string(
            content,
            "compatibility-tests/00000000001-single-line-and-end.md",
        );

        assert_eq!(test_case.name, "Single Line and End");
        assert_eq!(test_case.corpus, r#"{
  "intro": {
    "entry": { "text": "Hi" }
  }
}"#);
        assert_eq!(test_case.input, "f\na");
        assert_eq!(test_case.input_commands(), "f,a");
        assert_eq!(test_case.result, "START\n> Hi\nEND");
        assert!(!test_case.disabled);
    }

    #[test]
    fn test_case_from_string_with_disabled_test() {
        let content = "# Test Name\n\nTest description\n\n## Corpus\n```json\n{}\n```\n\n## Input\n```input\nt\n```\n\n## Result\n```result\nSTART\n```\n\n!!! disabled";

        let test_case = super::TestCase::from_string(content, "test.md");

        assert!(test_case.disabled);
        assert_eq!(test_case.corpus, "{}");
    }

    #[test]
    fn missing_blocks_are_empty() {
        let test_case = super::TestCase::from_string("no heading here", "empty.md");

        assert_eq!(test_case.name, "");
        assert_eq!(test_case.corpus, "");
        assert_eq!(test_case.input_commands(), "");
    }
}
