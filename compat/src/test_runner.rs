use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use charla_common::test_case::TestCase;

/// How a compatibility case went.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass,
    Mismatch { expected: String, actual: String },
    /// The case could not be run at all.
    Broken(String),
}

/// Corpus written to its own scratch directory, removed on drop.
struct ScratchCorpus {
    dir: PathBuf,
    file: PathBuf,
}

impl ScratchCorpus {
    fn write(case: &TestCase) -> io::Result<Self> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let dir = std::env::temp_dir().join(format!("charla-compat-{}-{}", std::process::id(), stamp));
        std::fs::create_dir_all(&dir)?;

        // Named after the case so warnings print the same file name everywhere.
        let stem = case.path.file_stem().unwrap_or_default().to_string_lossy();
        let file = dir.join(format!("{}.json", stem));
        let scratch = ScratchCorpus { dir, file };
        std::fs::write(&scratch.file, format!("{}\n", case.corpus))?;
        Ok(scratch)
    }
}

impl Drop for ScratchCorpus {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

/// Runs cases against a `charla` binary.
pub struct TestRunner {
    binary: PathBuf,
}

impl TestRunner {
    pub fn new<P: Into<PathBuf>>(binary: P) -> Self {
        TestRunner {
            binary: binary.into(),
        }
    }

    pub fn run(&self, case: &TestCase) -> Outcome {
        match self.transcript(case) {
            Ok(actual) if same_lines(&actual, &case.result) => Outcome::Pass,
            Ok(actual) => Outcome::Mismatch {
                expected: case.result.clone(),
                actual,
            },
            Err(err) => Outcome::Broken(format!("{}: {}", self.binary.display(), err)),
        }
    }

    fn transcript(&self, case: &TestCase) -> io::Result<String> {
        let corpus = ScratchCorpus::write(case)?;
        let output = self.command(&corpus.file, &case.input_commands()).output()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn command(&self, corpus: &Path, inputs: &str) -> Command {
        let mut command = Command::new(&self.binary);
        command.arg("run").arg(corpus).arg(inputs);
        command
    }
}

/// Compares transcripts ignoring trailing line breaks.
fn same_lines(actual: &str, expected: &str) -> bool {
    let trailing: &[char] = &['\r', '\n'];
    actual.trim_end_matches(trailing) == expected.trim_end_matches(trailing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_newlines_do_not_matter() {
        assert!(same_lines("START\nEND\n\n", "START\nEND"));
        assert!(same_lines("START\r\n", "START"));
        assert!(!same_lines("START\nEND", "START"));
    }

    #[test]
    fn scratch_corpus_keeps_case_name_and_is_removed() {
        let case = TestCase::from_string(
            "# Case\n```json\n{}\n```\n",
            "compatibility-tests/00000000042-empty.md",
        );

        let scratch = ScratchCorpus::write(&case).unwrap();
        let dir = scratch.dir.clone();

        assert_eq!(
            scratch.file.file_name().and_then(|n| n.to_str()),
            Some("00000000042-empty.json")
        );
        assert_eq!(std::fs::read_to_string(&scratch.file).unwrap(), "{}\n");

        drop(scratch);
        assert!(!dir.exists());
    }

    #[test]
    fn missing_binary_is_broken() {
        let runner = TestRunner::new("does/not/exist/charla");
        let case = TestCase::from_string("# Case\n```json\n{}\n```\n", "case.md");

        assert!(matches!(runner.run(&case), Outcome::Broken(_)));
    }
}
