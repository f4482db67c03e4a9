//! # Output files
//!
//! Layout inside the output directory:
//! ```text
//! .provided-instructions   # exactly what was sent as instructions
//! .provided-input          # exactly what was sent as input
//! output.txt               # initial block, then one appended block per follow-up
//! response-1.txt           # raw text of each response, numbered from 1
//! response-2.txt
//! ```

use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes and appends the cumulative output log and raw responses.
#[derive(Debug, Clone)]
pub struct OutputLog {
    dir: PathBuf,
    file_name: String,
}

impl OutputLog {
    pub fn new(dir: impl AsRef<Path>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            file_name: file_name.into(),
        }
    }

    /// Path of the cumulative log
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Path of the `n`th raw response
    pub fn response_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("response-{}.txt", n))
    }

    /// Record what is about to be sent.
    pub fn write_provided(&self, instructions: &str, input: &str) -> Result<()> {
        self.write_file(&self.dir.join(".provided-instructions"), instructions)?;
        self.write_file(&self.dir.join(".provided-input"), input)
    }

    /// Start the log with the initial exchange, replacing any previous run.
    pub fn write_initial(&self, instructions: &str, input: &str, response: &str) -> Result<()> {
        self.write_file(&self.path(), &initial_block(instructions, input, response))
    }

    /// Append one follow-up exchange to the log.
    pub fn append_follow_up(&self, n: usize, question: &str, response: &str) -> Result<()> {
        let path = self.path();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| io_error(e, "output::append_follow_up", &path))?;

        file.write_all(follow_up_block(n, question, response).as_bytes())
            .map_err(|e| io_error(e, "output::append_follow_up", &path))
    }

    /// Store the raw text of the `n`th response.
    pub fn save_response(&self, n: usize, response: &str) -> Result<PathBuf> {
        let path = self.response_path(n);
        self.write_file(&path, response)?;
        Ok(path)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if !self.dir.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.dir)
                .map_err(|e| io_error(e, "output::write", &self.dir))?;
        }
        std::fs::write(path, content).map_err(|e| io_error(e, "output::write", path))
    }
}

fn io_error(err: std::io::Error, operation: &'static str, path: &Path) -> Error {
    Error::from(err)
        .with_operation(operation)
        .with_context("path", path.display().to_string())
}

fn section(title: &str, body: &str) -> String {
    format!("=== {} ===\n{}\n", title, body.trim_end())
}

/// The block that opens the cumulative log.
pub fn initial_block(instructions: &str, input: &str, response: &str) -> String {
    format!(
        "{}\n{}\n{}",
        section("INSTRUCTIONS", instructions),
        section("INPUT", input),
        section("RESPONSE", response)
    )
}

/// A follow-up exchange, set off by a divider line.
pub fn follow_up_block(n: usize, question: &str, response: &str) -> String {
    format!(
        "\n==================== FOLLOW-UP {} ====================\n{}\n{}",
        n,
        section("QUESTION", question),
        section("RESPONSE", response)
    )
}
