// file: src/prompt/mod.rs
// version: 1.0.1
// guid: b7e04d2c-58a3-4f91-86b5-3c2d91e7a458

//! Interactive stdin/stdout question-and-answer collaborator

use crate::Result;
use std::io::Write;

/// Line-based prompt seam, answered by an operator in production and by a
/// script in tests.
///
/// `Ok(None)` signals that the input stream is closed; callers decide whether
/// that ends a loop or aborts the run.
#[async_trait::async_trait]
pub trait Prompter: Send {
    async fn ask(&mut self, question: &str) -> Result<Option<String>>;
}

/// Prompter backed by the process stdin/stdout
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Prompter for StdinPrompter {
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        let question = question.to_string();
        // stdin reads are blocking; keep them off the runtime so Ctrl-C
        // handling stays responsive
        let answer = tokio::task::spawn_blocking(move || -> Result<Option<String>> {
            print!("{}", question);
            std::io::stdout().flush()?;

            let mut line = String::new();
            let read = std::io::stdin().read_line(&mut line)?;
            if read == 0 {
                return Ok(None);
            }
            Ok(Some(strip_line_ending(&line).to_string()))
        })
        .await
        .map_err(|e| {
            crate::error::ProvisionError::PromptError(format!("Prompt task failed: {}", e))
        })??;

        Ok(answer)
    }
}

impl Default for StdinPrompter {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the trailing newline (and carriage return) without touching interior
/// whitespace; answers are otherwise passed through verbatim
fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(|c| c == '\r' || c == '\n')
}

/// Scripted prompter for tests: answers from a fixed queue and records every
/// question asked
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub questions: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
        }
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.questions.push(question.to_string());
        // an exhausted script behaves like a closed stdin
        Ok(self.answers.pop_front())
    }
}
