//! Speech input and output seams, plus the console backend.

use async_trait::async_trait;
use docqa_core::AppResult;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tokio::sync::Mutex;

/// Outcome of one listening attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    /// Recognized text
    Text(String),
    /// Speech was detected but could not be transcribed
    Unrecognized,
    /// The recognition backend failed
    ServiceUnavailable(String),
    /// No more input will arrive
    Closed,
}

/// Source of user utterances.
#[async_trait]
pub trait SpeechInput: Send {
    async fn listen(&mut self) -> Heard;
}

/// Sink for spoken replies. Shared with the reminder task.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn say(&self, text: &str) -> AppResult<()>;
}

/// Reads one utterance per stdin line.
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechInput for ConsoleInput {
    async fn listen(&mut self) -> Heard {
        match self.lines.next_line().await {
            Ok(Some(line)) => classify_line(&line),
            Ok(None) => Heard::Closed,
            Err(e) => Heard::ServiceUnavailable(e.to_string()),
        }
    }
}

/// Blank lines stand in for unintelligible speech.
fn classify_line(line: &str) -> Heard {
    let text = line.trim();
    if text.is_empty() {
        Heard::Unrecognized
    } else {
        Heard::Text(text.to_string())
    }
}

/// Prints each reply on its own stdout line.
pub struct ConsoleOutput {
    stdout: Mutex<Stdout>,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self {
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechOutput for ConsoleOutput {
    async fn say(&self, text: &str) -> AppResult<()> {
        let mut stdout = self.stdout.lock().await;
        stdout.write_all(format!("{}\n", text).as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
