//! Operator session: navigate the article list and render on request.
//!
//! The shell talks to a [`Session`] only through [`SessionCommand`]s and
//! gets a [`SessionEvent`] back. Navigation and rendering are separate
//! commands; the session never calls back into the shell.

use crate::error::Stage;
use crate::models::{ArticleRef, VideoOutput};
use crate::navigator::Navigator;
use crate::pipeline::Pipeline;
use crate::tts::SpeechSynthesizer;
use crate::video::VideoEncoder;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, instrument};

/// One operator request, parsed from a line of input.
///
/// Each command has a long form and a one-letter short form
/// (`n`/`next`, `g`/`generate`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Prev,
    Next,
    Current,
    Generate,
    List,
    Quit,
}

impl SessionCommand {
    /// Commands that move the cursor.
    pub fn is_navigation(&self) -> bool {
        matches!(self, SessionCommand::Prev | SessionCommand::Next)
    }
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "prev" | "previous" => Ok(SessionCommand::Prev),
            "n" | "next" => Ok(SessionCommand::Next),
            "c" | "current" => Ok(SessionCommand::Current),
            "g" | "gen" | "generate" => Ok(SessionCommand::Generate),
            "l" | "ls" | "list" => Ok(SessionCommand::List),
            "q" | "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(format!(
                "unknown command {other:?} (prev, next, current, generate, list, quit)"
            )),
        }
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The record now under the cursor.
    Selected { index: usize, total: usize, record: ArticleRef },
    /// The list is empty; nothing to select or render.
    Empty,
    Listing { cursor: Option<usize>, records: Vec<ArticleRef> },
    Generated(VideoOutput),
    Failed { stage: Stage, message: String },
    Quit,
}

/// Article list plus the pipeline that renders its entries.
///
/// Every render writes to the same `output_path`.
pub struct Session<S, E> {
    navigator: Navigator,
    pipeline: Pipeline<S, E>,
    output_path: PathBuf,
}

impl<S: SpeechSynthesizer, E: VideoEncoder> Session<S, E> {
    pub fn new(navigator: Navigator, pipeline: Pipeline<S, E>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            navigator,
            pipeline,
            output_path: output_path.into(),
        }
    }

    /// Apply `command` and report what happened.
    ///
    /// Only [`SessionCommand::Generate`] runs the pipeline. A failed render
    /// comes back as [`SessionEvent::Failed`] with its stage, never as an
    /// error, so the session keeps going.
    #[instrument(level = "debug", skip(self))]
    pub async fn handle(&mut self, command: SessionCommand) -> SessionEvent {
        match command {
            SessionCommand::Prev => {
                self.navigator.prev();
                self.selected()
            }
            SessionCommand::Next => {
                self.navigator.next();
                self.selected()
            }
            SessionCommand::Current => self.selected(),
            SessionCommand::List => SessionEvent::Listing {
                cursor: self.navigator.cursor(),
                records: self.navigator.items().to_vec(),
            },
            SessionCommand::Generate => self.generate().await,
            SessionCommand::Quit => SessionEvent::Quit,
        }
    }

    fn selected(&self) -> SessionEvent {
        match (self.navigator.cursor(), self.navigator.current()) {
            (Some(index), Some(record)) => SessionEvent::Selected {
                index,
                total: self.navigator.len(),
                record: record.clone(),
            },
            _ => SessionEvent::Empty,
        }
    }

    async fn generate(&mut self) -> SessionEvent {
        let Some(record) = self.navigator.current().cloned() else {
            return SessionEvent::Empty;
        };
        info!(url = %record.url, title = %record.title, "Generating video for selected article");

        match self
            .pipeline
            .run(&record.url, Some(&record.title), &self.output_path)
            .await
        {
            Ok(output) => SessionEvent::Generated(output),
            Err(e) => SessionEvent::Failed {
                stage: e.stage(),
                message: e.to_string(),
            },
        }
    }
}
