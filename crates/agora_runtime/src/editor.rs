//! Terminal input for the REPL.
//!
//! The REPL reads through the [`LineEditor`] trait so tests can script
//! input; the binary uses rustyline.

use std::borrow::Cow;

use agora_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Context, Editor, Helper, Hinter, Validator};

/// What a prompt produced.
#[derive(Debug)]
pub enum ReadResult {
    /// A complete line.
    Line(String),
    /// Ctrl+C: abandon the line.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
}

/// Source of REPL input lines.
pub trait LineEditor {
    /// Shows `prompt` and waits for a line.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Records a line for recall.
    fn add_history(&mut self, line: &str);

    /// Replaces the commands offered for completion.
    fn set_completions(&mut self, words: Vec<String>);
}

/// Helper for rustyline that provides completion and history hints.
#[derive(Helper, Hinter, Validator)]
struct AgoraHelper {
    completer: CommandCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Completer for AgoraHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        self.completer.complete(line, pos, ctx)
    }
}

impl Highlighter for AgoraHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        false
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes whole commands: meta-commands and the commands currently
/// available to the player.
struct CommandCompleter {
    words: Vec<String>,
}

impl CommandCompleter {
    fn new() -> Self {
        Self {
            words: crate::repl::META_COMMANDS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = line[..pos].to_lowercase();
        let candidates = self
            .words
            .iter()
            .filter(|w| w.starts_with(&typed))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

/// Input from a rustyline editor with history and completion.
pub struct RustylineEditor {
    editor: Editor<AgoraHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates the editor.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the terminal cannot be set up.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = AgoraHelper {
            completer: CommandCompleter::new(),
            hinter: HistoryHinter::new(),
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::io(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_completions(&mut self, mut words: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            words.extend(crate::repl::META_COMMANDS.iter().map(ToString::to_string));
            helper.completer.words = words;
        }
    }
}
