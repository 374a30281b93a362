//! The interactive REPL.
//!
//! Free text is played as the human character's next command. Lines
//! starting with `:` are meta-commands that inspect or control the
//! simulation without taking a turn.

use std::io::{self, Write};

use agora_engine::{Event, EventId};
use agora_foundation::{Error, Result};

use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::Session;

/// Meta-commands, for completion and help.
pub const META_COMMANDS: &[&str] = &[":look", ":events", ":who", ":reset", ":help", ":quit"];

/// A parsed meta-command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaCommand {
    /// Show a character's perception (the human's by default)
    Look(Option<String>),
    /// Show events after an id (unseen events by default)
    Events(Option<EventId>),
    /// List characters
    Who,
    /// Restore the initial world
    Reset,
    /// Show help
    Help,
    /// Leave the REPL
    Quit,
}

impl MetaCommand {
    /// Parses a meta-command. Returns `None` if the line is not one.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown meta-commands or bad arguments.
    pub fn parse(line: &str) -> Option<std::result::Result<Self, String>> {
        let rest = line.trim().strip_prefix(':')?;
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default().to_lowercase();
        let arg = words.collect::<Vec<_>>().join(" ");
        let arg = (!arg.is_empty()).then_some(arg);

        Some(match name.as_str() {
            "look" | "l" => Ok(Self::Look(arg)),
            "events" | "e" => match arg {
                None => Ok(Self::Events(None)),
                Some(id) => id
                    .parse()
                    .map(|id| Self::Events(Some(id)))
                    .map_err(|_| format!("not an event id: {id}")),
            },
            "who" | "w" => Ok(Self::Who),
            "reset" => Ok(Self::Reset),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command :{other} (try :help)")),
        })
    }
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The running simulation.
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(session: Session) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, session))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E, session: Session) -> Self {
        let prompt = format!("{}> ", session.human_name().unwrap_or("agora"));
        Self {
            editor,
            session,
            show_banner: true,
            prompt,
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consumes the REPL, returning the session.
    #[must_use]
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => Self::print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let fresh = self.session.take_new_events();
        let background = self.render_events(&fresh);
        if !background.is_empty() {
            println!("{background}");
        }
        self.editor.set_completions(self.session.available_commands());

        let input = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => return Ok(true),
            ReadResult::Eof => return Ok(false),
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(true);
        }
        self.editor.add_history(trimmed);

        match self.eval(trimmed)? {
            Some(output) => {
                if !output.is_empty() {
                    println!("{output}");
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Evaluates one line. Returns the text to show, or `None` to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if a command cannot be delivered or a meta-command
    /// fails.
    pub fn eval(&mut self, input: &str) -> Result<Option<String>> {
        let Some(meta) = MetaCommand::parse(input) else {
            let events = self.session.submit(input)?;
            return Ok(Some(self.render_events(&events)));
        };
        let meta = meta.map_err(Error::config)?;

        let output = match meta {
            MetaCommand::Look(None) => self.session.perception()?.to_string(),
            MetaCommand::Look(Some(name)) => self.session.perception_of(&name)?.to_string(),
            MetaCommand::Events(after) => {
                let events = match after {
                    Some(id) => self.session.log().events_since(id),
                    None => self.session.take_new_events(),
                };
                if events.is_empty() {
                    "No events.".to_string()
                } else {
                    events
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            MetaCommand::Who => self.session.who().join("\n"),
            MetaCommand::Reset => {
                if self.session.reset() {
                    "The world is as it was.".to_string()
                } else {
                    "The simulation has stopped.".to_string()
                }
            }
            MetaCommand::Help => help_text(),
            MetaCommand::Quit => return Ok(None),
        };
        Ok(Some(output))
    }

    /// Shows the human's own outcomes as plain narration and everyone
    /// else's as log lines.
    fn render_events(&self, events: &[Event]) -> String {
        let human = self.session.human_name();
        events
            .iter()
            .map(|e| {
                if Some(e.actor.as_str()) == human {
                    e.description.clone()
                } else {
                    e.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn print_error(error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
    }

    /// Prints the welcome banner.
    fn print_banner(&self) {
        println!("\x1b[1;36m");
        println!("    _                          ");
        println!("   /_\\   __ _  ___  _ __ __ _  ");
        println!("  //_\\\\ / _` |/ _ \\| '__/ _` | ");
        println!(" /  _  \\ (_| | (_) | | | (_| | ");
        println!(" \\_/ \\_/\\__, |\\___/|_|  \\__,_| ");
        println!("        |___/                  ");
        println!("\x1b[0m");
        println!("Welcome to Agora v{}", env!("CARGO_PKG_VERSION"));
        if !self.session.title().is_empty() {
            println!("Scenario: {}", self.session.title());
        }
        println!("Type commands to act, :help for more. Use Ctrl+D to exit.\n");
        if let Ok(perception) = self.session.perception() {
            println!("{perception}\n");
        }

        // Flush to ensure banner appears
        let _ = io::stdout().flush();
    }
}

fn help_text() -> String {
    "\
Commands are played as your character's next action, e.g. `get apple`,
`north`, `put key in box`, `look`.

:look [NAME]   Show what you (or NAME) can see and do
:events [ID]   Show events after ID (default: unseen events)
:who           List characters and where they are
:reset         Restore the initial world and clear the log
:help          Show this help
:quit          Leave"
        .to_string()
}
