//! Terminal backends for the prompter.
//!
//! The prompter never touches stdin or stdout directly. It reads [`Key`]s and
//! draws [`Frame`]s through the [`Terminal`] trait, which has a real
//! implementation over the `console` crate ([`ConsoleTerminal`]) and a scripted
//! one for tests ([`MockTerminal`]).

use std::collections::VecDeque;
use std::fmt;
use std::io;

use console::Term;

/// A single input event from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character (space included).
    Char(char),
    Backspace,
    Enter,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Escape,
    /// Ctrl-C.
    Interrupt,
    /// Ctrl-D or the end of the input stream.
    Eof,
    /// Anything the prompter has no binding for.
    Other,
}

/// The lines making up one rendering of a prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

/// Abstraction over terminal I/O for testability.
pub trait Terminal {
    /// Whether a human can answer prompts on this terminal.
    fn is_interactive(&self) -> bool;

    /// Block until the next key is available.
    fn read_key(&mut self) -> io::Result<Key>;

    /// Replace the previously drawn frame with `frame`.
    fn draw(&mut self, frame: &Frame) -> io::Result<()>;

    /// Replace the previously drawn frame with a single summary line.
    fn finish(&mut self, summary: &str) -> io::Result<()>;
}

/// Real terminal backed by [`console::Term`].
///
/// Prompts are drawn on stderr by default so that stdout stays clean for
/// command output.
#[derive(Debug)]
pub struct ConsoleTerminal {
    term: Term,
    drawn: usize,
}

impl ConsoleTerminal {
    /// A terminal drawing on stderr.
    pub fn stderr() -> Self {
        Self::new(Term::stderr())
    }

    /// A terminal drawing on stdout.
    pub fn stdout() -> Self {
        Self::new(Term::stdout())
    }

    pub fn new(term: Term) -> Self {
        Self { term, drawn: 0 }
    }

    fn clear(&mut self) -> io::Result<()> {
        if self.drawn > 0 {
            self.term.clear_last_lines(self.drawn)?;
            self.drawn = 0;
        }
        Ok(())
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::stderr()
    }
}

impl Terminal for ConsoleTerminal {
    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }

    fn read_key(&mut self) -> io::Result<Key> {
        match self.term.read_key() {
            Ok(key) => Ok(map_console_key(key)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Key::Interrupt),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(Key::Eof),
            Err(e) => Err(e),
        }
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        self.clear()?;
        for line in frame.lines() {
            self.term.write_line(line)?;
        }
        self.drawn = frame.len();
        self.term.flush()
    }

    fn finish(&mut self, summary: &str) -> io::Result<()> {
        self.clear()?;
        self.term.write_line(summary)?;
        self.term.flush()
    }
}

fn map_console_key(key: console::Key) -> Key {
    match key {
        console::Key::Char('\u{3}') | console::Key::CtrlC => Key::Interrupt,
        console::Key::Char('\u{4}') => Key::Eof,
        console::Key::Char('\t') | console::Key::Tab => Key::Tab,
        console::Key::Char(c) if !c.is_control() => Key::Char(c),
        console::Key::Backspace => Key::Backspace,
        console::Key::Enter => Key::Enter,
        console::Key::ArrowUp => Key::Up,
        console::Key::ArrowDown => Key::Down,
        console::Key::ArrowLeft => Key::Left,
        console::Key::ArrowRight => Key::Right,
        console::Key::Escape => Key::Escape,
        _ => Key::Other,
    }
}

/// One scripted step of a [`MockTerminal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scripted {
    Key(Key),
    Fail,
}

/// Mock terminal for testing prompts.
///
/// Replays a script of keys and records every frame the prompter draws. Once
/// the script is exhausted every read returns [`Key::Eof`], which mirrors a
/// closed stdin.
#[derive(Debug, Clone)]
pub struct MockTerminal {
    interactive: bool,
    script: VecDeque<Scripted>,
    frames: Vec<Frame>,
    summaries: Vec<String>,
}

impl MockTerminal {
    /// An interactive terminal with an empty script.
    pub fn new() -> Self {
        Self {
            interactive: true,
            script: VecDeque::new(),
            frames: Vec::new(),
            summaries: Vec::new(),
        }
    }

    /// Create a mock that simulates a non-terminal.
    pub fn non_terminal() -> Self {
        Self {
            interactive: false,
            ..Self::new()
        }
    }

    /// Create a mock terminal that replays the given keys.
    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self::new().then_keys(keys)
    }

    /// Create a mock terminal where each response is typed and submitted.
    ///
    /// Useful for testing retry scenarios.
    pub fn with_lines(lines: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        lines
            .into_iter()
            .fold(Self::new(), |term, line| term.then_line(line.as_ref()))
    }

    /// Append keys to the script.
    pub fn then_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.script.extend(keys.into_iter().map(Scripted::Key));
        self
    }

    /// Append typing `line` followed by Enter.
    pub fn then_line(self, line: &str) -> Self {
        let keys: Vec<Key> = line.chars().map(Key::Char).collect();
        self.then_keys(keys).then_keys([Key::Enter])
    }

    /// Append a read failure.
    pub fn then_fail(mut self) -> Self {
        self.script.push_back(Scripted::Fail);
        self
    }

    /// Every frame drawn so far, oldest first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The most recently drawn frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Summary lines written when prompts were accepted.
    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    /// Number of script steps not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Default for MockTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for MockTerminal {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn read_key(&mut self) -> io::Result<Key> {
        match self.script.pop_front() {
            Some(Scripted::Key(key)) => Ok(key),
            Some(Scripted::Fail) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "scripted read failure",
            )),
            None => Ok(Key::Eof),
        }
    }

    fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self, summary: &str) -> io::Result<()> {
        self.summaries.push(summary.to_string());
        Ok(())
    }
}
