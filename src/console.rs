//! Line-oriented command console over a shared document.
//!
//! Each input line is one [`Command`]; the console applies it to the
//! [`DocumentHandle`] and writes a one-line (or JSON) reply. A failed
//! command is reported as an `error:` line and the loop keeps going.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_WAIT_TIMEOUT;
use crate::document::{Attribute, MarginSide};
use crate::editor::DocumentHandle;
use crate::error::CommandError;
use crate::store::SaveStore;

const HELP: &str = "\
commands:
  insert <index> <text>          insert text (\\n starts a new paragraph)
  delete <start> <end>           delete the range start..end
  find <term>                    list occurrences as [start, end] pairs
  format <start> <end> <attr>    toggle bold|italic|subscript|superscript|title|heading|subheading|body
  margin <side> <mm>             set left|right|top|bottom margin
  text | html | paragraphs       show the document
  version                        show the version counter
  wait <baseline> [ms]           block until the version passes baseline
  save <name> | load <name>      persist or restore a document
  saves                          list saved documents
  help | quit";

/// Everything the console understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert text at a flat index
    Insert { index: usize, text: String },
    /// Delete a flat range
    Delete { start: usize, end: usize },
    /// Search the document
    Find(String),
    /// Toggle an attribute over a flat range
    Format {
        start: usize,
        end: usize,
        attribute: Attribute,
    },
    /// Set one margin in millimetres
    Margin { side: MarginSide, value_mm: f64 },
    Text,
    Html,
    Paragraphs,
    Version,
    /// Wait for the version to pass a baseline
    Wait {
        baseline: u64,
        timeout: Option<Duration>,
    },
    Save(String),
    Load(String),
    Saves,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    ///
    /// # Errors
    /// [`CommandError::Usage`] for unknown commands or malformed arguments;
    /// [`CommandError::Document`] for unknown attribute or margin names.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        let (name, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name {
            "insert" => {
                let (index, text) = rest
                    .split_once(' ')
                    .ok_or_else(|| usage("insert <index> <text>"))?;
                Self::Insert {
                    index: number(index, "insert <index> <text>")?,
                    text: unescape(text),
                }
            }
            "delete" => {
                let [start, end] = exact::<2>(&args, "delete <start> <end>")?;
                Self::Delete {
                    start: number(start, "delete <start> <end>")?,
                    end: number(end, "delete <start> <end>")?,
                }
            }
            "find" => Self::Find(unescape(rest)),
            "format" => {
                let [start, end, attribute] = exact::<3>(&args, "format <start> <end> <attribute>")?;
                Self::Format {
                    start: number(start, "format <start> <end> <attribute>")?,
                    end: number(end, "format <start> <end> <attribute>")?,
                    attribute: attribute.parse()?,
                }
            }
            "margin" => {
                let [side, value] = exact::<2>(&args, "margin <side> <mm>")?;
                Self::Margin {
                    side: side.parse()?,
                    value_mm: value
                        .parse()
                        .map_err(|_| usage("margin <side> <mm>"))?,
                }
            }
            "wait" => match args.as_slice() {
                [baseline] => Self::Wait {
                    baseline: number(baseline, "wait <baseline> [ms]")?,
                    timeout: None,
                },
                [baseline, ms] => Self::Wait {
                    baseline: number(baseline, "wait <baseline> [ms]")?,
                    timeout: Some(Duration::from_millis(number(ms, "wait <baseline> [ms]")?)),
                },
                _ => return Err(usage("wait <baseline> [ms]")),
            },
            "save" => Self::Save(single(&args, "save <name>")?),
            "load" => Self::Load(single(&args, "load <name>")?),
            "text" => Self::Text,
            "html" => Self::Html,
            "paragraphs" => Self::Paragraphs,
            "version" => Self::Version,
            "saves" => Self::Saves,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(usage(&format!("unknown command '{other}', try 'help'"))),
        };
        Ok(Some(command))
    }
}

/// Runs commands against one document and one save directory.
pub struct Console {
    handle: Arc<DocumentHandle>,
    store: SaveStore,
    wait_timeout: Duration,
}

impl Console {
    pub fn new(handle: Arc<DocumentHandle>, store: SaveStore) -> Self {
        Self {
            handle,
            store,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Default bound for `wait` commands that do not give one.
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn handle(&self) -> &Arc<DocumentHandle> {
        &self.handle
    }

    /// Apply one command and describe the outcome.
    ///
    /// # Errors
    /// Whatever the underlying document or store operation reports.
    pub fn execute(&self, command: Command) -> Result<String, CommandError> {
        let handle = &self.handle;
        let reply = match command {
            Command::Insert { index, text } => ok(handle.insert(&text, index)?),
            Command::Delete { start, end } => ok(handle.delete(start, end)?),
            Command::Find(term) => to_json(&handle.find(&term)),
            Command::Format {
                start,
                end,
                attribute,
            } => ok(handle.toggle_format(start, end, attribute)?),
            Command::Margin { side, value_mm } => ok(handle.set_margin(side, value_mm)?),
            Command::Text => handle.plain_text(),
            Command::Html => handle.markup(),
            Command::Paragraphs => to_json(&handle.paragraphs()),
            Command::Version => handle.version().to_string(),
            Command::Wait { baseline, timeout } => {
                let version =
                    handle.wait_for_change(baseline, timeout.unwrap_or(self.wait_timeout));
                if version > baseline {
                    format!("changed (version {version})")
                } else {
                    format!("unchanged (version {version})")
                }
            }
            Command::Save(name) => {
                let path = self.store.save(&name, handle)?;
                format!("saved to {}", path.display())
            }
            Command::Load(name) => {
                let (path, version) = self.store.load(&name, handle)?;
                format!("loaded {} (version {version})", path.display())
            }
            Command::Saves => {
                let names = self.store.list()?;
                if names.is_empty() {
                    "(no saves)".to_string()
                } else {
                    names.join("\n")
                }
            }
            Command::Help => HELP.to_string(),
            Command::Quit => String::new(),
        };
        Ok(reply)
    }

    /// Read commands from `input` until it ends or `quit` arrives.
    ///
    /// # Errors
    /// Only I/O errors on `input` or `output` end the loop early.
    pub fn run(&self, input: impl BufRead, mut output: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let reply = match Command::parse(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command),
                Err(err) => Err(err),
            };
            match reply {
                Ok(text) => writeln!(output, "{text}")?,
                Err(err) => writeln!(output, "error: {err}")?,
            }
            output.flush()?;
        }
        Ok(())
    }
}

fn ok(version: u64) -> String {
    format!("ok (version {version})")
}

fn usage(msg: &str) -> CommandError {
    CommandError::Usage(msg.to_string())
}

fn number<T: std::str::FromStr>(token: &str, form: &str) -> Result<T, CommandError> {
    token.trim().parse().map_err(|_| usage(form))
}

fn exact<'a, const N: usize>(args: &[&'a str], form: &str) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| usage(form))
}

fn single(args: &[&str], form: &str) -> Result<String, CommandError> {
    let [value] = exact::<1>(args, form)?;
    Ok(value.to_string())
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("error: {e}"))
}

/// Expand `\n`, `\t` and `\\`; other backslashes are kept as typed.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Style;
    use crate::editor::TextBuffer;
    use tempfile::tempdir;

    fn console(text: &str) -> (Console, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let handle = Arc::new(DocumentHandle::new(TextBuffer::from_text(text)));
        (Console::new(handle, SaveStore::new(dir.path())), dir)
    }

    #[test]
    fn test_parse_insert_keeps_spacing_and_escapes() {
        let cmd = Command::parse("insert 4  two\\nlines").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Insert {
                index: 4,
                text: " two\nlines".to_string()
            }
        );
    }

    #[test]
    fn test_parse_format_with_style() {
        let cmd = Command::parse("format 0 5 heading").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Format {
                start: 0,
                end: 5,
                attribute: Attribute::Style(Style::Heading)
            }
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("# note").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Command::parse("delete 1").unwrap_err(),
            CommandError::Usage(_)
        ));
        assert!(matches!(
            Command::parse("format 0 1 underline").unwrap_err(),
            CommandError::Document(_)
        ));
        assert!(Command::parse("explode").is_err());
    }

    #[test]
    fn test_unescape_handles_known_and_unknown_escapes() {
        assert_eq!(unescape("a\\nb\\\\c\\q"), "a\nb\\c\\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_execute_reports_versions() {
        let (console, _dir) = console("");
        let reply = console
            .execute(Command::Insert {
                index: 0,
                text: "Hello world".to_string(),
            })
            .unwrap();
        assert_eq!(reply, "ok (version 1)");
        assert_eq!(console.execute(Command::Version).unwrap(), "1");
    }

    #[test]
    fn test_execute_reports_the_version_of_its_own_edit() {
        let (console, _dir) = console("abc");
        console.handle().insert("zz", 0).unwrap();
        let reply = console
            .execute(Command::Delete { start: 0, end: 2 })
            .unwrap();
        assert_eq!(reply, "ok (version 2)");
        let reply = console
            .execute(Command::Margin {
                side: MarginSide::Left,
                value_mm: 5.0,
            })
            .unwrap();
        assert_eq!(reply, "ok (version 3)");
    }

    #[test]
    fn test_execute_wait_reports_unchanged_after_timeout() {
        let (console, _dir) = console("abc");
        let reply = console
            .execute(Command::Wait {
                baseline: 0,
                timeout: Some(Duration::from_millis(10)),
            })
            .unwrap();
        assert_eq!(reply, "unchanged (version 0)");
    }

    #[test]
    fn test_run_script_continues_after_errors() {
        let (console, _dir) = console("");
        let script = "insert 0 Hello world\ndelete 5 99\nfind world\nsave draft\nsaves\nquit\ntext\n";
        let mut out = Vec::new();
        console.run(script.as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("ok (version 1)\n"));
        assert!(out.contains("error: invalid range 5..99 (document length 11)"));
        assert!(out.contains("[\n  [\n    6,\n    11\n  ]\n]"));
        assert!(out.contains("saved to"));
        assert!(out.trim_end().ends_with("draft"));
    }
}
