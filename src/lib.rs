#![allow(clippy::module_inception)]

use std::{fs, path::Path, rc::Rc, sync::Once};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

static TRACING_INIT: Once = Once::new();

/// Installs the `tracing` subscriber once per process.
///
/// Nothing is installed unless `DULEK_LOG` is set, e.g.
/// `DULEK_LOG=dulek::compiler=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if let Ok(filter) = EnvFilter::try_from_env("DULEK_LOG") {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}

/// Byte offset into a source file, plus the file's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Returns the 1-based line number, the line text and the column of `position`.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > content.len() {
        return None;
    }

    let mut start = 0;

    for (index, line) in content.split_inclusive('\n').enumerate() {
        let end = start + line.len();

        // An error at end of input points just past the last character.
        if (start..end).contains(&pos) || (pos == end && end == content.len()) {
            return Some((index + 1, line.to_string(), pos - start));
        }

        start = end;
    }

    None
}

pub fn display_error(error: &Error, file: &Path) {
    /*
        Error: name (tip)
        -> main.du
           |
        20 | x = #;
           | ----^
    */

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }
    eprintln!("-> {}", file.as_os_str().to_string_lossy());

    if *error.get_position() == Position::null() {
        return;
    }

    let Ok(content) = fs::read_to_string(file) else {
        return;
    };
    let Some((line, line_text, line_pos)) = get_line_at_position(&content, error.get_position().0)
    else {
        return;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!("{:>padding$} {:->arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.len() - string.trim_start_matches([' ', '\t']).len();

    (String::from(&string[start..]), start)
}
