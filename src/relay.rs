// src/relay.rs

//! Output decoration for relayed child process output.
//!
//! Every chunk read from a child's stdout or stderr is passed through
//! [`decorate_chunk`] before being written to the host's matching stream:
//! each line start within the chunk gets a `"<handle>: "` lead-in painted in
//! the process's assigned color. Decoration is applied per chunk, not per
//! logical line, so a line split across two chunks is decorated twice; this
//! is accepted and not corrected.
//!
//! Colors are plain ANSI SGR sequences. Red is reserved for the
//! orchestrator's own diagnostics and is excluded from the per-process
//! palette.

use std::sync::LazyLock;

use regex::Regex;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";

/// Colors cycled through to differentiate between processes.
const CHILD_COLORS: [&str; 6] = [
    "\x1b[33m", // yellow
    "\x1b[34m", // blue
    "\x1b[35m", // magenta
    "\x1b[36m", // cyan
    "\x1b[37m", // white
    "\x1b[90m", // grey
];

/// Matches each line start within a chunk: either the start of the chunk or
/// a position right after a newline, followed by the line's content.
static LINE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\n)([^\n]+)").expect("line-start pattern is valid"));

/// An SGR sequence assigned to one process, or nothing when color output is
/// disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(&'static str);

impl Color {
    pub const NONE: Color = Color("");
}

/// The fixed cyclic color palette, with a switch for disabling color output
/// entirely (`--no-color`).
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Deterministic color assignment: `palette[index mod palette size]`,
    /// where `index` is the process's position in overall spawn order.
    pub fn color_for_index(&self, index: usize) -> Color {
        if !self.enabled {
            return Color::NONE;
        }
        Color(CHILD_COLORS[index % CHILD_COLORS.len()])
    }

    /// Paint a fatal or diagnostic message in the orchestrator's own color.
    pub fn paint_diagnostic(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!("{RED}{text}{RESET}")
    }
}

fn paint(color: Color, text: &str) -> String {
    if color.0.is_empty() {
        return text.to_string();
    }
    format!("{}{}{}", color.0, text, RESET)
}

/// Decorate one relayed chunk.
///
/// Line starts are "start of chunk or just after a newline"; line ends are
/// "next newline or end of chunk". A trailing fragment without a newline is
/// still decorated. Newlines themselves pass through untouched, so the
/// relayed byte stream differs from the child's only by the inserted
/// lead-ins.
pub fn decorate_chunk(handle: &str, color: Color, text: &str) -> String {
    let lead_in = paint(color, &format!("{handle}: "));
    LINE_START
        .replace_all(text, |caps: &regex::Captures<'_>| {
            format!("{}{}{}", &caps[1], lead_in, &caps[2])
        })
        .into_owned()
}

/// The banner announcing that a process's output has closed.
pub fn completion_banner(handle: &str, color: Color) -> String {
    let rule = paint(color, "------------------");
    let line = paint(color, &format!("{handle}: completed"));
    format!("{rule}\n{line}\n{rule}\n")
}
