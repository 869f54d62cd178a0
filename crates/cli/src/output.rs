//! Output gating
//!
//! Non-essential output is dropped in quiet mode; errors, validation
//! findings, and machine-readable documents are always printed.

pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print a non-essential line, dropped in quiet mode
    pub fn say(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    /// Print a non-essential block without adding a trailing newline
    pub fn write(&self, block: &str) {
        if !self.quiet {
            print!("{block}");
        }
    }
}
