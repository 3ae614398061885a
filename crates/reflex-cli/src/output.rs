//! Colored terminal output
//!
//! Styled writes on top of `termcolor`. Write errors are ignored.

use std::io::Write;

use clap::ValueEnum;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Value of the `--color` flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `NO_COLOR` overrides the flag
    pub fn choice(self) -> ColorChoice {
        if std::env::var_os("NO_COLOR").is_some() {
            return ColorChoice::Never;
        }
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

/// Styled writer over stdout
pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn styled(&mut self, text: &str, color: Option<Color>, bold: bool) {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        let _ = self.stdout.set_color(&spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Bold heading on its own line
    pub fn heading(&mut self, text: &str) {
        self.styled(text, None, true);
        self.newline();
    }

    /// Class or member name
    pub fn name(&mut self, text: &str) {
        self.styled(text, Some(Color::Cyan), true);
    }

    /// Type names and signatures
    pub fn type_name(&mut self, text: &str) {
        self.styled(text, Some(Color::Green), false);
    }

    /// Secondary text such as descriptions
    pub fn dim(&mut self, text: &str) {
        self.styled(text, Some(Color::White), false);
    }

    pub fn warning(&mut self, text: &str) {
        self.styled(text, Some(Color::Yellow), true);
    }

    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    /// Aligned `key: value` line
    pub fn field(&mut self, key: &str, value: &str) {
        self.styled(&format!("  {:<12}", format!("{}:", key)), None, true);
        self.plain(value);
        self.newline();
    }

    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}
