use clap::ValueEnum;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

/// User-facing command output. Human mode prints decorated lines; JSON modes
/// print one object per message so scripts can consume them.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn is_json(&self) -> bool {
        self.format != OutputFormat::Human
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn message(&self, kind: &str, marker: String, msg: &str) {
        if self.is_json() {
            self.print_json(&json!({"type": kind, "message": msg}));
        } else if marker.is_empty() {
            println!("{}", msg);
        } else {
            println!("{} {}", marker, msg);
        }
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            self.message("success", "✓".green().to_string(), msg.as_ref());
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            self.message("info", String::new(), msg.as_ref());
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if !self.quiet {
            self.message("warning", "⚠".yellow().to_string(), msg.as_ref());
        }
    }

    /// Always shown, even in quiet mode
    pub fn error(&self, msg: impl AsRef<str>) {
        if self.is_json() {
            self.print_json(&json!({"type": "error", "message": msg.as_ref()}));
        } else {
            eprintln!("{} {}", "✗".red(), msg.as_ref());
        }
    }

    pub fn table(&self, table: &Table) {
        if !self.quiet && !self.is_json() {
            println!("{}", table);
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.is_json() {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default())
            }
            _ => println!("{}", serde_json::to_string(data).unwrap_or_default()),
        }
    }
}
