use console::style;

/// Styled terminal output for command results
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress everything except errors
    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn header(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold().underlined());
        }
    }

    /// Aligned `label: value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if !self.quiet {
            println!("  {:<16} {}", style(format!("{}:", label)).dim(), value);
        }
    }

    /// Existence-marked path line
    pub fn path(&self, label: &str, path: &std::path::Path, exists: bool) {
        if !self.quiet {
            let mark = if exists {
                style("✓").green()
            } else {
                style("✗").red()
            };
            println!("  {:<8} {} {}", format!("{}:", label), mark, path.display());
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
