use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::sync::OnceLock;

/// Colors only when stdout is a terminal and `NO_COLOR` is unset.
pub fn colors_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
    })
}

pub fn heading(text: &str) -> String {
    if colors_enabled() {
        text.bold().cyan().to_string()
    } else {
        text.to_string()
    }
}

pub fn dim(text: &str) -> String {
    if colors_enabled() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

pub fn good(text: &str) -> String {
    if colors_enabled() {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn bad(text: &str) -> String {
    if colors_enabled() {
        text.red().bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn warn(text: &str) -> String {
    if colors_enabled() {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}
