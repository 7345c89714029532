//! Error reporting for configuration files
//!
//! Turns config errors into messages that point at the offending line of
//! the TOML source.

use crate::config::ConfigError;

/// Format a config error with context from the source text
pub fn format_config_error(error: &ConfigError, source: &str) -> String {
    match error {
        ConfigError::Parse(parse) => {
            let mut msg = format!("Config error: {}", parse.message());
            if let Some(span) = parse.span() {
                let line = line_of_offset(source, span.start);
                if let Some(text) = source.lines().nth(line) {
                    msg.push_str(&format!("\n  at line {}: {}", line + 1, text));
                }
            }
            msg
        }
        other => format!("Config error: {}", other),
    }
}

/// Zero-based line number containing byte `offset`
fn line_of_offset(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count()
}
