use crate::error::RenderError;
use crate::model::EnvMap;
use crate::parser::parse_str;

/// Render one entry as a dotenv line that parses back to the same value.
///
/// The bare form is preferred, then single quotes, then double quotes with
/// escapes. A form is only returned once parsing it reproduces exactly
/// `key` and `value`, so the line holds no `$NAME` reference and reads the
/// same wherever it is placed in a file.
pub fn render_line(key: &str, value: &str) -> Result<String, RenderError> {
    let candidates = [
        format!("{key}={value}"),
        format!("{key}='{value}'"),
        format!("{key}={}", double_quoted(value)),
    ];

    candidates
        .into_iter()
        .find(|line| reproduces(line, key, value))
        .ok_or_else(|| RenderError {
            key: key.to_owned(),
        })
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn reproduces(line: &str, key: &str, value: &str) -> bool {
    match parse_str(line) {
        Ok(parsed) => parsed.len() == 1 && parsed.get(key) == Some(value),
        Err(_) => false,
    }
}

impl EnvMap {
    /// Render every entry in map order, one `KEY=value` line each.
    ///
    /// Fails on the first entry that [`render_line`] cannot write.
    pub fn to_dotenv(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push_str(&render_line(key, value)?);
            out.push('\n');
        }
        Ok(out)
    }
}
