use std::borrow::Cow;
use std::io::Read;

use tracing::{debug, trace};

use crate::error::{Error, ParseError, ParseErrorKind};
use crate::expand::expand_variables;
use crate::model::EnvMap;

/// Parse dotenv text into an ordered mapping.
///
/// On a malformed line the returned [`ParseError`] carries the entries parsed
/// before it.
pub fn parse_str(input: &str) -> Result<EnvMap, ParseError> {
    parse_lines(input.lines())
}

/// Parse dotenv entries from UTF-8 bytes.
pub fn parse_bytes(input: &[u8]) -> Result<EnvMap, Error> {
    let text = std::str::from_utf8(input)?;
    parse_str(text).map_err(Error::from)
}

/// Parse dotenv entries from a reader.
pub fn parse_reader<R: Read>(mut reader: R) -> Result<EnvMap, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes(&buf)
}

/// Parse an already split sequence of lines.
///
/// Each line is expanded against the entries of the lines before it, so a
/// reference to a key defined further down resolves to an empty string.
pub fn parse_lines<I>(lines: I) -> Result<EnvMap, ParseError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut map = EnvMap::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let line_num = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        if is_ignored_line(line) {
            continue;
        }

        match parse_line(line, &map) {
            Ok((key, value)) => {
                trace!(line = line_num, key = %key, "parsed entry");
                map.insert(key, value);
            }
            Err(kind) => {
                debug!(line = line_num, %kind, kept = map.len(), "stopping at malformed line");
                return Err(ParseError::new(line_num, kind, map));
            }
        }
    }

    Ok(map)
}

fn is_ignored_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn parse_line(line: &str, defined: &EnvMap) -> Result<(String, String), ParseErrorKind> {
    if line.is_empty() {
        return Err(ParseErrorKind::EmptyLine);
    }

    let line = strip_comment(line);
    let Some((raw_key, raw_value)) = split_assignment(&line) else {
        return Err(ParseErrorKind::MissingSeparator);
    };

    let key = normalize_key(raw_key);
    if key.is_empty() {
        return Err(ParseErrorKind::MissingKey);
    }

    Ok((key.to_owned(), parse_value(raw_value, defined)))
}

/// Drop a trailing `#` comment unless the `#` sits inside an open quote.
///
/// A `#`-separated segment with exactly one `"` or `'` opens or closes a
/// quoted span.
fn strip_comment(line: &str) -> Cow<'_, str> {
    if !line.contains('#') {
        return Cow::Borrowed(line);
    }

    let mut quote_open = false;
    let mut kept = Vec::new();
    for segment in line.split('#') {
        if has_lone_quote(segment) {
            if quote_open {
                quote_open = false;
                kept.push(segment);
            } else {
                quote_open = true;
            }
        }

        if kept.is_empty() || quote_open {
            kept.push(segment);
        }
    }

    Cow::Owned(kept.join("#"))
}

fn has_lone_quote(segment: &str) -> bool {
    let (mut double, mut single) = (0usize, 0usize);
    for byte in segment.bytes() {
        match byte {
            b'"' => double += 1,
            b'\'' => single += 1,
            _ => {}
        }
    }
    double == 1 || single == 1
}

/// Split on `:` when it comes before any `=` (YAML style), else on `=`.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let separator = match (line.find('='), line.find(':')) {
        (Some(equals), Some(colon)) if colon < equals => ':',
        (None, Some(_)) => ':',
        _ => '=',
    };
    line.split_once(separator)
}

fn normalize_key(raw: &str) -> &str {
    let key = raw.trim();
    match key.strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => key,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteDialect {
    None,
    Single,
    Double,
}

impl QuoteDialect {
    fn detect(value: &str) -> Self {
        if value.len() < 2 {
            return Self::None;
        }
        match (value.as_bytes()[0], value.as_bytes()[value.len() - 1]) {
            (b'\'', b'\'') => Self::Single,
            (b'"', b'"') => Self::Double,
            _ => Self::None,
        }
    }
}

fn parse_value(raw: &str, defined: &EnvMap) -> String {
    let value = raw.trim_matches(' ');
    if value.len() <= 1 {
        return value.to_owned();
    }

    match QuoteDialect::detect(value) {
        QuoteDialect::Single => value[1..value.len() - 1].to_owned(),
        QuoteDialect::Double => {
            let unescaped = unescape_double_quoted(&value[1..value.len() - 1]);
            expand_variables(&unescaped, defined)
        }
        QuoteDialect::None => expand_variables(value, defined),
    }
}

/// Decode escapes inside a double-quoted value.
///
/// `\$` keeps its backslash so expansion still sees the escape.
fn unescape_double_quoted(inner: &str) -> String {
    if !inner.contains('\\') {
        return inner.to_owned();
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('$') => out.push_str("\\$"),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
