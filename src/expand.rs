use crate::model::EnvMap;

/// A `$` reference found while scanning a value.
struct Placeholder {
    /// `$(` opens a command substitution, which is never expanded.
    paren: bool,
    name: Option<(usize, usize)>,
    end: usize,
}

/// Expand `$NAME`, `${NAME}` references against the entries defined so far.
///
/// Unbound names expand to an empty string. `\$` and `$(` suppress expansion.
/// Substituted text is not scanned again.
pub(crate) fn expand_variables(input: &str, defined: &EnvMap) -> String {
    if !input.contains('$') {
        return input.to_owned();
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0usize;
    let mut idx = 0usize;

    while idx < bytes.len() {
        let escaped = bytes[idx] == b'\\' && bytes.get(idx + 1) == Some(&b'$');
        if bytes[idx] != b'$' && !escaped {
            idx += 1;
            continue;
        }

        let dollar = if escaped { idx + 1 } else { idx };
        let placeholder = scan_placeholder(bytes, dollar);
        let token = &input[idx..placeholder.end];

        out.push_str(&input[cursor..idx]);
        if escaped {
            out.push_str(&token[1..]);
        } else if placeholder.paren {
            out.push_str(token);
        } else if let Some((name_start, name_end)) = placeholder.name {
            out.push_str(defined.get(&input[name_start..name_end]).unwrap_or_default());
        } else {
            out.push_str(token);
        }

        cursor = placeholder.end;
        idx = placeholder.end;
    }

    out.push_str(&input[cursor..]);
    out
}

fn scan_placeholder(bytes: &[u8], dollar: usize) -> Placeholder {
    let mut pos = dollar + 1;

    let paren = bytes.get(pos) == Some(&b'(');
    if paren {
        pos += 1;
    }
    if bytes.get(pos) == Some(&b'{') {
        pos += 1;
    }

    let name_start = pos;
    while pos < bytes.len() && is_name_byte(bytes[pos]) {
        pos += 1;
    }
    let name = (pos > name_start).then_some((name_start, pos));

    if bytes.get(pos) == Some(&b'}') {
        pos += 1;
    }

    Placeholder {
        paren,
        name,
        end: pos,
    }
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_uppercase() || byte.is_ascii_digit() || byte == b'_'
}
