//! Positional brace templates used by `FORMAT_VALUE`.

use serde_json::Value;

/// Failure while expanding a positional template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("single '{{' encountered in format string")]
    UnmatchedOpen,

    #[error("single '}}' encountered in format string")]
    UnmatchedClose,

    #[error("replacement index {0} out of range for positional args")]
    IndexOutOfRange(usize),

    #[error("cannot switch between automatic and manual field numbering")]
    MixedNumbering,

    #[error("unsupported replacement field '{{{0}}}'")]
    UnsupportedField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Auto,
    Manual,
}

/// Expand `{}` / `{N}` fields in `template` with `args`.
///
/// `{{` and `}}` produce literal braces. Strings are inserted verbatim, every
/// other value as compact JSON text.
pub fn format_positional(template: &str, args: &[Value]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut numbering: Option<Numbering> = None;
    let mut next_auto = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut field = String::new();
                let mut closed = false;
                for fc in chars.by_ref() {
                    match fc {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(FormatError::UnsupportedField(field)),
                        _ => field.push(fc),
                    }
                }
                if !closed {
                    return Err(FormatError::UnmatchedOpen);
                }

                let index = if field.is_empty() {
                    if numbering == Some(Numbering::Manual) {
                        return Err(FormatError::MixedNumbering);
                    }
                    numbering = Some(Numbering::Auto);
                    next_auto += 1;
                    next_auto - 1
                } else if field.bytes().all(|b| b.is_ascii_digit()) {
                    if numbering == Some(Numbering::Auto) {
                        return Err(FormatError::MixedNumbering);
                    }
                    numbering = Some(Numbering::Manual);
                    field
                        .parse::<usize>()
                        .map_err(|_| FormatError::UnsupportedField(field.clone()))?
                } else {
                    return Err(FormatError::UnsupportedField(field));
                };

                let arg = args.get(index).ok_or(FormatError::IndexOutOfRange(index))?;
                match arg {
                    Value::String(s) => out.push_str(s),
                    other => out.push_str(&other.to_string()),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(FormatError::UnmatchedClose);
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}
