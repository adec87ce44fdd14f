//! Shell-style variable expansion for statement tokens

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("unterminated `${{` in `{0}`")]
    Unterminated(String),
    #[error("bad substitution `${{{expression}}}` in `{input}`")]
    BadSubstitution { expression: String, input: String },
}

/// Something that can answer variable lookups during expansion.
pub trait VariableSource {
    fn lookup(&mut self, name: &str) -> Option<String>;
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Expand `$NAME` and `${...}` references in `input`.
///
/// Unset variables expand to the empty string. `\$` yields a literal dollar.
///
/// # Errors
///
/// Returns `ExpandError` for an unterminated `${` or an unsupported
/// `${...}` form.
pub fn expand(input: &str, vars: &mut impl VariableSource) -> Result<String, ExpandError> {
    if !input.contains('$') {
        return Ok(input.to_string());
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some((_, '$'))) => {
                out.push('$');
                chars.next();
            }
            '$' => match chars.peek().copied() {
                Some((_, '{')) => {
                    chars.next();
                    let start = i + 2;
                    let mut depth = 1;
                    let mut end = None;
                    for (j, ch) in chars.by_ref() {
                        match ch {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    end = Some(j);
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    let end = end.ok_or_else(|| ExpandError::Unterminated(input.to_string()))?;
                    out.push_str(&expand_braced(&input[start..end], input, vars)?);
                }
                Some((_, next)) if is_name_start(next) => {
                    let mut name = String::new();
                    while let Some((_, ch)) = chars.peek().copied() {
                        if !is_name_char(ch) {
                            break;
                        }
                        name.push(ch);
                        chars.next();
                    }
                    out.push_str(&vars.lookup(&name).unwrap_or_default());
                }
                _ => out.push('$'),
            },
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn expand_braced(
    expression: &str,
    input: &str,
    vars: &mut impl VariableSource,
) -> Result<String, ExpandError> {
    let bad = || ExpandError::BadSubstitution {
        expression: expression.to_string(),
        input: input.to_string(),
    };

    if let Some(name) = expression.strip_prefix('#') {
        if name.is_empty() || !name.chars().all(is_name_char) {
            return Err(bad());
        }
        let value = vars.lookup(name).unwrap_or_default();
        return Ok(value.chars().count().to_string());
    }

    let name_len = expression
        .char_indices()
        .find(|(_, c)| !is_name_char(*c))
        .map_or(expression.len(), |(i, _)| i);
    let (name, rest) = expression.split_at(name_len);
    if name.is_empty() || !name.starts_with(is_name_start) {
        return Err(bad());
    }

    let value = vars.lookup(name);
    let (colon, op) = match rest.strip_prefix(':') {
        Some(op) => (true, op),
        None => (false, rest),
    };
    // With `:` an empty value counts as unset.
    let set = match &value {
        Some(v) => !(colon && v.is_empty()),
        None => false,
    };

    if op.is_empty() {
        if colon {
            return Err(bad());
        }
        return Ok(value.unwrap_or_default());
    }

    let Some(operator) = op.chars().next() else {
        return Err(bad());
    };
    let word = &op[operator.len_utf8()..];
    match operator {
        '-' => {
            if set {
                Ok(value.unwrap_or_default())
            } else {
                expand(word, vars)
            }
        }
        '+' => {
            if set {
                expand(word, vars)
            } else {
                Ok(String::new())
            }
        }
        _ => Err(bad()),
    }
}
