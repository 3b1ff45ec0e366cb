//! Named-placeholder binding for WHERE-clause text.
//!
//! Predicate text references parameters as `:name` tokens. Before execution
//! the text is rewritten to the driver's positional `?N` markers and the
//! registered bindings are ordered to match. A lightweight state machine
//! skips placeholders inside quoted strings and comments.

use std::collections::HashMap;

use crate::error::DbStorageError;
use crate::types::ValueBinding;

#[derive(Clone)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn scan_ident(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && is_ident_byte(bytes[idx]) {
        idx += 1;
    }
    idx
}

/// Rewrite `:identifier` tokens to `?N` and order `bindings` to match.
///
/// Repeated names share one positional slot. Tokens inside string literals
/// and comments pass through untouched, as does the `::` operator.
///
/// # Errors
///
/// Returns `DbStorageError::ProtocolError` when a placeholder has no
/// registered binding.
pub(crate) fn bind_named_placeholders(
    sql: &str,
    bindings: &[(String, ValueBinding)],
) -> Result<(String, Vec<ValueBinding>), DbStorageError> {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len() + 8);
    let mut ordered: Vec<ValueBinding> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    let mut state = State::Normal;
    let mut idx = 0;
    // Start of the pending passthrough segment; copied verbatim on each
    // placeholder boundary so multi-byte text survives untouched.
    let mut seg_start = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'-' if bytes.get(idx + 1) == Some(&b'-') => state = State::LineComment,
                b'/' if bytes.get(idx + 1) == Some(&b'*') => state = State::BlockComment(1),
                b':' if bytes.get(idx + 1) == Some(&b':') => {
                    idx += 2;
                    continue;
                }
                b':' if bytes.get(idx + 1).copied().is_some_and(is_ident_start) => {
                    let end = scan_ident(bytes, idx + 1);
                    let name = &sql[idx + 1..end];

                    out.push_str(&sql[seg_start..idx]);
                    let position = match positions.get(name) {
                        Some(&position) => position,
                        None => {
                            let Some((_, value)) =
                                bindings.iter().find(|binding| binding.0 == name)
                            else {
                                return Err(DbStorageError::ProtocolError(format!(
                                    "no parameter bound for placeholder :{name}"
                                )));
                            };
                            ordered.push(value.clone());
                            positions.insert(name, ordered.len());
                            ordered.len()
                        }
                    };
                    out.push('?');
                    out.push_str(&position.to_string());

                    idx = end;
                    seg_start = end;
                    continue;
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if b == b'/' && bytes.get(idx + 1) == Some(&b'*') {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if b == b'*' && bytes.get(idx + 1) == Some(&b'/') {
                    if depth == 1 {
                        state = State::Normal;
                    } else {
                        state = State::BlockComment(depth - 1);
                    }
                    idx += 1;
                }
            }
        }
        idx += 1;
    }
    out.push_str(&sql[seg_start..]);

    Ok((out, ordered))
}
