//! Context files: one context per line, observables as comma-separated
//! qubit-letter strings.
//!
//! ```text
//! XI,IX,XX
//! IZ,ZI,ZZ
//! ```
//!
//! Lines with fewer than two tokens are skipped, which covers blank lines and
//! headers. The qubit count is the length of the first observable read.

use std::path::Path;

use super::ContextPool;
use crate::error::{Error, Result};
use crate::symplectic::{check_qubits, Observable};

/// Parses context-file text into a pool and its qubit count.
///
/// # Errors
///
/// Returns [`Error::MalformedContextFile`] for an undecodable observable, a
/// length mismatch, or a file with no contexts.
pub fn parse_contexts(text: &str) -> Result<(ContextPool, u32)> {
    let mut n_qubits = None;
    let mut rows: Vec<Vec<Observable>> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let tokens: Vec<&str> = line
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() < 2 {
            continue;
        }
        let n = match n_qubits {
            Some(n) => n,
            None => {
                let n = u32::try_from(tokens[0].chars().count()).map_err(|_| {
                    Error::MalformedContextFile {
                        line: line_no,
                        reason: "observable too long".into(),
                    }
                })?;
                check_qubits(n).map_err(|err| Error::MalformedContextFile {
                    line: line_no,
                    reason: err.to_string(),
                })?;
                *n_qubits.insert(n)
            }
        };
        let row = tokens
            .iter()
            .map(|token| {
                Observable::from_letters(token, n).map_err(|err| Error::MalformedContextFile {
                    line: line_no,
                    reason: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    let n_qubits = n_qubits.ok_or(Error::MalformedContextFile {
        line: 0,
        reason: "no contexts found".into(),
    })?;
    Ok((ContextPool::from_rows(&rows), n_qubits))
}

/// Reads and parses a context file.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, otherwise as [`parse_contexts`].
pub fn read_contexts(path: impl AsRef<Path>) -> Result<(ContextPool, u32)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_contexts(&text)
}

/// Renders contexts in the format [`parse_contexts`] reads.
pub fn write_contexts<'a, I>(contexts: I, n_qubits: u32) -> String
where
    I: IntoIterator<Item = &'a [Observable]>,
{
    let mut out = String::new();
    for points in contexts {
        for (j, obs) in points.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            out.push_str(&obs.letters(n_qubits));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_infers_qubits() {
        let text = "contexts\nXI, IX, XX\n\nIZ,ZI,ZZ\n";
        let (pool, n) = parse_contexts(text).unwrap();
        assert_eq!(n, 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(write_contexts(pool.iter(), n), "XI,IX,XX\nIZ,ZI,ZZ\n");
    }

    #[test]
    fn ragged_rows_are_padded() {
        let (pool, _) = parse_contexts("XXX,ZZZ,YYX,IIY\nXII,IXI\n").unwrap();
        assert_eq!(pool.points_per_context(), 4);
        assert_eq!(pool.get(1).map(<[_]>::len), Some(2));
    }

    #[test]
    fn reports_line_numbers() {
        let err = parse_contexts("XI,IX,XX\nXI,QQ,XX\n").unwrap_err();
        assert!(matches!(err, Error::MalformedContextFile { line: 2, .. }));
        let err = parse_contexts("XI,IX,XX\nXII,IX,XX\n").unwrap_err();
        assert!(matches!(err, Error::MalformedContextFile { line: 2, .. }));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(
            parse_contexts("\n\n"),
            Err(Error::MalformedContextFile { line: 0, .. })
        ));
    }
}
