//! Recovering a candidate from the translator's mapping comments and the
//! solver's model lines.

use std::path::Path;

use regex::Regex;

use crate::assignment::Candidate;
use crate::error::{Error, Result};

/// Reads `v` lines of a DIMACS model: a positive literal is true, a
/// negative one false, `0` ends the model. Index 0 is unused.
///
/// # Errors
///
/// [`Error::Io`] if the file cannot be read, [`Error::MalformedOutput`] for
/// a token that is not an integer.
pub fn parse_model(path: &Path) -> Result<Vec<bool>> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let mut model = vec![false];
    for (i, line) in text.lines().enumerate() {
        let Some(literals) = line.strip_prefix("v ") else {
            continue;
        };
        for token in literals.split_whitespace() {
            let literal: i64 = token.parse().map_err(|_| Error::MalformedOutput {
                path: path.to_path_buf(),
                line: i + 1,
                text: line.to_owned(),
            })?;
            if literal == 0 {
                continue;
            }
            let var = literal.unsigned_abs() as usize;
            if var >= model.len() {
                model.resize(var + 1, false);
            }
            model[var] = literal > 0;
        }
    }
    Ok(model)
}

/// Matches the translator's `c v<word> <-> <variable>` comments.
#[derive(Debug, Clone)]
pub struct MappingParser {
    pattern: Regex,
}

impl MappingParser {
    /// Compiles the comment pattern.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] if the pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^c v([0-9]+) <-> ([0-9]+)$")?,
        })
    }

    /// Fills `candidate[word] = model[variable]` for every mapping comment in
    /// the circuit file. Other lines are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be read, [`Error::MalformedOutput`]
    /// for a word outside the candidate or a variable outside the model.
    pub fn apply(&self, circuit: &Path, model: &[bool], candidate: &mut Candidate) -> Result<()> {
        let text = std::fs::read_to_string(circuit).map_err(|e| Error::io(circuit, e))?;
        for (i, line) in text.lines().enumerate() {
            let Some(caps) = self.pattern.captures(line.trim_end()) else {
                continue;
            };
            let malformed = || Error::MalformedOutput {
                path: circuit.to_path_buf(),
                line: i + 1,
                text: line.to_owned(),
            };
            let word: usize = caps[1].parse().map_err(|_| malformed())?;
            let var: usize = caps[2].parse().map_err(|_| malformed())?;
            let value = *model.get(var).ok_or_else(malformed)?;
            let slot = candidate.signs_mut().get_mut(word).ok_or_else(malformed)?;
            *slot = value;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::symplectic::Observable;

    #[test]
    fn model_lines_set_literals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.log");
        std::fs::write(&path, "s SATISFIABLE\nv 1 -2 3\nv -4 0\n").unwrap();
        assert_eq!(parse_model(&path).unwrap(), vec![false, true, false, true, false]);
    }

    #[test]
    fn bad_model_token_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.log");
        std::fs::write(&path, "s SATISFIABLE\nv 1 x 0\n").unwrap();
        assert!(matches!(
            parse_model(&path),
            Err(Error::MalformedOutput { line: 2, .. })
        ));
    }

    #[test]
    fn mapping_routes_variables_to_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circuit.cnf");
        std::fs::write(&path, "c v5 <-> 2\nc v9 <-> 1\np cnf 2 1\n1 2 0\n").unwrap();
        let mut candidate = Candidate::all_positive(2).unwrap();
        MappingParser::new()
            .unwrap()
            .apply(&path, &[false, false, true], &mut candidate)
            .unwrap();
        assert!(candidate.sign(Observable::new(5)));
        assert!(!candidate.sign(Observable::new(9)));
        assert_eq!(candidate.negative_signs(), 1);
    }

    #[test]
    fn mapping_past_model_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circuit.cnf");
        std::fs::write(&path, "c v5 <-> 7\n").unwrap();
        let mut candidate = Candidate::all_positive(2).unwrap();
        assert!(matches!(
            MappingParser::new().unwrap().apply(&path, &[false, true], &mut candidate),
            Err(Error::MalformedOutput { line: 1, .. })
        ));
    }
}
