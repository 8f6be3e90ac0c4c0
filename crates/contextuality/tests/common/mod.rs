//! In-process SAT back end for the scenario tests.
//!
//! Reads the circuit text the exact solver emits, enumerates every assignment
//! of its variables, and writes mapping comments and model lines in the same
//! shape the external translator and solver produce.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};

use contextuality::solver::exact::{SatPipeline, SatStatus, ScratchFiles};
use contextuality::{CancelFlag, Error, Result};
use parking_lot::Mutex;
use regex::Regex;

/// Exhaustive search over at most this many variables.
const MAX_VARIABLES: usize = 22;

#[derive(Debug, Default)]
pub struct BruteForcePipeline {
    problems: Mutex<Vec<String>>,
    /// Set the flag after this many calls.
    cancel_after: Option<(usize, CancelFlag)>,
    calls: AtomicUsize,
}

impl BruteForcePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(calls: usize, flag: CancelFlag) -> Self {
        Self {
            cancel_after: Some((calls, flag)),
            ..Self::default()
        }
    }

    /// Every problem text received, in order.
    pub fn problems(&self) -> Vec<String> {
        self.problems.lock().clone()
    }
}

struct Gate {
    mask: u32,
    odd: bool,
}

impl SatPipeline for BruteForcePipeline {
    fn solve(&self, problem: &str, files: &ScratchFiles) -> Result<SatStatus> {
        self.problems.lock().push(problem.to_owned());
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, flag)) = &self.cancel_after {
            if calls >= *after {
                flag.cancel();
            }
        }

        assert!(problem.starts_with("BC1.1\nASSIGN "), "{problem}");
        let envelope = Regex::new(r"ASSIGN \[(\d+),(\d+)\]\(").unwrap();
        let gate = Regex::new(r"(EVEN|ODD)\(([^)]*)\)").unwrap();
        let trivial = Regex::new(r"(?m)T$").unwrap();

        let mut words: Vec<u32> = Vec::new();
        let mut gates = Vec::new();
        for caps in gate.captures_iter(problem) {
            let mut mask = 0u32;
            for var in caps[2].split(',') {
                let word: u32 = var.trim_start_matches('v').parse().unwrap();
                let slot = match words.iter().position(|&w| w == word) {
                    Some(slot) => slot,
                    None => {
                        words.push(word);
                        words.len() - 1
                    }
                };
                mask ^= 1 << slot;
            }
            gates.push(Gate {
                mask,
                odd: &caps[1] == "ODD",
            });
        }
        assert!(words.len() <= MAX_VARIABLES, "too many variables to enumerate");
        let always = trivial.find_iter(problem).count();
        let total = gates.len() + always;
        let needed = match envelope.captures(problem) {
            Some(caps) => {
                assert_eq!(caps[2].parse::<usize>().unwrap(), total);
                caps[1].parse::<usize>().unwrap()
            }
            None => total,
        };

        let model = (0u32..1 << words.len()).find(|&bits| {
            let satisfied = gates
                .iter()
                .filter(|g| ((g.mask & bits).count_ones() % 2 == 1) == g.odd)
                .count();
            satisfied + always >= needed
        });

        let mut circuit = String::new();
        for (slot, word) in words.iter().enumerate() {
            writeln!(circuit, "c v{word} <-> {}", slot + 1).unwrap();
        }
        writeln!(circuit, "p cnf {} 0", words.len()).unwrap();
        std::fs::write(files.circuit(), circuit).map_err(|e| Error::Io {
            path: files.circuit().to_path_buf(),
            source: e,
        })?;

        let mut log = String::new();
        match model {
            Some(bits) => {
                log.push_str("s SATISFIABLE\nv");
                for slot in 0..words.len() {
                    let var = slot as i64 + 1;
                    let literal = if bits >> slot & 1 == 1 { var } else { -var };
                    write!(log, " {literal}").unwrap();
                }
                log.push_str(" 0\n");
            }
            None => log.push_str("s UNSATISFIABLE\n"),
        }
        std::fs::write(files.log(), log).map_err(|e| Error::Io {
            path: files.log().to_path_buf(),
            source: e,
        })?;

        Ok(if model.is_some() {
            SatStatus::Sat
        } else {
            SatStatus::Unsat
        })
    }
}

/// A back end whose solver always exits with an unexpected status.
#[derive(Debug, Default)]
pub struct BrokenPipeline;

impl SatPipeline for BrokenPipeline {
    fn solve(&self, _problem: &str, _files: &ScratchFiles) -> Result<SatStatus> {
        Err(Error::ToolStatus {
            tool: "kissat".into(),
            status: "exit status: 1".into(),
        })
    }
}
