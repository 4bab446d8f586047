//! Textual circuit serialization.
//!
//! The format is line-oriented:
//!
//! ```text
//! # comment
//! qubits 2
//! prepare 01
//! gate rx [0] [1.5707963]
//! gate cnot [0, 1] []
//! ```
//!
//! Exactly one `qubits` and one `prepare` line are required; gate lines
//! appear in application order. Blank lines and lines starting with `#`
//! are ignored, anything else is a parse error with line context.
//! Round-trips are semantically exact (parameter formatting may differ).

use std::fmt::Write;

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::gate::GateType;
use crate::instance::GateInstance;

/// Serialize a circuit to text.
pub fn to_text(circuit: &Circuit) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "qubits {}", circuit.num_qubits());
    let _ = writeln!(
        out,
        "prepare {:0width$b}",
        circuit.initial_state(),
        width = circuit.num_qubits()
    );
    for gate in circuit.gates() {
        let qubits = gate
            .qubits()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let params = gate
            .params()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "gate {} [{}] [{}]", gate.gate_type().name(), qubits, params);
    }
    out
}

/// Parse a circuit from text.
pub fn from_text(text: &str) -> CircuitResult<Circuit> {
    let mut num_qubits: Option<usize> = None;
    let mut prepare: Option<(usize, &str)> = None;
    let mut gates: Vec<(usize, GateInstance)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("qubits ") {
            if num_qubits.is_some() {
                return Err(parse_error(line, "duplicate 'qubits' statement"));
            }
            let n: usize = rest
                .trim()
                .parse()
                .map_err(|_| parse_error(line, "invalid qubit count"))?;
            if n == 0 {
                return Err(parse_error(line, "qubit count must be positive"));
            }
            num_qubits = Some(n);
        } else if let Some(rest) = trimmed.strip_prefix("prepare ") {
            if prepare.is_some() {
                return Err(parse_error(line, "duplicate 'prepare' statement"));
            }
            let bits = rest.trim();
            if bits.is_empty() || !bits.chars().all(|c| c == '0' || c == '1') {
                return Err(parse_error(line, "prepare expects a binary string"));
            }
            prepare = Some((line, bits));
        } else if let Some(rest) = trimmed.strip_prefix("gate ") {
            gates.push((line, parse_gate(line, rest.trim())?));
        } else {
            return Err(parse_error(line, format!("bad line: {trimmed}")));
        }
    }

    let num_qubits = num_qubits.ok_or(CircuitError::MissingStatement("qubits"))?;
    let (prepare_line, bits) = prepare.ok_or(CircuitError::MissingStatement("prepare"))?;
    if bits.len() != num_qubits {
        return Err(parse_error(
            prepare_line,
            format!("prepare bitstring must have length {num_qubits}"),
        ));
    }
    let initial_state = u64::from_str_radix(bits, 2)
        .map_err(|_| parse_error(prepare_line, "invalid prepare bitstring"))?;

    let mut circuit = Circuit::new(num_qubits, initial_state)?;
    for (line, gate) in gates {
        let index = circuit.len();
        circuit
            .insert(index, gate)
            .map_err(|e| parse_error(line, e.to_string()))?;
    }
    Ok(circuit)
}

fn parse_gate(line: usize, rest: &str) -> CircuitResult<GateInstance> {
    let open = rest
        .find('[')
        .ok_or_else(|| parse_error(line, "gate expects a qubit list"))?;
    let name = rest[..open].trim();
    if name.is_empty() {
        return Err(parse_error(line, "gate expects a type name"));
    }
    let (qubit_body, after) = bracketed(line, &rest[open..])?;
    let (param_body, tail) = bracketed(line, after.trim_start())?;
    if !tail.trim().is_empty() {
        return Err(parse_error(line, "trailing text after gate definition"));
    }

    let gate_type = GateType::by_name(name).map_err(|e| parse_error(line, e.to_string()))?;
    let qubits = parse_list::<usize>(line, qubit_body, "qubit index")?;
    let params = parse_list::<f64>(line, param_body, "parameter")?;
    GateInstance::with_params(gate_type, qubits, params)
        .map_err(|e| parse_error(line, e.to_string()))
}

/// Split `[body] tail` into the bracket body and the remainder.
fn bracketed<'a>(line: usize, s: &'a str) -> CircuitResult<(&'a str, &'a str)> {
    let stripped = s
        .strip_prefix('[')
        .ok_or_else(|| parse_error(line, "expected '['"))?;
    let close = stripped
        .find(']')
        .ok_or_else(|| parse_error(line, "unterminated '['"))?;
    Ok((&stripped[..close], &stripped[close + 1..]))
}

fn parse_list<T: std::str::FromStr>(
    line: usize,
    body: &str,
    what: &str,
) -> CircuitResult<Vec<T>> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(',')
        .map(|item| {
            item.trim()
                .parse()
                .map_err(|_| parse_error(line, format!("invalid {what}: {}", item.trim())))
        })
        .collect()
}

fn parse_error(line: usize, message: impl Into<String>) -> CircuitError {
    CircuitError::Parse {
        line,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# two-qubit sample
qubits 2
prepare 01

gate rx [0] [1.5707963]
gate cnot [0, 1] []
";

    #[test]
    fn test_parse_sample() {
        let circuit = from_text(SAMPLE).unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.initial_state(), 0b01);
        assert_eq!(circuit.len(), 2);
        assert_eq!(circuit.gates()[0].gate_type().name(), "rx");
        assert_eq!(circuit.gates()[0].params(), &[1.5707963]);
        assert_eq!(circuit.gates()[1].qubits(), &[0, 1]);
    }

    #[test]
    fn test_roundtrip_is_semantically_exact() {
        let circuit = from_text(SAMPLE).unwrap();
        let reparsed = from_text(&to_text(&circuit)).unwrap();
        assert_eq!(reparsed.num_qubits(), circuit.num_qubits());
        assert_eq!(reparsed.initial_state(), circuit.initial_state());
        assert_eq!(reparsed.parameters(), circuit.parameters());
        let names: Vec<_> = reparsed
            .gates()
            .iter()
            .map(|g| g.gate_type().name().to_string())
            .collect();
        assert_eq!(names, vec!["rx", "cnot"]);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = from_text("qubits 2\nprepare 00\nbogus line\n").unwrap_err();
        match err {
            CircuitError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("bogus"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_prepare() {
        let err = from_text("qubits 2\n").unwrap_err();
        assert!(matches!(err, CircuitError::MissingStatement("prepare")));
    }

    #[test]
    fn test_missing_qubits() {
        let err = from_text("prepare 01\n").unwrap_err();
        assert!(matches!(err, CircuitError::MissingStatement("qubits")));
    }

    #[test]
    fn test_prepare_length_checked() {
        let err = from_text("qubits 3\nprepare 01\n").unwrap_err();
        assert!(matches!(err, CircuitError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_unknown_gate_has_line_context() {
        let err = from_text("qubits 2\nprepare 00\ngate h [0] []\n").unwrap_err();
        match err {
            CircuitError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains('h'));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_statements_rejected() {
        let err = from_text("qubits 2\nqubits 2\nprepare 00\n").unwrap_err();
        assert!(matches!(err, CircuitError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_block_gate_roundtrip() {
        let text = "qubits 2\nprepare 10\ngate block-a [1, 0] [0.1, 0.2, 0.3, 0.4]\n";
        let circuit = from_text(text).unwrap();
        assert_eq!(circuit.num_parameters(), 4);
        let again = from_text(&to_text(&circuit)).unwrap();
        assert_eq!(again.parameters(), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(again.gates()[0].qubits(), &[1, 0]);
    }
}
