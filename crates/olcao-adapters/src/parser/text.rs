//! Extracción por regex de campos de un output OLCAO.
//!
//! Cada campo se busca de forma independiente (case-insensitive). Sin match,
//! o con un número que no parsea, el campo queda ausente; nunca es error.
use once_cell::sync::Lazy;
use regex::Regex;

use olcao_core::constants::ERROR_EXCERPT_MAX_CHARS;
use olcao_core::model::ParsedOutput;

const NUMBER: &str = r"([-+]?\d+(?:\.\d+)?(?:[eE][-+]?\d+)?)";

fn re(pattern: &str) -> Regex {
    // patrones constantes: un fallo aquí es un bug de compilación del patrón
    Regex::new(&format!("(?i){pattern}")).expect("valid constant regex")
}

static TOTAL_ENERGY: Lazy<Regex> = Lazy::new(|| re(&format!(r"\bTOTAL[\s_]+ENERGY\s*[=:]\s*{NUMBER}")));
static FERMI_ENERGY: Lazy<Regex> = Lazy::new(|| re(&format!(r"\bFERMI[\s_]+ENERGY\s*[=:]\s*{NUMBER}")));
static NUM_ATOMS: Lazy<Regex> = Lazy::new(|| re(r"(?:NUM(?:BER)?[\s_]*(?:OF)?[\s_]*ATOMS|ATOMS)\s*[=:]\s*(\d+)"));
static NUM_ELECTRONS: Lazy<Regex> =
    Lazy::new(|| re(r"(?:NUM(?:BER)?[\s_]*(?:OF)?[\s_]*ELECTRONS|ELECTRONS)\s*[=:]\s*([-+]?\d+(?:\.\d+)?)"));
static ITERATION: Lazy<Regex> = Lazy::new(|| re(r"\bITER(?:ATION)?[\s_]*[=:#]?\s*(\d+)"));
static BAND_GAP: Lazy<Regex> = Lazy::new(|| re(&format!(r"\bBAND[\s_]*GAP\s*[=:]\s*{NUMBER}")));

/// Indicadores de convergencia en orden de precedencia; gana el primero que
/// aparece (los negativos van antes).
static CONVERGENCE: Lazy<Vec<(Regex, bool)>> = Lazy::new(|| {
    vec![(re(r"\bNOT\s+CONVERGED\b"), false),
         (re(r"\bCONVERGENCE\s+NOT\s+(?:REACHED|ACHIEVED)\b"), false),
         (re(r"\b(?:SCF\s+)?CONVERGED\b"), true),
         (re(r"\bCONVERGENCE\s+(?:REACHED|ACHIEVED)\b"), true)]
});

static ERROR_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"ERROR\s*:", r"FATAL\s+ERROR", r"SCF\s+FAILED", r"CALCULATION\s+FAILED"].into_iter()
                                                                               .map(re)
                                                                               .collect()
});

fn capture<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Extracto desde el inicio del match hasta la siguiente línea en blanco
/// (o fin del texto), recortado a `ERROR_EXCERPT_MAX_CHARS` caracteres.
fn error_excerpt(text: &str, start: usize) -> String {
    let rest = &text[start..];
    let end = rest.find("\n\n").unwrap_or(rest.len());
    rest[..end].chars().take(ERROR_EXCERPT_MAX_CHARS).collect()
}

pub fn parse_olcao_output(text: &str) -> ParsedOutput {
    let mut out = ParsedOutput::default();

    if let Some(v) = capture(&TOTAL_ENERGY, text).and_then(|s| s.parse().ok()) {
        out.total_energy = Some(v);
        out.total_energy_units = Some("Hartree".into());
    }
    if let Some(v) = capture(&FERMI_ENERGY, text).and_then(|s| s.parse().ok()) {
        out.fermi_energy = Some(v);
        out.fermi_energy_units = Some("Hartree".into());
    }
    out.num_atoms = capture(&NUM_ATOMS, text).and_then(|s| s.parse().ok());
    out.num_electrons = capture(&NUM_ELECTRONS, text).and_then(|s| s.parse().ok());
    out.num_iterations = ITERATION.captures_iter(text)
                                  .filter_map(|c| c.get(1).and_then(|m| m.as_str().parse::<u64>().ok()))
                                  .max();
    out.converged = CONVERGENCE.iter().find(|(regex, _)| regex.is_match(text)).map(|(_, flag)| *flag);
    if let Some(v) = capture(&BAND_GAP, text).and_then(|s| s.parse().ok()) {
        out.band_gap = Some(v);
        out.band_gap_units = Some("eV".into());
    }
    if let Some(m) = ERROR_MARKERS.iter().find_map(|regex| regex.find(text)) {
        out.has_error = Some(true);
        out.error_message = Some(error_excerpt(text, m.start()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typical_scf_output() {
        let text = "OLCAO run\nNumber of atoms: 8\nNUM_ELECTRONS = 32.0\n\
                    Iteration 1\nIteration 2\nIteration 12\n\
                    TOTAL ENERGY = -301.234567\nFermi energy: 0.123\nSCF converged\n";
        let p = parse_olcao_output(text);
        assert_eq!(p.total_energy, Some(-301.234567));
        assert_eq!(p.total_energy_units.as_deref(), Some("Hartree"));
        assert_eq!(p.fermi_energy, Some(0.123));
        assert_eq!(p.num_atoms, Some(8));
        assert_eq!(p.num_electrons, Some(32.0));
        assert_eq!(p.num_iterations, Some(12));
        assert_eq!(p.converged, Some(true));
        assert_eq!(p.has_error, None);
    }

    #[test]
    fn iterations_take_the_maximum_not_the_last() {
        let p = parse_olcao_output("ITER 3\nITER# 40\nITER: 7\n");
        assert_eq!(p.num_iterations, Some(40));
    }

    #[test]
    fn negative_convergence_wins() {
        assert_eq!(parse_olcao_output("SCF converged? no: NOT CONVERGED").converged, Some(false));
        assert_eq!(parse_olcao_output("convergence not reached").converged, Some(false));
        assert_eq!(parse_olcao_output("Convergence achieved").converged, Some(true));
        assert_eq!(parse_olcao_output("nothing to see").converged, None);
    }

    #[test]
    fn exponent_numbers_and_band_gap() {
        let p = parse_olcao_output("total_energy: -1.5E+02\nBand gap = 5.47\n");
        assert_eq!(p.total_energy, Some(-150.0));
        assert_eq!(p.band_gap, Some(5.47));
        assert_eq!(p.band_gap_units.as_deref(), Some("eV"));
    }

    #[test]
    fn error_excerpt_stops_at_blank_line() {
        let text = "start\nFATAL ERROR in diag\nmatrix singular\n\nlater text";
        let p = parse_olcao_output(text);
        assert_eq!(p.has_error, Some(true));
        assert_eq!(p.error_message.as_deref(), Some("FATAL ERROR in diag\nmatrix singular"));
    }

    #[test]
    fn error_excerpt_is_truncated() {
        let text = format!("Error: {}", "x".repeat(2000));
        let msg = parse_olcao_output(&text).error_message.unwrap();
        assert_eq!(msg.chars().count(), 500);
        assert!(msg.starts_with("Error: "));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(parse_olcao_output("").is_empty());
    }
}
