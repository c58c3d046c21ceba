//! Coincidencia de nombres al estilo shell (`*`, `?`), como la usan las
//! listas de recuperación y el parser (`gs_*-*.out`).
use regex::Regex;

/// Compila un patrón glob a una regex anclada.
pub fn compile(pattern: &str) -> Regex {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    re.push('$');
    // sólo literales escapados y comodines traducidos: siempre es una regex válida
    Regex::new(&re).unwrap_or_else(|_| unreachable!("escaped glob is a valid regex"))
}

/// Filtra `names` con `pattern`, preservando el orden de entrada.
pub fn filter<'a, I>(pattern: &str, names: I) -> Vec<String>
    where I: IntoIterator<Item = &'a String>
{
    let re = compile(pattern);
    names.into_iter().filter(|n| re.is_match(n)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, name: &str) -> bool {
        compile(pattern).is_match(name)
    }

    #[test]
    fn output_pattern() {
        assert!(matches("gs_*-*.out", "gs_scf-fb.out"));
        assert!(matches("gs_*-*.out", "gs_dos-fb.out"));
        assert!(!matches("gs_*-*.out", "gs_scf.out"));
        assert!(!matches("gs_*-*.out", "summary"));
        assert!(!matches("gs_*-*.out", "xgs_scf-fb.out"));
    }

    #[test]
    fn dots_are_literal() {
        assert!(matches("olcao.dat", "olcao.dat"));
        assert!(!matches("olcao.dat", "olcaoXdat"));
        assert!(matches("file?.txt", "file1.txt"));
    }

    #[test]
    fn filter_keeps_order() {
        let names = vec!["gs_dos-fb.out".to_string(), "summary".to_string(), "gs_scf-fb.out".to_string()];
        assert_eq!(filter("gs_*-*.out", &names), vec!["gs_dos-fb.out", "gs_scf-fb.out"]);
    }
}
