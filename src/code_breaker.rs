use rand::Rng;

/// Syntax characters a line can lose, one occurrence at a time so the
/// puzzle stays solvable.
const SYNTAX_CHARS: [char; 9] = [';', '(', ')', '{', '}', '[', ']', ',', ':'];

/// Operator/keyword substitutions. First match wins, one per line.
const SUBSTITUTIONS: [(&str, &str); 11] = [
    ("===", "=="),
    ("==", "="),
    ("const", "let"),
    ("let", "var"),
    ("true", "false"),
    ("false", "true"),
    ("import", "require"),
    ("export", "module.exports"),
    ("=>", ">"),
    ("+", "-"),
    ("-", "+"),
];

fn is_trivial_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() < 3 || trimmed.starts_with("//") || trimmed.starts_with("/*")
}

fn replace_once(line: &str, needle: &str, replacement: &str) -> String {
    line.replacen(needle, replacement, 1)
}

fn break_line<R: Rng>(line: &str, rng: &mut R) -> String {
    let mut broken = line.to_string();

    // Strip one occurrence of a randomly chosen syntax character.
    if rng.gen::<f64>() > 0.6 {
        let candidate = SYNTAX_CHARS[rng.gen_range(0..SYNTAX_CHARS.len())];
        if broken.contains(candidate) {
            broken = replace_once(&broken, &candidate.to_string(), " ");
        }
    }

    // Substitute one operator or keyword pair.
    for (needle, replacement) in SUBSTITUTIONS {
        if broken.contains(needle) && rng.gen::<f64>() > 0.8 {
            broken = replace_once(&broken, needle, replacement);
            break;
        }
    }

    // Blank out one short token.
    if rng.gen::<f64>() > 0.8 {
        let tokens: Vec<&str> = broken
            .split_whitespace()
            .filter(|token| (3..=6).contains(&token.len()))
            .collect();
        if !tokens.is_empty() {
            let token = tokens[rng.gen_range(0..tokens.len())];
            broken = replace_once(&broken, token, &" ".repeat(token.len()));
        }
    }

    broken
}

/// Produces a buggy starting point for fix mode: each non-trivial line may
/// lose a syntax character, have an operator swapped, or have a short token
/// blanked. Blank lines and full-line comments are left alone. The contract
/// is "a solvable, visibly different variant", not byte-exact
/// reproducibility, but at least one modification is guaranteed for any
/// non-trivial snippet.
pub fn break_code<R: Rng>(code: &str, rng: &mut R) -> String {
    let broken_lines: Vec<String> = code
        .split('\n')
        .map(|line| {
            if is_trivial_line(line) {
                line.to_string()
            } else {
                break_line(line, rng)
            }
        })
        .collect();

    let mut result = broken_lines.join("\n");

    // Chance left every line untouched: force one removal so the puzzle is
    // never already solved.
    if result == code && code.len() > 5 {
        if let Some(index) = result.rfind(';').or_else(|| result.rfind('(')) {
            result.replace_range(index..index + 1, " ");
        }
    }

    result
}
