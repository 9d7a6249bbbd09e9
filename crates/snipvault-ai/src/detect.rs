//! Local heuristic language detection.
//!
//! Used as the fallback path when snippet-detail generation fails: a
//! fixed, ordered keyword table is scanned and the first language whose
//! any-of keyword list matches wins. Anything unmatched is `"text"`.

/// Language returned when no keyword matches.
pub const UNKNOWN_LANGUAGE: &str = "text";

/// Ordered detection table. Order matters: earlier rows win ties, so the
/// more distinctive markers come first.
const KEYWORD_TABLE: &[(&str, &[&str])] = &[
    ("rust", &["fn main", "let mut ", "impl ", "::<", "println!"]),
    ("python", &["def ", "import ", "print(", "elif "]),
    ("go", &["func ", "package ", ":= "]),
    ("java", &["public class ", "System.out", "public static void"]),
    ("javascript", &["function ", "const ", "let ", "=> ", "console.log"]),
    ("sql", &["SELECT ", "INSERT INTO ", "CREATE TABLE"]),
    ("html", &["<html", "<div", "<!DOCTYPE"]),
    ("shell", &["#!/bin/sh", "#!/bin/bash", "echo "]),
    ("c", &["#include <", "int main("]),
];

/// Guess the language of a code fragment from keyword presence.
pub fn detect_language(code: &str) -> &'static str {
    for (language, keywords) in KEYWORD_TABLE {
        if keywords.iter().any(|k| code.contains(k)) {
            return language;
        }
    }
    UNKNOWN_LANGUAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_python() {
        assert_eq!(detect_language("def greet():\n    print('hi')"), "python");
    }

    #[test]
    fn test_detects_javascript() {
        assert_eq!(detect_language("const x = () => 42;"), "javascript");
    }

    #[test]
    fn test_detects_rust() {
        assert_eq!(detect_language("fn main() { println!(\"hi\"); }"), "rust");
    }

    #[test]
    fn test_detects_sql() {
        assert_eq!(detect_language("SELECT * FROM snippet"), "sql");
    }

    #[test]
    fn test_first_match_wins() {
        // Contains both python and javascript markers; python is earlier.
        let code = "import foo\nconst x = 1";
        assert_eq!(detect_language(code), "python");
    }

    #[test]
    fn test_unknown_defaults_to_text() {
        assert_eq!(detect_language("just some prose"), UNKNOWN_LANGUAGE);
        assert_eq!(detect_language(""), UNKNOWN_LANGUAGE);
    }
}
