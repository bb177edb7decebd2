//! Quote-aware CSV tokenizer.
//!
//! Lines are split on `\n` and blank lines (whitespace only) are dropped.
//! Within a line a `"` toggles the quoted state and a `,` outside quotes ends
//! the field. Quote state never carries over to the next line, so quoted
//! fields cannot span physical lines.
//!
//! Fields are trimmed and one surrounding pair of quotes is stripped.
//! Doubled quotes inside a field are kept verbatim (`"x""y"` → `x""y`).

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Tokenized CSV text. The first row is the header.
pub type Rows = Vec<Vec<String>>;

/// Tokenize a whole CSV body into rows of fields.
pub fn tokenize(text: &str) -> Rows {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(split_line)
        .collect()
}

/// Tokenize and split off the header row.
/// Empty input yields an empty header and no rows.
pub fn tokenize_with_header(text: &str) -> (Vec<String>, Rows) {
    let mut rows = tokenize(text);
    if rows.is_empty() {
        return (Vec::new(), rows);
    }
    let header = rows.remove(0);
    (header, rows)
}

/// Split one physical line into cleaned fields.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            QUOTE => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            DELIMITER if !in_quotes => {
                fields.push(clean_field(&current));
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(clean_field(&current));

    fields
}

/// Trim, then strip a single wrapping pair of quotes.
fn clean_field(raw: &str) -> String {
    let s = raw.trim();
    if s.len() >= 2 && s.starts_with(QUOTE) && s.ends_with(QUOTE) {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_inside_quotes_is_data() {
        assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_surrounding_quotes_stripped() {
        assert_eq!(split_line(r#""x""#), vec!["x"]);
        assert_eq!(split_line(r#"  "padded"  , b "#), vec!["padded", "b"]);
    }

    #[test]
    fn test_doubled_quotes_not_unescaped() {
        assert_eq!(split_line(r#""x""y""#), vec![r#"x""y"#]);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n  \n\t\n").is_empty());
        let (header, rows) = tokenize_with_header("");
        assert!(header.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_header_only() {
        let (header, rows) = tokenize_with_header("Asset,Minutes,Revenue\n");
        assert_eq!(header, vec!["Asset", "Minutes", "Revenue"]);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_blank_and_whitespace_lines_dropped() {
        let rows = tokenize("h1,h2\n\n   \na,b\r\n\nc,d");
        assert_eq!(rows, vec![vec!["h1", "h2"], vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_unterminated_quote_resets_per_line() {
        let rows = tokenize("a,\"b,c\nd,e");
        // the open quote swallows the rest of its own line only
        assert_eq!(rows[0], vec!["a", "\"b,c"]);
        assert_eq!(rows[1], vec!["d", "e"]);
    }

    #[test]
    fn test_empty_fields_kept() {
        assert_eq!(split_line("a,,c,"), vec!["a", "", "c", ""]);
        assert_eq!(split_line(r#""""#), vec![""]);
    }
}
