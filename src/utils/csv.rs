/// Quote a CSV field per RFC 4180: fields containing commas, quotes or
/// line breaks are wrapped in double quotes, with embedded quotes doubled.
pub fn csv_field(value: &str) -> String {
    let needs_quoting = value.contains(|c| matches!(c, ',' | '"' | '\r' | '\n'));
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field_unchanged() {
        assert_eq!(csv_field("焼き鳥"), "焼き鳥");
        assert_eq!(csv_field("Fried Chicken"), "Fried Chicken");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn test_comma_gets_quoted() {
        assert_eq!(csv_field("rice, extra"), "\"rice, extra\"");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(csv_field("the \"special\""), "\"the \"\"special\"\"\"");
    }

    #[test]
    fn test_newline_gets_quoted() {
        assert_eq!(csv_field("line1\nline2"), "\"line1\nline2\"");
    }
}
