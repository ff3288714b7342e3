const ELLIPSIS: char = '…';

/// Keeps the first `max_chars` characters, appending an ellipsis if anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + ELLIPSIS.len_utf8());
            truncated.push_str(&text[..cut]);
            truncated.push(ELLIPSIS);
            truncated
        }
        None => text.to_owned(),
    }
}

/// Splits text into paragraphs on blank lines, and each paragraph into its lines.
/// The template joins lines with `<br>` and wraps paragraphs in `<p>`.
pub fn paragraphs(text: &str) -> Vec<Vec<String>> {
    static PARAGRAPH_BREAK: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let paragraph_break = PARAGRAPH_BREAK
        .get_or_init(|| regex::Regex::new(r"\n{2,}").expect("constant pattern should parse"));

    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    paragraph_break
        .split(&text)
        .map(|paragraph| paragraph.split('\n').map(str::to_owned).collect())
        .collect()
}

/// Day, spelled-out month and year, e.g. `05 November 2022`
pub fn format_pub_date(date: &chrono::DateTime<chrono::Utc>) -> String {
    date.format("%d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_chars("Test text", 30), "Test text");
        assert_eq!(truncate_chars(&"a".repeat(30), 30), "a".repeat(30));
    }

    #[test]
    fn long_text_keeps_prefix_and_ellipsis() {
        assert_eq!(
            truncate_chars(&"A".repeat(40), 30),
            format!("{}…", "A".repeat(30))
        );
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "ж".repeat(31);
        assert_eq!(truncate_chars(&text, 30), format!("{}…", "ж".repeat(30)));
    }

    #[test]
    fn blank_lines_split_paragraphs() {
        assert_eq!(
            paragraphs("first line\nsecond line\n\n\nnext paragraph"),
            vec![
                vec![String::from("first line"), String::from("second line")],
                vec![String::from("next paragraph")],
            ]
        );
    }

    #[test]
    fn windows_newlines_are_normalized() {
        assert_eq!(
            paragraphs("one\r\n\r\ntwo"),
            vec![vec![String::from("one")], vec![String::from("two")]]
        );
    }

    #[test]
    fn pub_date_spells_month() {
        let date = chrono::Utc.with_ymd_and_hms(2022, 11, 5, 15, 35, 0).unwrap();
        assert_eq!(format_pub_date(&date), "05 November 2022");
    }
}
