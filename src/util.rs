pub fn parse_node_key(key: &str) -> Option<u32> {
    key.trim().parse::<u32>().ok()
}

pub fn stat_summary(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_keys_only() {
        assert_eq!(parse_node_key("4823"), Some(4823));
        assert_eq!(parse_node_key(" 17 "), Some(17));
        assert_eq!(parse_node_key("root"), None);
        assert_eq!(parse_node_key("-3"), None);
    }

    #[test]
    fn stat_summary_drops_blank_lines() {
        let lines = vec![
            "+10 to Strength".to_string(),
            "".to_string(),
            "  ".to_string(),
            "8% increased Life".to_string(),
        ];
        assert_eq!(stat_summary(&lines), "+10 to Strength\n8% increased Life");
    }
}
