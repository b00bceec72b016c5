//! Title extraction from semi-structured model output.
//!
//! Titles are wrapped in `《》`. Models sometimes label them (`**标题**：《…》`
//! or `标题：《…》`), sometimes not, so patterns are tried from most to least
//! specific and the first one that matches anything wins.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*标题\*\*[：:]\s*《(.*?)》").expect("valid regex"));

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"标题[：:]\s*《(.*?)》").expect("valid regex"));

static BOOK_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"《(.*?)》").expect("valid regex"));

/// Extraction strategies in cascade order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitlePattern {
    /// `**标题**：《…》`
    BoldMarker,
    /// `标题：《…》`
    Marker,
    /// Any `《…》`
    BookMarks,
}

impl TitlePattern {
    pub const CASCADE: [TitlePattern; 3] = [
        TitlePattern::BoldMarker,
        TitlePattern::Marker,
        TitlePattern::BookMarks,
    ];

    fn regex(&self) -> &'static Regex {
        match self {
            TitlePattern::BoldMarker => &BOLD_MARKER,
            TitlePattern::Marker => &MARKER,
            TitlePattern::BookMarks => &BOOK_MARKS,
        }
    }

    /// All captures of this pattern, in order of occurrence
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.regex()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Extract titles, using the first pattern in [`TitlePattern::CASCADE`] that
/// yields a match. Duplicates and empty captures are kept as found.
pub fn extract_titles(text: &str) -> Vec<String> {
    TitlePattern::CASCADE
        .iter()
        .map(|pattern| pattern.find_all(text))
        .find(|titles| !titles.is_empty())
        .unwrap_or_default()
}

/// Numbered, copy-ready list: `1. 《title》` per line.
pub fn format_titles(titles: &[String]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!("{}. 《{}》", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_marker_level() {
        let text = "**标题**：《如何高效学习》\n**标题**：《学习的秘密》";
        assert_eq!(extract_titles(text), vec!["如何高效学习", "学习的秘密"]);
    }

    #[test]
    fn test_bold_marker_wins_over_plain_bookmarks() {
        let text = "思路来自《论语》\n**标题**: 《三分钟读懂论语》";
        assert_eq!(extract_titles(text), vec!["三分钟读懂论语"]);
    }

    #[test]
    fn test_bold_marker_accepts_half_width_colon() {
        assert_eq!(TitlePattern::BoldMarker.find_all("**标题**:《x》"), vec!["x"]);
        assert_eq!(TitlePattern::BoldMarker.find_all("**标题**：\t《y》"), vec!["y"]);
    }

    #[test]
    fn test_marker_level_with_ascii_colon() {
        let text = "1. 标题: 《月薪三千到三万》\n2. 标题：  《普通人的逆袭》";
        assert_eq!(extract_titles(text), vec!["月薪三千到三万", "普通人的逆袭"]);
    }

    #[test]
    fn test_bookmarks_fallback() {
        assert_eq!(extract_titles("《测试标题》"), vec!["测试标题"]);
    }

    #[test]
    fn test_no_titles() {
        assert!(extract_titles("没有任何书名号").is_empty());
        assert!(extract_titles("").is_empty());
    }

    #[test]
    fn test_duplicates_and_empty_kept() {
        assert_eq!(extract_titles("《a》《》《a》"), vec!["a", "", "a"]);
    }

    #[test]
    fn test_does_not_cross_newlines() {
        assert!(extract_titles("《跨\n行》").is_empty());
    }

    #[test]
    fn test_deterministic() {
        let text = "标题：《一》 《二》";
        assert_eq!(extract_titles(text), extract_titles(text));
        assert_eq!(extract_titles(text), vec!["一"]);
    }

    #[test]
    fn test_cascade_order() {
        assert_eq!(TitlePattern::CASCADE[0], TitlePattern::BoldMarker);
        assert_eq!(TitlePattern::BookMarks.find_all("《x》y《z》"), vec!["x", "z"]);
    }

    #[test]
    fn test_format_titles() {
        let titles = vec!["一".to_string(), "二".to_string()];
        assert_eq!(format_titles(&titles), "1. 《一》\n2. 《二》");
        assert_eq!(format_titles(&[]), "");
    }
}
