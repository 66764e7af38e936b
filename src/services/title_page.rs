//! 标题页文本改写
//!
//! 标题页 HTML 里的卷、期、页码和年份有多种写法，逐个模式替换

use regex::Regex;

use crate::models::{IssueTarget, PageRange};

/// 标题页改写器
pub struct TitleRewriter {
    volume: Vec<Regex>,
    issue: Vec<Regex>,
    pages: Vec<Regex>,
    year: Regex,
}

impl TitleRewriter {
    pub fn new() -> Self {
        let compile = |patterns: &[&str]| -> Vec<Regex> {
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("valid title pattern"))
                .collect()
        };

        Self {
            volume: compile(&[r"Volume\s+\d+", r"Vol\.\s+\d+"]),
            issue: compile(&[r"Issue\s+\d+", r"No\.\s+\d+", r"Iss\.\s*\d+"]),
            pages: compile(&[
                r"pages\s+\d+(?:\s*-\s*\d+)?",
                r"pp\.\s+\d+\s*-\s*\d+",
                r"\bp\.\s+\d+\s*-\s*\d+",
                r"pages\s+A\d+",
                r"\bp\.\s*A\d+",
            ]),
            year: Regex::new(r", \(\d{4}\)").expect("valid year pattern"),
        }
    }

    /// 改写标题页中的卷、期、页码和年份
    ///
    /// 没有页码范围时页码保持不变
    pub fn rewrite(&self, html: &str, target: &IssueTarget, pages: Option<PageRange>) -> String {
        let volume_text = format!("Volume {}", target.volume);
        let issue_text = format!("Issue {}", target.issue);
        let year_text = format!(", ({})", target.year());

        let mut content = html.to_string();
        for pattern in &self.volume {
            content = pattern.replace_all(&content, volume_text.as_str()).into_owned();
        }
        for pattern in &self.issue {
            content = pattern.replace_all(&content, issue_text.as_str()).into_owned();
        }
        if let Some(range) = pages {
            let pages_text = format!("pages {}", range);
            for pattern in &self.pages {
                content = pattern.replace_all(&content, pages_text.as_str()).into_owned();
            }
        }
        self.year
            .replace_all(&content, year_text.as_str())
            .into_owned()
    }
}

impl Default for TitleRewriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> IssueTarget {
        IssueTarget::new(45, 1)
    }

    #[test]
    fn test_rewrites_volume_issue_and_pages() {
        let rewriter = TitleRewriter::new();
        let html = "<p>Economics Bulletin, Volume 44, Issue 1, pages 55-64</p>";
        let out = rewriter.rewrite(html, &target(), Some(PageRange { first: 1, last: 10 }));
        assert_eq!(out, "<p>Economics Bulletin, Volume 45, Issue 1, pages 1-10</p>");
    }

    #[test]
    fn test_rewrites_abbreviated_citation() {
        let rewriter = TitleRewriter::new();
        let html = "Doe, J. (2024) Bulletin, (2024) Vol. 44 No. 3 pp. 12-20";
        let out = rewriter.rewrite(html, &target(), Some(PageRange { first: 11, last: 18 }));
        assert_eq!(out, "Doe, J. (2024) Bulletin, (2025) Volume 45 Issue 1 pages 11-18");
    }

    #[test]
    fn test_single_page_and_article_numbers() {
        let rewriter = TitleRewriter::new();
        let single = Some(PageRange { first: 27, last: 27 });
        assert_eq!(rewriter.rewrite("pages A12", &target(), single), "pages 27");
        assert_eq!(rewriter.rewrite("p. A3", &target(), single), "pages 27");
        assert_eq!(rewriter.rewrite("p.A3", &target(), single), "pages 27");
    }

    #[test]
    fn test_pages_untouched_without_range() {
        let rewriter = TitleRewriter::new();
        let out = rewriter.rewrite("Volume 44, pages 55-64", &target(), None);
        assert_eq!(out, "Volume 45, pages 55-64");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let rewriter = TitleRewriter::new();
        let range = Some(PageRange { first: 11, last: 18 });
        let once = rewriter.rewrite("Volume 44, Issue 2, pp. 3-9, (2024)", &target(), range);
        assert_eq!(rewriter.rewrite(&once, &target(), range), once);
    }
}
