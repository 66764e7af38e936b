//! 文件名编解码 - 业务能力层
//!
//! 文件名格式：`<前缀>-V<卷>-I<期>[-P<序号>]-<两位年份>-<其余>.<扩展名>`
//!
//! 改名是"全有或全无"的：当前格式需要的标签只要缺一个，就原样返回旧文件名，
//! 绝不只改一部分。

use std::ops::Range;

use regex::Regex;

use crate::models::{FilenameFields, FilenameTags};

/// 文件名中一个标签的位置和数值
#[derive(Debug, Clone)]
struct TagMatch {
    span: Range<usize>,
    value: u32,
}

/// 文件名中找到的所有标签
#[derive(Debug, Default)]
struct TagSet {
    volume: Option<TagMatch>,
    issue: Option<TagMatch>,
    paper: Option<TagMatch>,
    year: Option<TagMatch>,
}

/// 文件名编解码器
pub struct FilenameCodec {
    volume_pattern: Regex,
    issue_pattern: Regex,
    paper_pattern: Regex,
    year_pattern: Regex,
}

impl FilenameCodec {
    pub fn new() -> Self {
        Self {
            volume_pattern: Regex::new(r"-V(\d+)").expect("valid volume pattern"),
            issue_pattern: Regex::new(r"-I(\d+)").expect("valid issue pattern"),
            paper_pattern: Regex::new(r"-P(\d+)").expect("valid paper pattern"),
            year_pattern: Regex::new(r"-(\d{2})-").expect("valid year pattern"),
        }
    }

    /// 解析文件名中的年份、卷、期和（可选的）序号
    ///
    /// 缺少卷、期或年份标签，或者标签顺序不对时返回 `None`
    pub fn parse(&self, name: &str) -> Option<FilenameFields> {
        let tags = self.locate(name);
        let volume = tags.volume?;
        let issue = tags.issue?;
        let year = tags.year?;

        if !Self::in_order(&volume, &issue, tags.paper.as_ref()) {
            return None;
        }

        Some(FilenameFields {
            year: year.value,
            volume: volume.value,
            issue: issue.value,
            paper: tags.paper.map(|p| p.value),
        })
    }

    /// 用新的卷/期/序号改写文件名
    ///
    /// `tags.paper` 为 `Some` 时要求 `-V`、`-I`、`-P` 和年份同时存在，
    /// 否则要求 `-V`、`-I` 和年份同时存在。任何一个缺失都原样返回。
    pub fn render(&self, name: &str, tags: &FilenameTags) -> String {
        let found = self.locate(name);

        let (Some(volume), Some(issue), Some(year)) = (found.volume, found.issue, found.year)
        else {
            return name.to_string();
        };

        let mut replacements = vec![
            (volume.span.clone(), format!("-V{}", tags.volume)),
            (issue.span.clone(), format!("-I{}", tags.issue)),
            (year.span.clone(), format!("{:02}", tags.year_suffix())),
        ];

        match (tags.paper, found.paper.as_ref()) {
            (Some(paper), Some(tag)) => {
                if !Self::in_order(&volume, &issue, Some(tag)) {
                    return name.to_string();
                }
                replacements.push((tag.span.clone(), format!("-P{}", paper)));
            }
            (Some(_), None) => return name.to_string(),
            (None, _) => {
                if !Self::in_order(&volume, &issue, None) {
                    return name.to_string();
                }
            }
        }

        // 从后往前替换，前面的下标不受影响
        replacements.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        let mut renamed = name.to_string();
        for (span, text) in replacements {
            renamed.replace_range(span, &text);
        }
        renamed
    }

    fn locate(&self, name: &str) -> TagSet {
        let volume = Self::first_tag(&self.volume_pattern, name, 0, 0);
        let issue = Self::first_tag(&self.issue_pattern, name, 0, 0);
        let paper = Self::first_tag(&self.paper_pattern, name, 0, 0);

        // 年份块只在最后一个 V/I/P 标签之后查找；
        // 两侧的 `-` 可能与相邻标签共用，只替换数字部分
        let after_tags = [&volume, &issue, &paper]
            .into_iter()
            .flatten()
            .map(|tag| tag.span.end)
            .max()
            .unwrap_or(0);
        let year = Self::first_tag(&self.year_pattern, name, after_tags, 1);

        TagSet {
            volume,
            issue,
            paper,
            year,
        }
    }

    fn first_tag(pattern: &Regex, name: &str, from: usize, span_group: usize) -> Option<TagMatch> {
        let caps = pattern.captures(name.get(from..)?)?;
        let span = caps.get(span_group)?.range();
        let value = caps.get(1)?.as_str().parse().ok()?;
        Some(TagMatch {
            span: span.start + from..span.end + from,
            value,
        })
    }

    fn in_order(volume: &TagMatch, issue: &TagMatch, paper: Option<&TagMatch>) -> bool {
        volume.span.end <= issue.span.start
            && paper.map_or(true, |p| issue.span.end <= p.span.start)
    }
}

impl Default for FilenameCodec {
    fn default() -> Self {
        Self::new()
    }
}
