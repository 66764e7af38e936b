//! 元数据记录（RDF 文本）的行语法解析与写回
//!
//! 每个字段以 `Key:` 开头，后面不以 `Key:` 开头的行是该字段的续行。
//! 未修改的行原样写回，保留原来的换行符。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

fn header_pattern() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*):").expect("valid header pattern"))
}

/// 多行的值折成一行，避免后续行被当成新的字段
fn fold_value(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 需要更新的元数据键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    Title,
    Abstract,
    CreationDate,
    FileUrl,
    Pages,
    Year,
    Volume,
    Issue,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 8] = [
        MetadataKey::Title,
        MetadataKey::Abstract,
        MetadataKey::CreationDate,
        MetadataKey::FileUrl,
        MetadataKey::Pages,
        MetadataKey::Year,
        MetadataKey::Volume,
        MetadataKey::Issue,
    ];

    /// 行首的键名（不含冒号）
    pub fn token(self) -> &'static str {
        match self {
            MetadataKey::Title => "Title",
            MetadataKey::Abstract => "Abstract",
            MetadataKey::CreationDate => "Creation-Date",
            MetadataKey::FileUrl => "File-URL",
            MetadataKey::Pages => "Pages",
            MetadataKey::Year => "Year",
            MetadataKey::Volume => "Volume",
            MetadataKey::Issue => "Issue",
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    /// 第一个字段之前的自由文本行
    Text(String),
    /// 字段：键名 + 原始行（首行 + 续行）
    Field { key: String, lines: Vec<String> },
}

/// 解析后的元数据记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    entries: Vec<Entry>,
    line_ending: &'static str,
    trailing_newline: bool,
}

impl MetadataRecord {
    pub fn parse(content: &str) -> Self {
        let header = header_pattern();
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_newline = content.ends_with('\n');

        let mut entries = Vec::new();
        for line in content.lines() {
            if let Some(caps) = header.captures(line) {
                entries.push(Entry::Field {
                    key: caps[1].to_string(),
                    lines: vec![line.to_string()],
                });
                continue;
            }
            match entries.last_mut() {
                Some(Entry::Field { lines, .. }) => lines.push(line.to_string()),
                _ => entries.push(Entry::Text(line.to_string())),
            }
        }

        Self {
            entries,
            line_ending,
            trailing_newline,
        }
    }

    /// 取字段的值（首行冒号后的内容，不含续行）
    pub fn get(&self, key: MetadataKey) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Field { key: k, lines } if k == key.token() => {
                lines[0].splitn(2, ':').nth(1).map(str::trim)
            }
            _ => None,
        })
    }

    /// 把所有键为 `key` 的字段改写成一行 `Key: value`
    ///
    /// 值中的换行折成空格。返回匹配到的字段数，0 表示记录中没有这个键
    pub fn set(&mut self, key: MetadataKey, value: &str) -> usize {
        let value = fold_value(value);
        let mut matched = 0;
        for entry in &mut self.entries {
            if let Entry::Field { key: k, lines } = entry {
                if k == key.token() {
                    *lines = vec![format!("{}: {}", key.token(), value)];
                    matched += 1;
                }
            }
        }
        matched
    }

    pub fn render(&self) -> String {
        let lines: Vec<&str> = self
            .entries
            .iter()
            .flat_map(|entry| match entry {
                Entry::Text(line) => std::slice::from_ref(line).iter(),
                Entry::Field { lines, .. } => lines.iter(),
            })
            .map(String::as_str)
            .collect();

        let mut out = lines.join(self.line_ending);
        if self.trailing_newline && !lines.is_empty() {
            out.push_str(self.line_ending);
        }
        out
    }
}

/// 一次元数据更新的结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetadataReport {
    /// 已写入的键
    pub updated: Vec<MetadataKey>,
    /// 记录中找不到的键
    pub missing: Vec<MetadataKey>,
    /// 没有可写入的值的键
    pub no_value: Vec<MetadataKey>,
}

impl MetadataReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.no_value.is_empty()
    }
}

/// 逐个键独立更新，缺失的键只记录不阻断
pub fn apply_updates(
    record: &mut MetadataRecord,
    updates: &[(MetadataKey, Option<String>)],
) -> MetadataReport {
    let mut report = MetadataReport::default();
    for (key, value) in updates {
        match value {
            None => report.no_value.push(*key),
            Some(value) => {
                if record.set(*key, value) > 0 {
                    report.updated.push(*key);
                } else {
                    report.missing.push(*key);
                }
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Template-Type: ReDIF-Article 1.0\n\
Author-Name: Jane Doe\n\
Title: Old title\n\
Abstract: First line of the abstract\n  continued here\n\
Creation-Date: 2024-01-02\n\
File-URL: http://www.accessecon.com/Pubs/EB/2024/Volume44/EB-V44-I1-P7-24-A00007.pdf\n\
Pages: 55-64\n\
Volume: 44\n\
Issue: 1\n\
Year: 2024\n";

    #[test]
    fn test_untouched_record_renders_identically() {
        let record = MetadataRecord::parse(SAMPLE);
        assert_eq!(record.render(), SAMPLE);
    }

    #[test]
    fn test_set_replaces_value_and_drops_continuations() {
        let mut record = MetadataRecord::parse(SAMPLE);
        assert_eq!(record.set(MetadataKey::Abstract, "New abstract"), 1);
        assert_eq!(record.set(MetadataKey::Volume, "45"), 1);

        let rendered = record.render();
        assert!(rendered.contains("Abstract: New abstract\nCreation-Date:"));
        assert!(rendered.contains("Volume: 45\n"));
        assert!(!rendered.contains("continued here"));
        assert_eq!(record.get(MetadataKey::Volume), Some("45"));
    }

    #[test]
    fn test_keys_match_exact_prefix_only() {
        let mut record = MetadataRecord::parse("Volume-Note: keep\nVolume: 44\n");
        assert_eq!(record.set(MetadataKey::Volume, "45"), 1);
        assert_eq!(record.render(), "Volume-Note: keep\nVolume: 45\n");
    }

    #[test]
    fn test_missing_key_is_reported_without_blocking_others() {
        let mut record = MetadataRecord::parse("Title: T\nVolume: 44\n");
        let report = apply_updates(
            &mut record,
            &[
                (MetadataKey::Issue, Some("1".to_string())),
                (MetadataKey::Volume, Some("45".to_string())),
                (MetadataKey::Pages, None),
            ],
        );

        assert_eq!(report.updated, vec![MetadataKey::Volume]);
        assert_eq!(report.missing, vec![MetadataKey::Issue]);
        assert_eq!(report.no_value, vec![MetadataKey::Pages]);
        assert!(!report.is_complete());
        assert_eq!(record.render(), "Title: T\nVolume: 45\n");
    }

    #[test]
    fn test_updates_are_idempotent() {
        let updates = vec![
            (MetadataKey::Pages, Some("1-10".to_string())),
            (MetadataKey::Abstract, Some("Short".to_string())),
        ];

        let mut once = MetadataRecord::parse(SAMPLE);
        apply_updates(&mut once, &updates);
        let first = once.render();

        let mut twice = MetadataRecord::parse(&first);
        apply_updates(&mut twice, &updates);
        assert_eq!(twice.render(), first);
    }

    #[test]
    fn test_crlf_and_leading_text_preserved() {
        let content = "# exported\r\nVolume: 44\r\nIssue: 1";
        let mut record = MetadataRecord::parse(content);
        record.set(MetadataKey::Issue, "2");
        assert_eq!(record.render(), "# exported\r\nVolume: 44\r\nIssue: 2");
    }

    #[test]
    fn test_multiline_value_is_folded_and_stays_idempotent() {
        let updates = vec![(
            MetadataKey::Abstract,
            Some("We study X.\r\n  Keywords: growth\n\nMore.".to_string()),
        )];

        let mut once = MetadataRecord::parse("Abstract: old\r\nVolume: 44\r\n");
        apply_updates(&mut once, &updates);
        let first = once.render();
        assert_eq!(
            first,
            "Abstract: We study X. Keywords: growth More.\r\nVolume: 44\r\n"
        );

        let mut twice = MetadataRecord::parse(&first);
        let report = apply_updates(&mut twice, &updates);
        assert_eq!(report.updated, vec![MetadataKey::Abstract]);
        assert_eq!(twice.render(), first);
    }
}
