use std::fmt;

/// 数据库中可写的论文字段（`tablepaper` 表的列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    VolumeNumber,
    NumIssue,
    TotalPaper,
    CitationString,
    TotalNumPages,
    PublishedPdfFile,
    PublishDate,
    StatusDate,
}

impl RecordField {
    /// 列名
    pub fn column(self) -> &'static str {
        match self {
            RecordField::VolumeNumber => "Volume_Number",
            RecordField::NumIssue => "NumIssue",
            RecordField::TotalPaper => "TotalPaper",
            RecordField::CitationString => "citationString",
            RecordField::TotalNumPages => "TotalNumpages",
            RecordField::PublishedPdfFile => "Published_PDF_File",
            RecordField::PublishDate => "Publish_Date",
            RecordField::StatusDate => "Status_date",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// 按文件名查到的论文记录
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationRecord {
    pub id: String,
    /// `NumberOfPages`
    pub number_of_pages: Option<u32>,
    /// `TotalNumpages`
    pub total_num_pages: Option<u32>,
    pub published_pdf_file: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
}

impl PublicationRecord {
    /// 期刊缩写：ID 中第一个 `-` 之前的部分
    pub fn acronym(&self) -> &str {
        self.id.split('-').next().unwrap_or_default()
    }
}

/// 续编时查到的上一篇已发布论文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub id: String,
    pub total_pages: Option<String>,
    pub published_pdf_file: String,
}
