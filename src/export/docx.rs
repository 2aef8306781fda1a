//! # Word 文档导出
//!
//! 生成只包含一张表格的最小 OOXML 包 (`.docx`)：
//! `[Content_Types].xml`, `_rels/.rels`, `word/document.xml`。
//! 单元格中的多条跃迁各占一个段落。
//!
//! 需要 `docx` feature（默认开启，依赖 `zip`）；未开启时返回
//! `TdError::ExportDependencyMissing`。
//!
//! ## 依赖关系
//! - 被 `commands/export.rs` 调用
//! - 使用 `export/table.rs` 的行格式
//! - 使用 `quick-xml` 转义文本, `zip` 写入压缩包

use crate::error::{Result, TdError};
use crate::export::table::{FormattedRow, HEADER};
use crate::models::ExcitedState;
use crate::parsers::OrbitalLabels;

use quick_xml::escape::escape;
use std::path::Path;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

fn cell_xml(text: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", escape(line)))
        .collect();
    format!("<w:tc>{}</w:tc>", paragraphs)
}

fn row_xml(cells: &[&str]) -> String {
    let cells: String = cells.iter().map(|c| cell_xml(c)).collect();
    format!("<w:tr>{}</w:tr>", cells)
}

/// 生成 `word/document.xml`
pub fn document_xml(rows: &[FormattedRow]) -> String {
    let mut body = row_xml(&HEADER);
    for row in rows {
        body.push_str(&row_xml(&row.cells()));
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:body><w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr>"#,
            "{}",
            r#"</w:tbl><w:p/></w:body></w:document>"#
        ),
        body
    )
}

/// 导出 docx 文档
#[cfg(feature = "docx")]
pub fn write_docx(states: &[ExcitedState], labels: &OrbitalLabels, output_path: &Path) -> Result<()> {
    use std::fs::File;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let to_write_error = |e: std::io::Error| TdError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };
    let zip_error = |e: zip::result::ZipError| {
        TdError::Other(format!("Failed to write '{}': {}", output_path.display(), e))
    };

    let rows = crate::export::table::format_rows(states, labels, "\n");
    let document = document_xml(&rows);

    let file = File::create(output_path).map_err(to_write_error)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, options).map_err(zip_error)?;
        zip.write_all(content.as_bytes()).map_err(to_write_error)?;
    }

    zip.finish().map_err(zip_error)?;
    Ok(())
}

/// 导出 docx 文档（未启用 `docx` feature）
#[cfg(not(feature = "docx"))]
pub fn write_docx(_states: &[ExcitedState], _labels: &OrbitalLabels, _output_path: &Path) -> Result<()> {
    Err(TdError::ExportDependencyMissing {
        format: "docx".to_string(),
        feature: "docx".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_xml_escapes() {
        let row = FormattedRow {
            state: "S1".to_string(),
            wavelength: "275.5".to_string(),
            energy: "4.50".to_string(),
            osc: "0.1000".to_string(),
            transitions: "σ<C&H> (45 a) → (46 a)\n(44 a) → (46 a)".to_string(),
            weights: "80%\n15%".to_string(),
        };
        let xml = document_xml(&[row]);
        assert!(xml.contains("σ&lt;C&amp;H&gt; (45 a)"));
        assert!(!xml.contains("<C&H>"));
        assert!(xml.contains("<w:t xml:space=\"preserve\">15%</w:t>"));
        assert_eq!(xml.matches("<w:tr>").count(), 2);
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_write_docx_package() {
        use std::io::Read;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.docx");
        let states = vec![ExcitedState::new(1, "singlet", "A", 4.5, 0.1)];
        write_docx(&states, &OrbitalLabels::empty(), &path).unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("S1"));
        assert!(archive.by_name("[Content_Types].xml").is_ok());
    }

    #[cfg(not(feature = "docx"))]
    #[test]
    fn test_docx_requires_feature() {
        let path = std::path::PathBuf::from("unused.docx");
        assert!(matches!(
            write_docx(&[], &OrbitalLabels::empty(), &path),
            Err(TdError::ExportDependencyMissing { .. })
        ));
    }
}
