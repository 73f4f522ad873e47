// Document Loader
// Plain text, DOCX and PDF inputs for the command-line tools

use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md", "markdown"];

fn xml_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("xml tag regex"))
}

/// Read a file from disk and extract its text.
pub fn load_document(path: &Path) -> Result<String, LoaderError> {
    let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    extract_text(&file_name, &bytes)
}

/// Extract text from in-memory file content, dispatching on the file extension.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, LoaderError> {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "docx" => extract_docx(bytes),
        "pdf" => pdf_extract::extract_text_from_mem(bytes).map_err(|e| LoaderError::Pdf(e.to_string())),
        e if e.is_empty() || TEXT_EXTENSIONS.contains(&e) => {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
        other => String::from_utf8(bytes.to_vec())
            .map_err(|_| LoaderError::UnsupportedFormat(other.to_string())),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, LoaderError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| LoaderError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| LoaderError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| LoaderError::Docx(e.to_string()))?;
    Ok(docx_xml_to_text(&xml))
}

/// Paragraphs become lines, tabs and breaks are kept, all other markup is dropped.
fn docx_xml_to_text(xml: &str) -> String {
    let marked = xml
        .replace("</w:p>", "\n")
        .replace("<w:tab/>", "\t")
        .replace("<w:br/>", "\n");
    let stripped = xml_tag_re().replace_all(&marked, "");
    let text = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&");
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_docx(xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buf);
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_plain_text() {
        let text = extract_text("essay.txt", "Hello there.".as_bytes()).unwrap();
        assert_eq!(text, "Hello there.");
        let text = extract_text("README", "No extension.".as_bytes()).unwrap();
        assert_eq!(text, "No extension.");
    }

    #[test]
    fn test_docx_paragraphs() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>First &amp; best.</w:t></w:r></w:p><w:p><w:r><w:t>Second.</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text("paper.DOCX", &make_docx(xml)).unwrap();
        assert_eq!(text, "First & best.\nSecond.");
    }

    #[test]
    fn test_broken_docx_is_error() {
        let err = extract_text("paper.docx", b"not a zip").unwrap_err();
        assert!(matches!(err, LoaderError::Docx(_)));
    }

    #[test]
    fn test_binary_unknown_extension_rejected() {
        let err = extract_text("image.png", &[0xff, 0xfe, 0x00, 0x9f]).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_document(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
