//! DOCX extractor.
//!
//! A DOCX file is a ZIP container; the body text lives in
//! `word/document.xml`. Only the raw text is needed, so the XML is scanned for
//! text runs (`<w:t>`), tabs, breaks and paragraph ends instead of building a
//! full document model.

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;

use crate::extract::error::{ExtractError, ExtractResult};
use crate::extract::{DocumentFormat, TextExtractor};

/// Path of the main document part inside the container.
const DOCUMENT_PART: &str = "word/document.xml";

static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>|</w:p>")
        .unwrap()
});

static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(amp|lt|gt|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").unwrap());

/// DOCX text extractor backed by `zip`.
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, data: &[u8]) -> ExtractResult<String> {
        let parse_error = |message: String| ExtractError::ParseError {
            format: "DOCX".into(),
            message,
        };

        let mut archive =
            zip::ZipArchive::new(Cursor::new(data)).map_err(|e| parse_error(e.to_string()))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| parse_error(format!("{DOCUMENT_PART}: {e}")))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml).map_err(|e| ExtractError::Io {
            format: "DOCX".into(),
            source: e,
        })?;

        Ok(document_text(&xml))
    }
}

/// Flatten `word/document.xml` into plain text, one line per paragraph.
fn document_text(xml: &str) -> String {
    let mut out = String::new();
    for caps in RE_TOKEN.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            out.push_str(&decode_entities(run.as_str()));
            continue;
        }
        let token = &caps[0];
        if token.starts_with("<w:tab") {
            out.push('\t');
        } else {
            out.push('\n');
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    RE_ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse().ok(),
                    };
                    code.and_then(char::from_u32)
                        .map(String::from)
                        .unwrap_or_else(|| caps[0].to_string())
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p w:rsidR="00A1"><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Cell Biology</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Mitochondria </w:t></w:r><w:r><w:t>&amp; ribosomes</w:t></w:r><w:r><w:tab/><w:t>&#8212;ok</w:t></w:r></w:p>
<w:p><w:r><w:t>line</w:t><w:br/><w:t>break</w:t></w:r></w:p>
</w:body>
</w:document>"#;

    fn docx_bytes(part: &str, xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file(part, options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn extracts_paragraph_text() {
        let text = DocxExtractor.extract(&docx_bytes(DOCUMENT_PART, BODY)).unwrap();
        assert_eq!(
            text,
            "Cell Biology\nMitochondria & ribosomes\t\u{2014}ok\nline\nbreak\n"
        );
    }

    #[test]
    fn paragraph_properties_are_not_paragraphs() {
        let text = document_text("<w:p><w:pPr></w:pPr><w:r><w:t>a</w:t></w:r></w:p>");
        assert_eq!(text, "a\n");
    }

    #[test]
    fn missing_document_part_is_a_parse_error() {
        let bytes = docx_bytes("word/other.xml", BODY);
        let err = DocxExtractor.extract(&bytes).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse DOCX file.");
    }

    #[test]
    fn non_zip_data_is_a_parse_error() {
        assert!(matches!(
            DocxExtractor.extract(b"plain text pretending to be docx"),
            Err(ExtractError::ParseError { .. })
        ));
    }

    #[test]
    fn unknown_entities_are_left_alone() {
        assert_eq!(decode_entities("a &lt;b&gt; &#xZZ; &#65;"), "a <b> &#xZZ; A");
    }
}
