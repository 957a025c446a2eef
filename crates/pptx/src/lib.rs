//! PPTX (Office Open XML) text extractor for slide deck comparison.
//!
//! Parses .pptx files which are ZIP archives containing XML documents, and
//! collects the text of every text-bearing shape in slide order.

pub mod parser;

pub use parser::PptxParser;

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory PPTX fixtures.

    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006""#;

    const SLIDE_REL_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    const MASTER_REL_TYPE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// A placeholder shape with an empty text body.
    pub const EMPTY_SHAPE: &str =
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#;

    /// A shape holding one paragraph of text.
    pub fn text_shape(text: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="TextBox 2"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            text
        )
    }

    /// Wrap shapes in a slide document.
    pub fn slide_xml(shapes: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/></p:nvGrpSpPr>{}</p:spTree></p:cSld></p:sld>"#,
            NS, shapes
        )
    }

    /// Build a PPTX archive.
    ///
    /// `slide_list` is the `r:id` order of `p:sldIdLst` (empty omits the list);
    /// `slide_rels` maps relationship ids to targets relative to `ppt/`.
    pub fn build_pptx(
        slides: &[(&str, String)],
        slide_list: &[&str],
        slide_rels: &[(&str, &str)],
    ) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        let ids: String = slide_list
            .iter()
            .enumerate()
            .map(|(idx, rel)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + idx, rel))
            .collect();
        let list = if slide_list.is_empty() {
            String::new()
        } else {
            format!("<p:sldIdLst>{}</p:sldIdLst>", ids)
        };
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>{}<p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#,
            NS, list
        );

        let mut rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}" Target="slideMasters/slideMaster1.xml"/>"#,
            MASTER_REL_TYPE
        );
        for (id, target) in slide_rels {
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id, SLIDE_REL_TYPE, target
            ));
        }
        rels.push_str("</Relationships>");

        zip.start_file("ppt/presentation.xml", options).unwrap();
        zip.write_all(presentation.as_bytes()).unwrap();
        zip.start_file("ppt/_rels/presentation.xml.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        for (path, xml) in slides {
            zip.start_file(*path, options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}
