//! PPTX file parser implementation.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slidesim_core::{
    DeckSource, EmptyShapePolicy, Error, ExtractedSlide, Presentation, PresentationFormat, Result,
};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use zip::ZipArchive;

const PRESENTATION_PATH: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PATH: &str = "ppt/_rels/presentation.xml.rels";

/// Parser for PPTX (Office Open XML) files.
#[derive(Debug, Clone, Default)]
pub struct PptxParser {
    /// How shapes with blank text are treated.
    empty_shape_policy: EmptyShapePolicy,
}

impl PptxParser {
    /// Create a new PPTX parser that skips blank shapes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how shapes with empty or whitespace-only text are treated.
    pub fn with_empty_shape_policy(mut self, policy: EmptyShapePolicy) -> Self {
        self.empty_shape_policy = policy;
        self
    }

    /// The policy this parser applies to blank shapes.
    pub fn empty_shape_policy(&self) -> EmptyShapePolicy {
        self.empty_shape_policy
    }

    /// Parse a deck from a file path or an in-memory buffer.
    pub fn parse_source(&self, source: &DeckSource) -> Result<Presentation> {
        match source {
            DeckSource::Path(path) => {
                let file = File::open(path)?;
                let mut reader = BufReader::new(file);
                let mut magic = [0u8; 8];
                let read = read_prefix(&mut reader, &mut magic)?;
                reader.rewind()?;
                check_format(&magic[..read], source.filename())?;
                self.parse(reader, source.filename())
            }
            DeckSource::Bytes { data, .. } => {
                check_format(data, source.filename())?;
                self.parse(Cursor::new(data.as_slice()), source.filename())
            }
        }
    }

    /// Extract the joined text of a deck from a file path or buffer.
    pub fn extract_text(&self, source: &DeckSource) -> Result<String> {
        Ok(self.parse_source(source)?.extracted_text())
    }

    /// Parse a PPTX file from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R, filename: &str) -> Result<Presentation> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ParseError(format!("not a valid ZIP archive: {}", e)))?;

        let mut presentation = Presentation::new(filename, PresentationFormat::Pptx);

        let slide_order = self.get_slide_order(&mut archive)?;
        log::debug!("{}: {} slide(s) in presentation order", filename, slide_order.len());

        for (idx, slide_path) in slide_order.iter().enumerate() {
            let slide = self.parse_slide(&mut archive, slide_path, idx + 1)?;
            presentation.add_slide(slide);
        }

        Ok(presentation)
    }

    /// Get the ordered list of slide part paths.
    ///
    /// Order comes from `p:sldIdLst` in presentation.xml, resolved through the
    /// presentation relationships. Decks without a slide list fall back to
    /// every slide relationship sorted by the number in its part name.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = read_file_from_archive(archive, PRESENTATION_RELS_PATH)?;
        let slide_rels = parse_slide_relationships(&rels_content)?;

        let presentation_content = read_file_from_archive(archive, PRESENTATION_PATH)?;
        let slide_ids = parse_slide_id_list(&presentation_content)?;

        if slide_ids.is_empty() {
            if !slide_rels.is_empty() {
                log::warn!("presentation.xml has no slide list, ordering slides by part name");
            }
            let mut slides: Vec<(String, Option<usize>)> = slide_rels
                .into_values()
                .map(|path| {
                    let number = extract_slide_number(&path);
                    (path, number)
                })
                .collect();
            slides.sort_by(|a, b| match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb).then_with(|| a.0.cmp(&b.0)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });
            return Ok(slides.into_iter().map(|(path, _)| path).collect());
        }

        slide_ids
            .iter()
            .map(|rel_id| {
                slide_rels.get(rel_id).cloned().ok_or_else(|| {
                    Error::ParseError(format!(
                        "slide relationship '{}' not found in {}",
                        rel_id, PRESENTATION_RELS_PATH
                    ))
                })
            })
            .collect()
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<ExtractedSlide> {
        let content = read_file_from_archive(archive, slide_path)?;
        let mut slide = ExtractedSlide::new(slide_number);

        for shape in extract_shapes_from_xml(&content)
            .map_err(|e| Error::ParseError(format!("{}: {}", slide_path, e)))?
        {
            let blank = shape.text.trim().is_empty();
            match (blank, self.empty_shape_policy) {
                (true, EmptyShapePolicy::Skip) => {}
                (true, EmptyShapePolicy::Keep) => slide.add_text(""),
                (false, _) => slide.add_text(shape.text),
            }
        }

        Ok(slide)
    }
}

/// Reject formats this parser cannot read before opening the container.
fn check_format(magic: &[u8], filename: &str) -> Result<()> {
    let extension = filename.rsplit_once('.').map(|(_, ext)| ext);
    let format = PresentationFormat::from_magic(magic)
        .or_else(|| extension.and_then(PresentationFormat::from_extension));

    match format {
        Some(PresentationFormat::LegacyPpt) => Err(Error::UnsupportedFormat(format!(
            "{} is a legacy binary .ppt file; save it as .pptx first",
            filename
        ))),
        // Unknown signatures fall through to the ZIP reader, which reports the parse error.
        _ => Ok(()),
    }
}

/// Fill `buf` from the start of `reader`, returning how many bytes were read.
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Text of one shape extracted from slide XML.
#[derive(Debug, Default)]
struct ShapeText {
    paragraphs: Vec<String>,
    text: String,
}

/// Map slide relationship ids to their part paths inside the archive.
fn parse_slide_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut slides = HashMap::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.ends_with("/slide") {
                    slides.insert(id, resolve_target(&target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::ParseError(format!(
                    "error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(slides)
}

/// Relationship ids of the slides listed in presentation.xml, in order.
fn parse_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut in_list = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = true;
            }
            Ok(Event::End(ref e)) if local_name(e.name().as_ref()) == b"sldIdLst" => {
                in_list = false;
            }
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if in_list && local_name(e.name().as_ref()) == b"sldId" =>
            {
                if let Some(id) = relationship_id(e) {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::ParseError(format!(
                    "error parsing {}: {}",
                    PRESENTATION_PATH, e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// The namespaced `r:id` attribute of an element (the unprefixed `id` is a number).
fn relationship_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id")
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Resolve a relationship target against the `ppt/` directory.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Extract the text of every shape that can hold text, in document order.
///
/// Every `p:sp` counts, including ones inside group shapes; a shape without
/// a text body yields an empty text. Pictures and graphic frames carry no
/// text. Shapes inside `mc:Fallback` duplicate their `mc:Choice` sibling and
/// are ignored.
fn extract_shapes_from_xml(xml_content: &str) -> std::result::Result<Vec<ShapeText>, String> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(false);

    let mut current_shape: Option<ShapeText> = None;
    let mut in_text_body = false;
    let mut in_text = false;
    let mut fallback_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                let local_name = local_name(name.as_ref());

                if local_name == b"Fallback" {
                    fallback_depth += 1;
                }
                if fallback_depth > 0 {
                    continue;
                }

                match local_name {
                    b"sp" => current_shape = Some(ShapeText::default()),
                    b"txBody" if current_shape.is_some() => in_text_body = true,
                    b"p" if in_text_body => {
                        if let Some(ref mut shape) = current_shape {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"t" if in_text_body => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if fallback_depth > 0 {
                    continue;
                }
                let name = e.name();
                let local_name = local_name(name.as_ref());

                match local_name {
                    b"sp" => shapes.push(ShapeText::default()),
                    b"p" if in_text_body => {
                        if let Some(ref mut shape) = current_shape {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"br" if in_text_body => {
                        if let Some(paragraph) = current_shape
                            .as_mut()
                            .and_then(|shape| shape.paragraphs.last_mut())
                        {
                            paragraph.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_text && fallback_depth == 0 {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    if let Some(paragraph) = current_shape
                        .as_mut()
                        .and_then(|shape| shape.paragraphs.last_mut())
                    {
                        paragraph.push_str(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let local_name = local_name(name.as_ref());

                if local_name == b"Fallback" {
                    fallback_depth = fallback_depth.saturating_sub(1);
                    continue;
                }
                if fallback_depth > 0 {
                    continue;
                }

                match local_name {
                    b"sp" => {
                        if let Some(mut shape) = current_shape.take() {
                            shape.text = shape.paragraphs.join("\n");
                            shapes.push(shape);
                        }
                        in_text_body = false;
                        in_text = false;
                    }
                    b"txBody" => in_text_body = false,
                    b"t" => in_text = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML error at byte {}: {}", reader.buffer_position(), e)),
            _ => {}
        }
    }

    Ok(shapes)
}

/// Read a UTF-8 part from the ZIP archive.
fn read_file_from_archive<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ParseError(format!("part '{}' not found in archive: {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ParseError(format!("failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a part name like "ppt/slides/slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
