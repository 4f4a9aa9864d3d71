//! Default glyph source backed by lopdf.
//!
//! Walks each page's content stream, decodes text with the font encodings
//! lopdf resolves, estimates per-character origins from the text matrix,
//! and frames the result as `BeginLine`/`Char`/`EndLine` events in visual
//! reading order. PDF's bottom-up y is flipped into the engine's top-down
//! space here, so the core never sees PDF coordinates.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::Rect;

use super::{GlyphPage, GlyphSource, PageEvent, WritingMode};

/// TJ adjustments larger than this (in 1/1000 text-space units) are taken
/// as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A glyph source reading from a PDF document via lopdf.
pub struct PdfGlyphSource {
    doc: LopdfDocument,
}

impl PdfGlyphSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_password(path, None)
    }

    /// Open a PDF file, supplying a password for encrypted documents.
    ///
    /// lopdf reports encrypted documents at load time; a document that
    /// stays encrypted after load cannot be read and surfaces as a
    /// password error.
    pub fn open_with_password<P: AsRef<Path>>(path: P, password: Option<&str>) -> Result<Self> {
        let doc = LopdfDocument::load(path.as_ref()).map_err(|e| match e {
            lopdf::Error::Decryption(_) => password_error(password),
            _ => Error::from(e),
        })?;
        Self::from_document(doc, password)
    }

    /// Read a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_password(data, None)
    }

    /// Read a PDF from bytes with a password.
    pub fn from_bytes_with_password(data: &[u8], password: Option<&str>) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => password_error(password),
            _ => Error::from(e),
        })?;
        Self::from_document(doc, password)
    }

    fn from_document(doc: LopdfDocument, password: Option<&str>) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(password_error(password));
        }
        Ok(Self { doc })
    }

    /// Page dimensions from the MediaBox, defaulting to US Letter.
    fn page_size(&self, page_id: ObjectId) -> (f32, f32) {
        let media_box = self
            .doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|dict| dict.get(b"MediaBox").ok().cloned());

        if let Some(Object::Array(arr)) = media_box {
            if arr.len() == 4 {
                let nums: Vec<f32> = arr.iter().filter_map(object_number).collect();
                if nums.len() == 4 {
                    return ((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs());
                }
            }
        }
        (612.0, 792.0)
    }

    /// Concatenated decompressed content streams of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::Pdf(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => obj,
            Err(_) => return Ok(Vec::new()),
        };

        let mut content = Vec::new();
        let mut push_stream = |id: ObjectId| {
            if let Ok(Object::Stream(s)) = self.doc.get_object(id) {
                if let Ok(data) = s.decompressed_content() {
                    content.extend_from_slice(&data);
                    content.push(b' ');
                }
            }
        };

        match contents {
            Object::Reference(r) => push_stream(*r),
            Object::Array(arr) => {
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        push_stream(*r);
                    }
                }
            }
            _ => {}
        }

        Ok(content)
    }

    /// Extract positioned text spans from a page's content stream.
    fn extract_spans(&self, page_id: ObjectId) -> Result<Vec<RawSpan>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::Pdf(e.to_string()))?;

        let mut font_names: HashMap<Vec<u8>, String> = HashMap::new();
        for (name, font) in &lopdf_fonts {
            let base = font
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            font_names.insert(name.clone(), base);
        }

        let content = self.page_content(page_id)?;
        self.walk_content(&content, &font_names, &lopdf_fonts)
    }

    fn walk_content(
        &self,
        content: &[u8],
        font_names: &HashMap<Vec<u8>, String>,
        lopdf_fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    ) -> Result<Vec<RawSpan>> {
        let content =
            lopdf::content::Content::decode(content).map_err(|e| Error::Pdf(e.to_string()))?;

        let mut spans = Vec::new();
        let mut font = String::new();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            font_key = name.clone();
                            font = font_names
                                .get(name.as_slice())
                                .cloned()
                                .unwrap_or_else(|| {
                                    String::from_utf8_lossy(name.as_slice()).to_string()
                                });
                        }
                        font_size = object_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = object_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = object_number(&op.operands[1]).unwrap_or(0.0);
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n: Vec<f32> = op.operands[..6]
                            .iter()
                            .map(|o| object_number(o).unwrap_or(0.0))
                            .collect();
                        matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" => {
                    if !in_text {
                        continue;
                    }
                    let encoding = lopdf_fonts
                        .get(&font_key)
                        .and_then(|f| f.get_font_encoding(&self.doc).ok());

                    let text = if op.operator == "TJ" {
                        let mut combined = String::new();
                        if let Some(Object::Array(arr)) = op.operands.first() {
                            for item in arr {
                                match item {
                                    Object::String(bytes, _) => {
                                        if let Some(ref enc) = encoding {
                                            if let Ok(decoded) =
                                                LopdfDocument::decode_text(enc, bytes)
                                            {
                                                combined.push_str(&decoded);
                                            }
                                        } else {
                                            combined.push_str(&decode_text_fallback(bytes));
                                        }
                                    }
                                    Object::Integer(n) => {
                                        push_tj_gap(&mut combined, -(*n as f32));
                                    }
                                    Object::Real(n) => push_tj_gap(&mut combined, -n),
                                    _ => {}
                                }
                            }
                        }
                        combined
                    } else if let Some(Object::String(bytes, _)) = op.operands.first() {
                        if let Some(ref enc) = encoding {
                            LopdfDocument::decode_text(enc, bytes).unwrap_or_default()
                        } else {
                            decode_text_fallback(bytes)
                        }
                    } else {
                        String::new()
                    };

                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        spans.push(RawSpan {
                            text,
                            x,
                            y,
                            size: font_size * matrix.scale(),
                            font: font.clone(),
                        });
                    }
                }
                "'" | "\"" => {
                    matrix.next_line();
                    if !in_text {
                        continue;
                    }
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(Object::String(bytes, _)) = op.operands.get(text_idx) {
                        let encoding = lopdf_fonts
                            .get(&font_key)
                            .and_then(|f| f.get_font_encoding(&self.doc).ok());
                        let text = if let Some(ref enc) = encoding {
                            LopdfDocument::decode_text(enc, bytes).unwrap_or_default()
                        } else {
                            decode_text_fallback(bytes)
                        };
                        if !text.trim().is_empty() {
                            let (x, y) = matrix.position();
                            spans.push(RawSpan {
                                text,
                                x,
                                y,
                                size: font_size * matrix.scale(),
                                font: font.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }
}

impl GlyphSource for PdfGlyphSource {
    fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    fn page(&self, number: u32) -> Result<GlyphPage> {
        let pages = self.doc.get_pages();
        let page_id = *pages
            .get(&number)
            .ok_or_else(|| Error::InvalidInput(format!("page {} out of range", number)))?;

        let (width, height) = self.page_size(page_id);
        let spans = self.extract_spans(page_id)?;
        let events = spans_to_events(spans, height);

        Ok(GlyphPage {
            number,
            width,
            height,
            events,
        })
    }
}

fn password_error(password: Option<&str>) -> Error {
    if password.is_some() {
        Error::PasswordIncorrect
    } else {
        Error::PasswordRequired
    }
}

/// A positioned run of decoded text before line framing.
#[derive(Debug, Clone)]
struct RawSpan {
    text: String,
    x: f32,
    y: f32,
    size: f32,
    font: String,
}

/// Group spans into baselines and frame them as page events.
///
/// Spans within 30 % of the font size on the y axis share a baseline; each
/// baseline becomes one line, sorted left to right, and baselines are
/// ordered top to bottom after the y flip.
fn spans_to_events(spans: Vec<RawSpan>, page_height: f32) -> Vec<PageEvent> {
    if spans.is_empty() {
        return Vec::new();
    }

    // Flip into top-down space, then sort by (y, x).
    let mut spans: Vec<RawSpan> = spans
        .into_iter()
        .map(|mut s| {
            s.y = page_height - s.y;
            s
        })
        .collect();
    spans.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut baselines: Vec<Vec<RawSpan>> = Vec::new();
    let mut current: Vec<RawSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    baselines.push(std::mem::take(&mut current));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        baselines.push(current);
    }

    let mut events = Vec::new();
    for mut line_spans in baselines {
        line_spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        let y = line_spans[0].y;
        let min_x = line_spans[0].x;
        let max_size = line_spans.iter().map(|s| s.size).fold(0.0f32, f32::max);
        let max_x = line_spans
            .iter()
            .map(|s| s.x + s.text.chars().count() as f32 * s.size * 0.5)
            .fold(0.0f32, f32::max);

        events.push(PageEvent::BeginLine {
            bbox: Rect::new(min_x, y - max_size, max_x, y),
            mode: WritingMode::Horizontal,
        });

        for span in line_spans {
            let bold = is_bold_font(&span.font);
            let italic = is_italic_font(&span.font);
            let advance = span.size * 0.5;
            let mut x = span.x;
            for ch in span.text.chars() {
                events.push(PageEvent::Char {
                    ch,
                    x,
                    y: span.y,
                    size: span.size,
                    font: span.font.clone(),
                    bold,
                    italic,
                });
                x += advance;
            }
        }

        events.push(PageEvent::EndLine);
    }

    events
}

/// Insert a word space for a large TJ kerning adjustment.
fn push_tj_gap(combined: &mut String, adjustment: f32) {
    if adjustment > TJ_SPACE_THRESHOLD
        && !combined.is_empty()
        && !combined.ends_with(' ')
        && !combined.ends_with('\u{00A0}')
    {
        combined.push(' ');
    }
}

/// Fallback decoding when no font encoding is available: UTF-16BE with a
/// BOM, then UTF-8, then Latin-1.
fn decode_text_fallback(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

fn is_bold_font(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("bold") || lower.contains("black") || lower.contains("heavy")
}

fn is_italic_font(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("italic") || lower.contains("oblique")
}

/// Text matrix tracking the pen position through the content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // Default leading; a TL operator would refine this.
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
