//! lopdf-backed document writer
//!
//! Pages are assembled in memory as they arrive. Image samples are
//! Flate-compressed as they are added, so only the encoded form is held until
//! `finalize`. Nothing touches the destination before then: `finalize` streams
//! the document into a temporary file next to it and renames it into place,
//! so an abandoned writer leaves no partial document.

use crate::composite::PlacedImage;
use crate::constants::{PDF_VERSION, PRODUCER};
use crate::layout::LineSegment;
use crate::types::{GridError, GridLineStyle, Result};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::ops::{image_placement_ops, line_ops};
use super::writer::DocumentWriter;

/// Page under construction
struct PageBuilder {
    width: f32,
    height: f32,
    content: String,
    xobjects: Dictionary,
    image_count: usize,
}

pub struct PdfDocumentWriter {
    destination: PathBuf,
    title: String,
    doc: Document,
    pages_id: ObjectId,
    page_refs: Vec<Object>,
    current: Option<PageBuilder>,
    finalized: bool,
}

impl PdfDocumentWriter {
    pub fn new(destination: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();
        Self {
            destination: destination.into(),
            title: title.into(),
            doc,
            pages_id,
            page_refs: Vec::new(),
            current: None,
            finalized: false,
        }
    }

    /// Pages completed so far
    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    fn current_page(&mut self) -> Result<&mut PageBuilder> {
        self.current
            .as_mut()
            .ok_or_else(|| GridError::Write("No page in progress".to_string()))
    }

    fn build_document(&mut self) {
        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(std::mem::take(&mut self.page_refs))),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        // No creation date: identical input gives identical bytes
        let info_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Title", Object::string_literal(self.title.as_str())),
            ("Producer", Object::string_literal(PRODUCER)),
        ]));
        self.doc.trailer.set("Info", info_id);

        self.doc.compress();
    }

    fn write_atomically(&mut self) -> Result<()> {
        let parent = match self.destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut staged = tempfile::Builder::new()
            .prefix(".photo-grid-")
            .suffix(".pdf.part")
            .tempfile_in(&parent)
            .map_err(|e| write_error(&self.destination, e))?;
        {
            let mut out = BufWriter::new(staged.as_file_mut());
            self.doc.save_to(&mut out)?;
            out.flush().map_err(|e| write_error(&self.destination, e))?;
        }
        staged
            .as_file()
            .sync_all()
            .map_err(|e| write_error(&self.destination, e))?;
        staged
            .persist(&self.destination)
            .map_err(|e| write_error(&self.destination, e.error))?;
        Ok(())
    }
}

impl DocumentWriter for PdfDocumentWriter {
    fn begin_page(&mut self, width: f32, height: f32) -> Result<()> {
        if self.finalized {
            return Err(GridError::Write("Document already finalized".to_string()));
        }
        if self.current.is_some() {
            return Err(GridError::Write("Previous page was not ended".to_string()));
        }
        self.current = Some(PageBuilder {
            width,
            height,
            content: String::new(),
            xobjects: Dictionary::new(),
            image_count: 0,
        });
        Ok(())
    }

    fn place_image(&mut self, image: &PlacedImage) -> Result<()> {
        let samples = deflate(&image.read_samples()?)?;

        let image_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(image.pixel_width as i64)),
            ("Height", Object::Integer(image.pixel_height as i64)),
            (
                "ColorSpace",
                Object::Name(image.layout.pdf_color_space().as_bytes().to_vec()),
            ),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"FlateDecode".to_vec())),
        ]);
        let image_id = self.doc.add_object(Stream::new(image_dict, samples));

        let page = self.current_page()?;
        let name = format!("Im{}", page.image_count);
        page.image_count += 1;
        page.xobjects
            .set(name.as_bytes(), Object::Reference(image_id));
        let ops = image_placement_ops(&name, &image.rect, page.height);
        page.content.push_str(&ops);
        Ok(())
    }

    fn draw_line(&mut self, line: &LineSegment, style: &GridLineStyle) -> Result<()> {
        let page = self.current_page()?;
        let ops = line_ops(line, style, page.height);
        page.content.push_str(&ops);
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let page = self
            .current
            .take()
            .ok_or_else(|| GridError::Write("No page in progress".to_string()))?;

        let content_id = self.doc.add_object(Stream::new(
            Dictionary::new(),
            page.content.into_bytes(),
        ));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(page.xobjects));

        let page_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page.width),
                    Object::Real(page.height),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]);
        let page_id = self.doc.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        Ok(())
    }

    fn finalize(&mut self) -> Result<PathBuf> {
        if self.finalized {
            return Err(GridError::Write("Document already finalized".to_string()));
        }
        if self.current.is_some() {
            return Err(GridError::Write("Last page was not ended".to_string()));
        }

        let page_count = self.page_refs.len();
        self.build_document();
        self.write_atomically()?;
        self.finalized = true;

        log::info!(
            "Wrote {} page(s) to {}",
            page_count,
            self.destination.display()
        );
        Ok(self.destination.clone())
    }
}

/// Bytes of stream content currently held by the document
#[cfg(test)]
fn stored_stream_bytes(doc: &Document) -> usize {
    doc.objects
        .values()
        .filter_map(|obj| obj.as_stream().ok())
        .map(|stream| stream.content.len())
        .sum()
}

/// zlib-wrapped deflate, as `/FlateDecode` expects
fn deflate(samples: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(samples.len() / 4),
        Compression::default(),
    );
    encoder.write_all(samples)?;
    Ok(encoder.finish()?)
}

fn write_error(destination: &Path, err: std::io::Error) -> GridError {
    GridError::Write(format!("{}: {}", destination.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::PixelLayout;
    use crate::layout::{CellSlot, Rect};
    use crate::scratch::ScratchSpace;

    fn spooled(scratch: &ScratchSpace, slot: CellSlot, size: u32) -> PlacedImage {
        let samples = vec![180u8; size as usize * size as usize * 3];
        let raster = scratch.write_cell(slot, &samples).unwrap();
        PlacedImage {
            source: PathBuf::from("flat.png"),
            slot,
            cell: Rect::new(0.0, 0.0, 100.0, 100.0),
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            offset_x: 0.0,
            offset_y: 0.0,
            pixel_width: size,
            pixel_height: size,
            layout: PixelLayout::Rgb,
            raster,
        }
    }

    #[test]
    fn test_images_are_compressed_before_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchSpace::new_in(dir.path()).unwrap();
        let mut writer = PdfDocumentWriter::new(dir.path().join("held.pdf"), "held");

        let size = 200;
        let pages = 3;
        for page in 0..pages {
            writer.begin_page(300.0, 300.0).unwrap();
            let image = spooled(&scratch, CellSlot::new(page, 0, 0), size);
            writer.place_image(&image).unwrap();
            writer.end_page().unwrap();
            scratch.release_page(page).unwrap();
        }

        // Nothing written yet, and far less than the raw samples held
        let raw = pages * (size * size * 3) as usize;
        assert!(stored_stream_bytes(&writer.doc) < raw / 10);

        let image_stream = writer
            .doc
            .objects
            .values()
            .filter_map(|obj| obj.as_stream().ok())
            .find(|s| s.dict.get(b"Subtype").and_then(|o| o.as_name()).ok() == Some(&b"Image"[..]))
            .unwrap();
        assert_eq!(
            image_stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"FlateDecode"
        );
        let decoded = image_stream.decompressed_content().unwrap();
        assert_eq!(decoded.len(), (size * size * 3) as usize);
        assert!(decoded.iter().all(|&s| s == 180));
    }
}
