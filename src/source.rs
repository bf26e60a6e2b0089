//! Source PDF access using lopdf.

use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{PageBox, PageGeometry};

/// Parent chains deeper than this are treated as cycles.
const MAX_TREE_DEPTH: usize = 64;

/// A page of the source document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourcePage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page object id
    pub id: ObjectId,

    /// Visible page area (crop box, else media box) in user space
    pub page_box: PageBox,

    /// Display rotation in degrees, normalized to `0..360`
    pub rotation: i64,
}

impl SourcePage {
    /// Page size in points.
    pub fn geometry(&self) -> PageGeometry {
        self.page_box.geometry()
    }

    /// Whether the page is displayed rotated.
    pub fn is_rotated(&self) -> bool {
        self.rotation != 0
    }
}

/// A loaded source document.
pub struct PdfSource {
    doc: LopdfDocument,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Take the underlying document for writing.
    pub fn into_document(self) -> LopdfDocument {
        self.doc
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get PDF version.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// All pages in document order.
    pub fn pages(&self) -> Vec<SourcePage> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| self.describe_page(number, id))
            .collect()
    }

    /// A single page by number.
    pub fn page(&self, number: u32) -> Result<SourcePage> {
        let pages = self.doc.get_pages();
        let id = pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, pages.len() as u32))?;
        Ok(self.describe_page(number, id))
    }

    fn describe_page(&self, number: u32, id: ObjectId) -> SourcePage {
        SourcePage {
            number,
            id,
            page_box: self.page_box(id),
            rotation: self.rotation(id),
        }
    }

    /// Mutable access for writing the output page tree.
    pub(crate) fn document_mut(&mut self) -> &mut LopdfDocument {
        &mut self.doc
    }

    /// Look up a page attribute, following `/Parent` for inheritable keys.
    /// References are resolved.
    pub fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        self.inherited_raw(page_id, key).map(|obj| self.resolve(obj))
    }

    /// Like [`PdfSource::inherited`], but returns references unresolved.
    pub fn inherited_raw(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut current = self.doc.get_dictionary(page_id).ok();
        let mut depth = 0;
        while let Some(dict) = current {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                log::warn!("Page tree above {:?} is too deep or cyclic", page_id);
                return None;
            }
            current = dict
                .get(b"Parent")
                .and_then(|p| p.as_reference())
                .and_then(|id| self.doc.get_dictionary(id))
                .ok();
        }
        None
    }

    /// Follow a reference to its object; other objects are returned as is.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    /// Resolve an object to a dictionary, if it is one.
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Parse a rectangle array such as `/MediaBox`.
    pub fn rect(&self, obj: &Object) -> Option<PageBox> {
        let array = self.resolve(obj).as_array().ok()?;
        if array.len() < 4 {
            return None;
        }
        let mut values = [0.0_f32; 4];
        for (slot, item) in values.iter_mut().zip(array) {
            *slot = get_number(self.resolve(item))?;
        }
        let rect = PageBox::new(values[0], values[1], values[2], values[3]);
        (rect.width() > 0.0 && rect.height() > 0.0).then_some(rect)
    }

    /// Visible page area: the crop box clipped to the media box.
    fn page_box(&self, page_id: ObjectId) -> PageBox {
        let media = self
            .inherited(page_id, b"MediaBox")
            .and_then(|obj| self.rect(obj))
            .unwrap_or_else(|| {
                log::warn!("Page {:?} has no usable MediaBox; assuming Letter", page_id);
                PageBox::letter()
            });

        let Some(crop) = self
            .inherited(page_id, b"CropBox")
            .and_then(|obj| self.rect(obj))
        else {
            return media;
        };

        let clipped = PageBox::new(
            crop.x0.max(media.x0),
            crop.y0.max(media.y0),
            crop.x1.min(media.x1),
            crop.y1.min(media.y1),
        );
        if crop.x0 < media.x1 && crop.x1 > media.x0 && crop.y0 < media.y1 && crop.y1 > media.y0 {
            clipped
        } else {
            media
        }
    }

    fn rotation(&self, page_id: ObjectId) -> i64 {
        self.inherited(page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .map(|r| r.rem_euclid(360))
            .unwrap_or(0)
    }

    /// Page resource dictionary (possibly inherited).
    pub fn resources(&self, page_id: ObjectId) -> Option<&Dictionary> {
        self.inherited(page_id, b"Resources")
            .and_then(|obj| self.resolve_dict(obj))
    }

    /// Decoded page content, concatenating content stream arrays.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => contents,
            Err(_) => return Ok(Vec::new()),
        };

        match self.resolve(contents) {
            Object::Stream(s) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = self.resolve(obj) {
                        match s.decompressed_content() {
                            Ok(data) => content.extend_from_slice(&data),
                            Err(_) => content.extend_from_slice(&s.content),
                        }
                        content.push(b'\n');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse(format!(
                "Invalid content stream on page {:?}",
                page_id
            ))),
        }
    }
}

/// Helper to extract a number from a PDF object.
pub(crate) fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
