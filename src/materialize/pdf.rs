//! lopdf materializer.
//!
//! Sub-pages are copies of the source page dictionary with the media and
//! crop boxes narrowed to one band. Content streams and resources are shared
//! by reference, so nothing is re-rendered.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::{Materializer, OutputPage};
use crate::error::{Error, Result};
use crate::model::{PageBox, SubPageRect};
use crate::source::{PdfSource, SourcePage};

/// Attributes a page may inherit from its ancestors.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Boxes that would fall outside a narrowed media box.
const STALE_BOXES: [&[u8]; 3] = [b"TrimBox", b"BleedBox", b"ArtBox"];

/// Writes sub-pages into the source document and rebuilds its page tree.
pub struct PdfMaterializer {
    source: PdfSource,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    reused: HashSet<ObjectId>,
    originals: HashMap<ObjectId, Dictionary>,
}

impl PdfMaterializer {
    /// Start writing into a loaded document.
    pub fn new(source: PdfSource) -> Result<Self> {
        let doc = source.document();
        let root = doc.trailer.get(b"Root")?.as_reference()?;
        let pages_id = doc.get_dictionary(root)?.get(b"Pages")?.as_reference()?;
        Ok(Self {
            source,
            pages_id,
            kids: Vec::new(),
            reused: HashSet::new(),
            originals: HashMap::new(),
        })
    }

    /// Number of output pages written so far.
    pub fn output_count(&self) -> usize {
        self.kids.len()
    }

    /// Install the new page list and drop everything no longer referenced.
    pub fn finish(mut self) -> Result<LopdfDocument> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;

        let doc = self.source.document_mut();
        let pages = doc.get_dictionary_mut(self.pages_id)?;
        pages.set("Kids", kids);
        pages.set("Count", count);

        let pruned = doc.prune_objects();
        log::debug!("Pruned {} unreferenced objects", pruned.len());
        doc.compress();

        Ok(self.source.into_document())
    }

    /// Page dictionary with inherited attributes made explicit.
    ///
    /// Always starts from the source dictionary, even after the first
    /// sub-page has replaced it in the document.
    fn standalone_dict(&mut self, page: &SourcePage) -> Result<Dictionary> {
        let mut dict = match self.originals.get(&page.id) {
            Some(dict) => dict.clone(),
            None => {
                let dict = self
                    .source
                    .document()
                    .get_dictionary(page.id)
                    .map_err(|e| Error::Materialize(format!("page {}: {}", page.number, e)))?
                    .clone();
                self.originals.insert(page.id, dict.clone());
                dict
            }
        };

        for key in INHERITABLE {
            if !dict.has(key) {
                if let Some(value) = self.source.inherited_raw(page.id, key) {
                    dict.set(key.to_vec(), value.clone());
                }
            }
        }
        dict.set("Parent", self.pages_id);
        Ok(dict)
    }

    /// Annotations whose vertical center lies inside `band`.
    fn annotations_within(&self, dict: &Dictionary, band: &PageBox) -> Option<Object> {
        let annots = dict.get(b"Annots").ok()?;
        let array = self.source.resolve(annots).as_array().ok()?;

        let kept: Vec<Object> = array
            .iter()
            .filter(|annot| {
                let rect = self
                    .source
                    .resolve_dict(annot)
                    .and_then(|d| d.get(b"Rect").ok())
                    .and_then(|r| self.source.rect(r));
                match rect {
                    Some(r) => {
                        let center = (r.y0 + r.y1) / 2.0;
                        center >= band.y0 && center < band.y1
                    }
                    None => true,
                }
            })
            .cloned()
            .collect();
        Some(Object::Array(kept))
    }

    /// Store a finished page dict, reusing the source id once per page.
    fn push_page(&mut self, page: &SourcePage, dict: Dictionary) -> ObjectId {
        let doc = self.source.document_mut();
        let id = if self.reused.insert(page.id) {
            doc.objects.insert(page.id, Object::Dictionary(dict));
            page.id
        } else {
            doc.add_object(dict)
        };
        self.kids.push(id);
        id
    }
}

impl Materializer for PdfMaterializer {
    fn pass_through(&mut self, page: &SourcePage) -> Result<OutputPage> {
        let dict = self.standalone_dict(page)?;
        self.push_page(page, dict);

        let geometry = page.geometry();
        Ok(OutputPage {
            number: self.kids.len() as u32,
            width: geometry.width,
            height: geometry.height,
        })
    }

    fn materialize(&mut self, page: &SourcePage, rect: &SubPageRect) -> Result<OutputPage> {
        let height = page.geometry().height;
        if !(rect.top >= 0.0 && rect.top < rect.bottom && rect.bottom <= height) {
            return Err(Error::InvalidGeometry(format!(
                "band {}-{} outside page {} of height {}",
                rect.top, rect.bottom, page.number, height
            )));
        }

        let band = page.page_box.band(rect);
        let mut dict = self.standalone_dict(page)?;
        dict.set("MediaBox", band.to_object());
        dict.set("CropBox", band.to_object());
        for key in STALE_BOXES {
            dict.remove(key);
        }
        if let Some(annots) = self.annotations_within(&dict, &band) {
            dict.set("Annots", annots);
        }

        let id = self.push_page(page, dict);
        log::trace!(
            "Page {} band {:.1}-{:.1} written as {:?}",
            page.number,
            rect.top,
            rect.bottom,
            id
        );

        Ok(OutputPage {
            number: self.kids.len() as u32,
            width: band.width(),
            height: band.height(),
        })
    }
}
