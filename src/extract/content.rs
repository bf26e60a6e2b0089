//! Content stream walker.
//!
//! Tracks just enough graphics and text state to place text runs and
//! XObjects on the page. Glyph widths are estimated (no font metrics), which
//! only matters for skewed or rotated text since the planner looks at
//! vertical extents.

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Object};

use crate::error::{Error, Result};
use crate::source::{get_number, PdfSource};

/// Approximate ascender height as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// Approximate descender depth as a fraction of the font size.
const DESCENT: f32 = 0.2;

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translate(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Self {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    /// `self × other`: apply `self`, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    /// Length of the transformed unit y vector.
    fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Vertical extent `(min_y, max_y)` of a rectangle after transformation.
    fn y_extent(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> (f32, f32) {
        let ys = [
            self.apply(x0, y0).1,
            self.apply(x1, y0).1,
            self.apply(x0, y1).1,
            self.apply(x1, y1).1,
        ];
        let min = ys.iter().copied().fold(f32::INFINITY, f32::min);
        let max = ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        (min, max)
    }
}

/// A run of shown text, in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TextRun {
    /// Lowest point of the glyph boxes
    pub y_min: f32,
    /// Highest point of the glyph boxes
    pub y_max: f32,
    /// Baseline position
    pub baseline: f32,
    /// Font size after transformation
    pub size: f32,
}

/// Everything placed on a page, in user space.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PlacedContent {
    /// Text runs
    pub text: Vec<TextRun>,
    /// Vertical extents `(min_y, max_y)` of images and forms
    pub graphics: Vec<(f32, f32)>,
}

#[derive(Debug, Clone, Copy)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_size: f32,
    composite_font: bool,
    leading: f32,
    rise: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_size: 12.0,
            composite_font: false,
            leading: 0.0,
            rise: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translate(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Advance along the baseline by `tx` unscaled text space units.
    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translate(tx * self.horizontal_scale, 0.0).then(&self.matrix);
    }
}

/// Walks one page's content stream.
pub(crate) struct ContentWalker<'a> {
    source: &'a PdfSource,
    resources: Option<&'a Dictionary>,
    include_images: bool,
    composite_fonts: HashMap<Vec<u8>, bool>,
}

impl<'a> ContentWalker<'a> {
    pub(crate) fn new(
        source: &'a PdfSource,
        resources: Option<&'a Dictionary>,
        include_images: bool,
    ) -> Self {
        let composite_fonts = resources
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|fonts| source.resolve_dict(fonts))
            .map(|fonts| {
                fonts
                    .iter()
                    .map(|(name, font)| {
                        let composite = source
                            .resolve_dict(font)
                            .and_then(|f| f.get(b"Subtype").ok())
                            .and_then(|s| s.as_name().ok())
                            == Some(b"Type0".as_slice());
                        (name.clone(), composite)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            source,
            resources,
            include_images,
            composite_fonts,
        }
    }

    /// Decode and walk a content stream.
    pub(crate) fn walk(&self, content: &[u8]) -> Result<PlacedContent> {
        let content = Content::decode(content).map_err(|e| Error::Extract(e.to_string()))?;

        let mut placed = PlacedContent::default();
        let mut ctm = Matrix::IDENTITY;
        let mut stack: Vec<Matrix> = Vec::new();
        let mut text = TextState::default();

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        ctm = saved;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "BT" => {
                    text.matrix = Matrix::IDENTITY;
                    text.line_matrix = Matrix::IDENTITY;
                }
                "ET" => {}
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        text.composite_font =
                            self.composite_fonts.get(name).copied().unwrap_or(false);
                    }
                    if let Some(size) = operands.get(1).and_then(get_number) {
                        text.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        text.leading = leading;
                    }
                }
                "Ts" => {
                    if let Some(rise) = operands.first().and_then(get_number) {
                        text.rise = rise;
                    }
                }
                "Tc" => {
                    if let Some(spacing) = operands.first().and_then(get_number) {
                        text.char_spacing = spacing;
                    }
                }
                "Tw" => {
                    if let Some(spacing) = operands.first().and_then(get_number) {
                        text.word_spacing = spacing;
                    }
                }
                "Tz" => {
                    if let Some(scale) = operands.first().and_then(get_number) {
                        text.horizontal_scale = scale / 100.0;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (
                        operands.first().and_then(get_number),
                        operands.get(1).and_then(get_number),
                    ) {
                        if op.operator == "TD" {
                            text.leading = -ty;
                        }
                        text.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        text.matrix = m;
                        text.line_matrix = m;
                    }
                }
                "T*" => text.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &mut text, &ctm, &mut placed);
                    }
                }
                "'" => {
                    text.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &mut text, &ctm, &mut placed);
                    }
                }
                "\"" => {
                    if let Some(spacing) = operands.first().and_then(get_number) {
                        text.word_spacing = spacing;
                    }
                    if let Some(spacing) = operands.get(1).and_then(get_number) {
                        text.char_spacing = spacing;
                    }
                    text.next_line();
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        self.show(bytes, &mut text, &ctm, &mut placed);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show(bytes, &mut text, &ctm, &mut placed)
                                }
                                other => {
                                    if let Some(adjust) = get_number(other) {
                                        text.advance(-adjust / 1000.0 * text.font_size);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        if let Some(extent) = self.xobject_extent(name, &ctm) {
                            placed.graphics.push(extent);
                        }
                    }
                }
                "BI" => {
                    if self.include_images {
                        placed.graphics.push(ctm.y_extent(0.0, 0.0, 1.0, 1.0));
                    }
                }
                _ => {}
            }
        }

        Ok(placed)
    }

    /// Record a text run for `bytes` and move the text matrix past it.
    fn show(&self, bytes: &[u8], text: &mut TextState, ctm: &Matrix, placed: &mut PlacedContent) {
        let glyphs = if text.composite_font {
            bytes.len() / 2
        } else {
            bytes.len()
        };
        if glyphs == 0 {
            return;
        }
        let spaces = if text.composite_font {
            0
        } else {
            bytes.iter().filter(|&&b| b == b' ').count()
        };

        let size = text.font_size;
        let width = glyphs as f32 * (AVG_GLYPH_WIDTH * size + text.char_spacing)
            + spaces as f32 * text.word_spacing;

        let render = text.matrix.then(ctm);
        let scaled_width = width * text.horizontal_scale;
        let (y_min, y_max) = render.y_extent(
            0.0,
            text.rise - DESCENT * size.abs(),
            scaled_width,
            text.rise + ASCENT * size.abs(),
        );

        placed.text.push(TextRun {
            y_min,
            y_max,
            baseline: render.apply(0.0, text.rise).1,
            size: size.abs() * render.vertical_scale(),
        });

        text.advance(width);
    }

    /// Vertical extent of a painted XObject, if it counts as content.
    fn xobject_extent(&self, name: &[u8], ctm: &Matrix) -> Option<(f32, f32)> {
        let xobjects = self
            .resources?
            .get(b"XObject")
            .ok()
            .and_then(|x| self.source.resolve_dict(x))?;
        let stream = match self.source.resolve(xobjects.get(name).ok()?) {
            Object::Stream(s) => s,
            _ => return None,
        };

        match stream.dict.get(b"Subtype").ok()?.as_name().ok()? {
            b"Image" if self.include_images => Some(ctm.y_extent(0.0, 0.0, 1.0, 1.0)),
            b"Form" => {
                let bbox = stream
                    .dict
                    .get(b"BBox")
                    .ok()
                    .and_then(|b| self.source.rect(b))?;
                let form_matrix = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|m| m.as_array().ok())
                    .and_then(|m| Matrix::from_operands(m))
                    .unwrap_or(Matrix::IDENTITY);
                Some(
                    form_matrix
                        .then(ctm)
                        .y_extent(bbox.x0, bbox.y0, bbox.x1, bbox.y1),
                )
            }
            _ => None,
        }
    }
}
