use image::DynamicImage;
use log::debug;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Point, Px, Rgb,
};
use std::io::{BufWriter, Write};

use crate::cards::layout::{CardRect, LayoutParameters, Page};
use crate::cards::qr::CodeImageProducer;
use crate::cards::text::{Face, text_width, wrap};
use crate::clients::entities::TrackRecord;
use crate::clients::errors::{Error, Result};

const DOCUMENT_TITLE: &str = "Playlist cards";

/// QR code edge length, shrunk to fit narrow cards
const QR_SIZE_MM: f32 = 30.0;

/// Horizontal padding inside a card
const CARD_MARGIN_MM: f32 = 5.0;

/// Distance from the card's top edge to the top of the text block
const TEXT_TOP_OFFSET_MM: f32 = 8.0;

const YEAR_FONT_SIZE: f32 = 30.0;
const BODY_FONT_SIZE: f32 = 10.0;
const LEADING: f32 = 1.2;
const PT_TO_MM: f32 = 25.4 / 72.0;

const BORDER_THICKNESS: f32 = 0.5;

/// Which lines the back of a card shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackFields {
    pub year: bool,
    pub artist: bool,
    pub song: bool,
    pub album: bool,
}

impl Default for BackFields {
    fn default() -> Self {
        BackFields {
            year: true,
            artist: true,
            song: true,
            album: true,
        }
    }
}

impl BackFields {
    pub fn without_album() -> Self {
        BackFields {
            album: false,
            ..Default::default()
        }
    }
}

/// One line of the text block on the back of a card. Empty text is a spacer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub face: Face,
    pub font_size: f32,
}

impl TextLine {
    fn height(&self) -> f32 {
        self.font_size * LEADING * PT_TO_MM
    }
}

/// What a render call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub sheet_sides: usize,
    pub cards: usize,
}

/// Lines for the back of `record`: year, artist, song and album, each
/// wrapped to `max_width`, separated by blank lines.
pub fn back_text_lines(record: &TrackRecord, fields: &BackFields, max_width: f32) -> Vec<TextLine> {
    let mut groups: Vec<(String, Face, f32)> = Vec::new();
    if fields.year {
        groups.push((record.year.to_string(), Face::Bold, YEAR_FONT_SIZE));
    }
    if fields.artist {
        groups.push((record.artist.clone(), Face::Bold, BODY_FONT_SIZE));
    }
    if fields.song {
        groups.push((record.song.clone(), Face::Regular, BODY_FONT_SIZE));
    }
    if fields.album {
        if let Some(album) = &record.album {
            groups.push((album.clone(), Face::Regular, BODY_FONT_SIZE));
        }
    }

    let mut lines = Vec::new();
    for (i, (text, face, font_size)) in groups.into_iter().enumerate() {
        if i > 0 {
            lines.push(TextLine {
                text: String::new(),
                face: Face::Regular,
                font_size: BODY_FONT_SIZE,
            });
        }
        lines.extend(wrap(&text, face, font_size, max_width).into_iter().map(|text| TextLine {
            text,
            face,
            font_size,
        }));
    }
    lines
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
        }
    }
}

// Hands out sheet sides: the page created with the document first, then new pages
struct Sides<'a> {
    doc: &'a PdfDocumentReference,
    params: &'a LayoutParameters,
    initial: Option<(PdfPageIndex, PdfLayerIndex)>,
    count: usize,
}

impl Sides<'_> {
    fn next_side(&mut self) -> PdfLayerReference {
        self.count += 1;
        let (page, layer) = self.initial.take().unwrap_or_else(|| {
            self.doc.add_page(
                Mm(self.params.page_width),
                Mm(self.params.page_height),
                "Layer 1",
            )
        });
        self.doc.get_page(page).get_layer(layer)
    }
}

/// Render `pages` of `records` into a PDF written to `destination`.
///
/// Every code image is produced before anything is drawn, and nothing is
/// written to `destination` unless the whole document renders.
pub fn render_cards<W: Write>(
    records: &[TrackRecord],
    pages: &[Page],
    params: &LayoutParameters,
    fields: &BackFields,
    producer: &dyn CodeImageProducer,
    destination: W,
) -> Result<RenderSummary> {
    let images = pages
        .iter()
        .flat_map(Page::cards)
        .map(|card| {
            let record = records.get(card).ok_or_else(|| {
                Error::PdfError(format!("layout refers to missing card {card}"))
            })?;
            producer.produce(card, &record.link)
        })
        .collect::<Result<Vec<DynamicImage>>>()?;
    debug!("Produced {} code images", images.len());

    let (doc, page1, layer1) = PdfDocument::new(
        DOCUMENT_TITLE,
        Mm(params.page_width),
        Mm(params.page_height),
        "Layer 1",
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| Error::PdfError(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| Error::PdfError(e.to_string()))?,
    };

    let mut sides = Sides {
        doc: &doc,
        params,
        initial: Some((page1, layer1)),
        count: 0,
    };
    let mut images = images.into_iter();

    for page in pages {
        // Front side (QR codes)
        let layer = sides.next_side();
        for slot in &page.front {
            draw_border(&layer, &slot.rect);
            if slot.card.is_some() {
                let image = images
                    .next()
                    .ok_or_else(|| Error::PdfError("code image missing".into()))?;
                embed_code_image(&layer, &image, &slot.rect);
            }
        }

        // Back side (text), mirrored per row
        let layer = sides.next_side();
        for slot in &page.back {
            draw_border(&layer, &slot.rect);
            if let Some(card) = slot.card {
                draw_back_text(&layer, &fonts, &records[card], fields, &slot.rect);
            }
        }
    }

    let summary = RenderSummary {
        sheet_sides: sides.count.max(1),
        cards: pages.iter().map(|p| p.cards().count()).sum(),
    };

    let mut writer = BufWriter::new(destination);
    doc.save(&mut writer)
        .map_err(|e| Error::PdfError(e.to_string()))?;
    writer.flush()?;

    debug!(
        "Rendered {} cards on {} sheet sides",
        summary.cards, summary.sheet_sides
    );
    Ok(summary)
}

fn draw_border(layer: &PdfLayerReference, rect: &CardRect) {
    let line_color = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));
    layer.set_outline_color(line_color);
    layer.set_outline_thickness(BORDER_THICKNESS);

    let (x1, y1) = (rect.x, rect.y);
    let (x2, y2) = (rect.x + rect.width, rect.top());
    let points = vec![
        (Point::new(Mm(x1), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y1)), false),
        (Point::new(Mm(x2), Mm(y2)), false),
        (Point::new(Mm(x1), Mm(y2)), false),
    ];
    layer.add_line(Line {
        points,
        is_closed: true,
    });
}

/// Square placement of the code image: centred horizontally, in the upper
/// part of the card.
pub fn code_image_rect(rect: &CardRect) -> CardRect {
    let size = QR_SIZE_MM
        .min(rect.width - 2.0 * CARD_MARGIN_MM)
        .min(rect.height - 2.0 * CARD_MARGIN_MM)
        .max(1.0);
    let top_gap = (rect.height - size) / 3.0;
    CardRect {
        x: rect.center_x() - size / 2.0,
        y: rect.top() - top_gap - size,
        width: size,
        height: size,
    }
}

fn embed_code_image(layer: &PdfLayerReference, code: &DynamicImage, rect: &CardRect) {
    let target = code_image_rect(rect);
    let rgb_image = code.to_rgb8();
    let (width, height) = rgb_image.dimensions();

    let image = Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: rgb_image.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // DPI = pixels / (mm / 25.4)
    let dpi = width as f32 / (target.width / 25.4);

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(target.x)),
            translate_y: Some(Mm(target.y)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
}

fn draw_back_text(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    record: &TrackRecord,
    fields: &BackFields,
    rect: &CardRect,
) {
    let max_width = rect.width - 2.0 * CARD_MARGIN_MM;
    let mut baseline = rect.top() - TEXT_TOP_OFFSET_MM;
    for line in back_text_lines(record, fields, max_width) {
        baseline -= line.height();
        if line.text.is_empty() {
            continue;
        }
        let width = text_width(&line.text, line.face, line.font_size);
        layer.use_text(
            line.text.as_str(),
            line.font_size,
            Mm(rect.center_x() - width / 2.0),
            Mm(baseline),
            fonts.get(line.face),
        );
    }
}
