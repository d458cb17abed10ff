//! Renders a label table into a printable PDF sheet of cards, one card per table row.

mod layout;
mod text;

pub use layout::{LabelLayout, Placement};

use crate::error::RosterError;
use crate::model::Table;
use crate::report::{LABEL_GRADE, LABEL_SCHOOL, LABEL_TOTAL};
use crate::Result;
use anyhow::{anyhow, Context};
use image::DynamicImage;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use serde::Serialize;
use text::{pt_to_mm, wrap, Weight, LEADING};
use tracing::{debug, trace, warn};

const TITLE: &str = "Etiquetas";
const LAYER: &str = "Etiquetas";

/// Resolution the logo is embedded at before scaling to the card width.
const LOGO_DPI: f32 = 300.0;

/// Logos wider or taller than this are downscaled before embedding.
const LOGO_MAX_PX: u32 = 1200;

/// Gap between the card edge and its contents.
const PADDING_MM: f32 = 1.0;

/// The finished document.
#[derive(Debug, Clone, Serialize)]
pub struct LabelDocument {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub labels: usize,
}

/// The text printed on every card of a run.
#[derive(Debug, Clone, Copy)]
pub struct Heading<'a> {
    pub championship: &'a str,
    pub stage: &'a str,
}

/// The values of one row that end up on a card, taken verbatim from the table.
struct CardText {
    school: String,
    grade: String,
    total: String,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Composes one card per row of `table`, in row order.
///
/// `table` needs the columns `NOME ESCOLA`, `ANO ESCOLAR` and `TOTAL`; other columns are ignored.
/// `logo` is any raster format the `image` crate can decode.
///
/// # Errors
/// - The logo cannot be decoded.
/// - `RosterError::LabelRender` when a row lacks one of the required values. Nothing is returned
///   in that case; the error tells how many pages had been finished.
pub fn compose(
    table: &Table,
    logo: &[u8],
    heading: Heading<'_>,
    layout: &LabelLayout,
) -> Result<LabelDocument> {
    layout.validate()?;
    let logo = decode_logo(logo)?;
    if table.is_empty() {
        warn!("The label table is empty, the document will have a single blank page");
    }

    let (doc, page, layer) = PdfDocument::new(
        TITLE,
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        LAYER,
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Unable to load the regular font: {e:?}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Unable to load the bold font: {e:?}"))?,
    };

    let mut current = doc.get_page(page).get_layer(layer);
    let mut pages = 1;
    let placements = layout.place(table.len());
    for (row, placement) in placements.iter().enumerate() {
        let card = card_text(table, row, placement.page)?;
        if placement.starts_page() && placement.page > 0 {
            current = new_page(&doc, layout);
            pages += 1;
            trace!("Started page {pages}");
        }
        draw_card(&current, placement, layout, &logo, &fonts, heading, &card);
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| anyhow!("Unable to finish the label document: {e:?}"))?;
    debug!("Composed {} labels on {pages} pages", table.len());
    Ok(LabelDocument {
        bytes,
        pages,
        labels: table.len(),
    })
}

fn decode_logo(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes).context("Unable to decode the logo image")?;
    let img = if img.width() > LOGO_MAX_PX || img.height() > LOGO_MAX_PX {
        debug!(
            "Downscaling the {}x{} logo to fit {LOGO_MAX_PX}px",
            img.width(),
            img.height()
        );
        img.thumbnail(LOGO_MAX_PX, LOGO_MAX_PX)
    } else {
        img
    };
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

fn new_page(doc: &PdfDocumentReference, layout: &LabelLayout) -> PdfLayerReference {
    let (page, layer) = doc.add_page(
        Mm(layout.page_width_mm),
        Mm(layout.page_height_mm),
        LAYER,
    );
    doc.get_page(page).get_layer(layer)
}

fn card_text(table: &Table, row: usize, page: usize) -> Result<CardText> {
    let value = |column: &str| -> Result<String> {
        table
            .column_index(column)
            .and_then(|col| table.get(row, col))
            .filter(|cell| !cell.is_blank())
            .map(|cell| cell.to_string())
            .ok_or_else(|| {
                RosterError::LabelRender {
                    row,
                    field: column.to_string(),
                    pages_finished: page,
                }
                .into()
            })
    };
    Ok(CardText {
        school: value(LABEL_SCHOOL)?,
        grade: value(LABEL_GRADE)?,
        total: value(LABEL_TOTAL)?,
    })
}

fn draw_card(
    layer: &PdfLayerReference,
    at: &Placement,
    layout: &LabelLayout,
    logo: &DynamicImage,
    fonts: &Fonts,
    heading: Heading<'_>,
    card: &CardText,
) {
    let (x, y) = (at.x_mm, at.y_mm);
    let (w, h) = (layout.label_width_mm, layout.label_height_mm);

    layer.set_outline_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y)), false),
            (Point::new(Mm(x + w), Mm(y + h)), false),
            (Point::new(Mm(x), Mm(y + h)), false),
        ],
        is_closed: true,
    });

    let logo_w = w - 2.0 * PADDING_MM;
    let natural_w = logo.width() as f32 / LOGO_DPI * 25.4;
    let natural_h = logo.height() as f32 / LOGO_DPI * 25.4;
    Image::from_dynamic_image(logo).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x + PADDING_MM)),
            translate_y: Some(Mm(y + h - layout.logo_height_mm)),
            scale_x: Some(logo_w / natural_w),
            scale_y: Some(layout.logo_height_mm / natural_h),
            dpi: Some(LOGO_DPI),
            ..Default::default()
        },
    );

    let blocks = [
        (heading.championship.to_string(), Weight::Regular),
        (heading.stage.to_string(), Weight::Bold),
        (format!("ESCOLA: {}", card.school), Weight::Bold),
        (format!("{} PROVAS: {}", card.grade, card.total), Weight::Bold),
    ];
    let size = layout.font_size_pt;
    let line_h = pt_to_mm(size) * LEADING;
    let mut baseline = y + h - layout.logo_height_mm - PADDING_MM - line_h;
    for (content, weight) in blocks {
        let font = match weight {
            Weight::Regular => &fonts.regular,
            Weight::Bold => &fonts.bold,
        };
        for line in wrap(&content, size, weight, logo_w) {
            if baseline < y + PADDING_MM {
                trace!("Card text overflows at '{line}'");
            }
            let line_w = text::width_mm(&line, size, weight);
            let left = x + ((w - line_w) / 2.0).max(PADDING_MM);
            layer.use_text(line, size, Mm(left), Mm(baseline), font);
            baseline -= line_h;
        }
    }
}
