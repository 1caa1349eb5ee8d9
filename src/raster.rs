//! Detail view rasterization for the single-record PDF.
//!
//! The panel is drawn at 2× scale on a white background: name heading, one row per
//! labelled field, then a grid of attachment cards. Thumbnails that never arrived
//! leave a blank card; links without a thumbnail get a generic file icon.

use crate::attachment::AttachmentRef;
use crate::detail::DetailView;
use crate::error::{DashboardError, Result};
use crate::graph::encode_rgb_png;
use crate::pdf::{DetailLayout, detail_filename, layout_detail, wrap_text};
use crate::thumbnails::wait_for_thumbnails;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::DynamicImage;
use image::imageops::FilterType;
use plotters::prelude::*;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Device pixels per layout pixel
pub const SCALE: f64 = 2.0;

const PANEL_WIDTH: f64 = 760.0;
const PADDING: f64 = 24.0;
const HEADING_PX: f64 = 22.0;
const TEXT_PX: f64 = 14.0;
const LINE_FACTOR: f64 = 1.5;
const LABEL_WIDTH: f64 = 190.0;
const ROW_GAP: f64 = 6.0;
const CARD_SIZE: f64 = 150.0;
const CARD_GAP: f64 = 16.0;
const CAPTION_HEIGHT: f64 = 24.0;
const CARDS_PER_ROW: usize = 4;
/// Wrapped lines shown per field before the value is cut off with an ellipsis
pub const MAX_FIELD_LINES: usize = 40;
const MAX_HEADING_LINES: usize = 3;

const FONT: &str = "sans-serif";
const MM_PER_PX: f64 = 25.4 / 96.0;
const PT_PER_PX: f64 = 0.75;

/// Encoded raster with its pixel size
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// The detail export: page layout plus the image to place on it
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPdf {
    pub filename: String,
    pub layout: DetailLayout,
    pub png_base64: String,
}

fn px(v: f64) -> i32 {
    (v * SCALE).round() as i32
}

fn wrap_px(text: &str, max_px: f64, font_px: f64) -> Vec<String> {
    wrap_text(text, max_px * MM_PER_PX, font_px * PT_PER_PX)
}

/// Keep at most `max` lines, marking the cut on the last one kept
fn truncate_lines(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if lines.len() > max {
        lines.truncate(max);
        if let Some(last) = lines.last_mut() {
            last.pop();
            last.push('…');
        }
    }
    lines
}

struct FieldBlock<'a> {
    label: &'a str,
    lines: Vec<String>,
    top: f64,
}

struct PanelPlan<'a> {
    heading: Vec<String>,
    fields: Vec<FieldBlock<'a>>,
    attachments_top: f64,
    height: f64,
}

fn plan(view: &DetailView) -> PanelPlan<'_> {
    let line = TEXT_PX * LINE_FACTOR;
    let heading = truncate_lines(
        wrap_px(&view.name, PANEL_WIDTH - PADDING * 2.0, HEADING_PX),
        MAX_HEADING_LINES,
    );
    let mut y = PADDING + heading.len() as f64 * HEADING_PX * LINE_FACTOR + ROW_GAP * 2.0;

    let value_width = PANEL_WIDTH - PADDING * 2.0 - LABEL_WIDTH;
    let fields = view
        .fields
        .iter()
        .map(|field| {
            let lines = truncate_lines(
                wrap_px(&field.value, value_width, TEXT_PX),
                MAX_FIELD_LINES,
            );
            let block = FieldBlock {
                label: field.label,
                top: y,
                lines,
            };
            y += block.lines.len() as f64 * line + ROW_GAP;
            block
        })
        .collect();

    let attachments_top = y + ROW_GAP;
    if !view.attachments.is_empty() {
        let rows = view.attachments.len().div_ceil(CARDS_PER_ROW);
        y = attachments_top
            + line
            + rows as f64 * (CARD_SIZE + CAPTION_HEIGHT + CARD_GAP);
    }

    PanelPlan {
        heading,
        fields,
        attachments_top,
        height: y + PADDING,
    }
}

/// Draw the detail panel and encode it as PNG.
///
/// `thumbnails` lines up with `view.attachments`; missing entries are treated as
/// thumbnails that did not load.
pub fn rasterize_detail(
    view: &DetailView,
    thumbnails: &[Option<DynamicImage>],
) -> Result<RasterImage> {
    let plan = plan(view);
    let width = px(PANEL_WIDTH) as u32;
    let height = px(plan.height) as u32;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    draw_panel(&mut buffer, (width, height), view, &plan, thumbnails)
        .map_err(|e| DashboardError::Render(e.to_string()))?;

    Ok(RasterImage {
        png: encode_rgb_png(buffer, width, height)?,
        width,
        height,
    })
}

fn draw_panel(
    buffer: &mut [u8],
    size: (u32, u32),
    view: &DetailView,
    plan: &PanelPlan<'_>,
    thumbnails: &[Option<DynamicImage>],
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buffer, size).into_drawing_area();
    root.fill(&WHITE)?;

    let heading_font = (FONT, px(HEADING_PX)).into_font();
    for (i, text) in plan.heading.iter().enumerate() {
        let y = PADDING + i as f64 * HEADING_PX * LINE_FACTOR;
        root.draw(&Text::new(
            text.clone(),
            (px(PADDING), px(y)),
            heading_font.clone(),
        ))?;
    }

    let line = TEXT_PX * LINE_FACTOR;
    let label_font = (FONT, px(TEXT_PX)).into_font().color(&RGBColor(0x55, 0x55, 0x55));
    let value_font = (FONT, px(TEXT_PX)).into_font();
    for block in &plan.fields {
        root.draw(&Text::new(
            block.label.to_string(),
            (px(PADDING), px(block.top)),
            label_font.clone(),
        ))?;
        for (i, text) in block.lines.iter().enumerate() {
            root.draw(&Text::new(
                text.clone(),
                (px(PADDING + LABEL_WIDTH), px(block.top + i as f64 * line)),
                value_font.clone(),
            ))?;
        }
    }

    if view.attachments.is_empty() {
        root.present()?;
        return Ok(());
    }

    root.draw(&Text::new(
        crate::record::labels::ATTACHMENT,
        (px(PADDING), px(plan.attachments_top)),
        label_font,
    ))?;

    let grid_top = plan.attachments_top + line;
    for (i, attachment) in view.attachments.iter().enumerate() {
        let column = (i % CARDS_PER_ROW) as f64;
        let row = (i / CARDS_PER_ROW) as f64;
        let x = PADDING + column * (CARD_SIZE + CARD_GAP);
        let y = grid_top + row * (CARD_SIZE + CAPTION_HEIGHT + CARD_GAP);
        let image = thumbnails.get(i).and_then(Option::as_ref);
        draw_card(&root, attachment, image, (x, y), &value_font)?;
    }

    root.present()?;
    Ok(())
}

fn draw_card(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    attachment: &AttachmentRef,
    image: Option<&DynamicImage>,
    (x, y): (f64, f64),
    font: &FontDesc<'_>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let border = RGBColor(0xDD, 0xDD, 0xDD);
    let (left, top) = (px(x), px(y));
    let (right, bottom) = (px(x + CARD_SIZE), px(y + CARD_SIZE));
    area.draw(&Rectangle::new([(left, top), (right, bottom)], border.stroke_width(2)))?;

    match (attachment.thumbnail.is_some(), image) {
        (true, Some(image)) => {
            let inner = px(CARD_SIZE - 8.0) as u32;
            let fitted = image.resize(inner, inner, FilterType::Triangle).to_rgb8();
            let (w, h) = fitted.dimensions();
            let origin = (
                left + (right - left - w as i32) / 2,
                top + (bottom - top - h as i32) / 2,
            );
            let element: Option<BitMapElement<'_, (i32, i32)>> =
                BitMapElement::with_owned_buffer(origin, (w, h), fitted.into_raw());
            if let Some(element) = element {
                area.draw(&element)?;
            }
        }
        // Thumbnail did not load in time
        (true, None) => {}
        (false, _) => {
            let icon = RGBColor(0x9E, 0x9E, 0x9E);
            let (cx, cy) = ((left + right) / 2, (top + bottom) / 2);
            let (w, h) = (px(36.0), px(46.0));
            area.draw(&Rectangle::new(
                [(cx - w / 2, cy - h / 2), (cx + w / 2, cy + h / 2)],
                icon.stroke_width(3),
            ))?;
            for offset in [-10.0, 0.0, 10.0] {
                let ly = cy + px(offset);
                area.draw(&PathElement::new(
                    vec![(cx - w / 3, ly), (cx + w / 3, ly)],
                    icon.stroke_width(2),
                ))?;
            }
        }
    }

    area.draw(&Text::new(
        attachment.caption(),
        (left, px(y + CARD_SIZE + 4.0)),
        font.clone(),
    ))?;
    Ok(())
}

/// Build the detail PDF for one record: wait for thumbnails, rasterize the panel and
/// fit it onto a portrait page.
pub async fn export_detail_pdf(
    client: &Client,
    view: &DetailView,
    image_timeout: Duration,
) -> Result<DetailPdf> {
    let thumbnails = wait_for_thumbnails(client, &view.attachments, image_timeout).await;
    let raster = rasterize_detail(view, &thumbnails)?;
    let layout = layout_detail(raster.width, raster.height)?;
    log::info!(
        "rasterized detail for {:?} at {}x{}",
        view.name,
        raster.width,
        raster.height
    );

    Ok(DetailPdf {
        filename: detail_filename(&view.name),
        layout,
        png_base64: STANDARD.encode(&raster.png),
    })
}
