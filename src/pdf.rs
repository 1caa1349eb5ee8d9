//! Page layout for the two PDF exports.
//!
//! Nothing here writes PDF bytes. Each export is a serializable layout document in
//! millimetres (page size, positioned text, table rows, image placement) that a PDF
//! writer on the client side draws verbatim.

use crate::aggregate::Summary;
use crate::dates::DateParser;
use crate::error::{DashboardError, Result};
use crate::record::{Record, labels};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const MM_PER_PT: f64 = 25.4 / 72.0;
const LINE_HEIGHT_FACTOR: f64 = 1.15;

pub const TABLE_FILENAME: &str = "ข้อมูลผลงานครูและนักเรียน.pdf";
pub const REPORT_TITLE: &str = "ระบบสารสนเทศผลงานครูและนักเรียน";
pub const REPORT_SUBTITLE: &str = "โรงเรียนหางดงรัฐราษฎร์อุปถัมภ์";
pub const FOOTER_CREDIT: &str = "จัดทำโดย กลุ่มงานวิชาการ โรงเรียนหางดงรัฐราษฎร์อุปถัมภ์";

const TABLE_TOP: f64 = 70.0;
const CONTINUATION_TOP: f64 = 20.0;
const BOTTOM_MARGIN: f64 = 20.0;
const HEADER_HEIGHT: f64 = 10.0;
const CELL_PADDING: f64 = 2.0;
const HEADER_FONT_PT: f64 = 10.0;
const BODY_FONT_PT: f64 = 9.0;
const HEADER_FILL: [u8; 3] = [255, 200, 200];
const EVEN_ROW_FILL: [u8; 3] = [245, 245, 245];
const ODD_ROW_FILL: [u8; 3] = [255, 255, 255];

const DETAIL_TOP_MARGIN: f64 = 25.4;
const DETAIL_SIDE_MARGIN: f64 = 10.0;
const DETAIL_FOOTER_BAND: f64 = 20.0;
const DETAIL_FOOTER_OFFSET: f64 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

pub const A4_PORTRAIT: PageSize = PageSize {
    width: 210.0,
    height: 297.0,
};

pub const A4_LANDSCAPE: PageSize = PageSize {
    width: 297.0,
    height: 210.0,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub align: Align,
}

impl TextItem {
    fn new(text: impl Into<String>, x: f64, y: f64, font_size: f64, align: Align) -> Self {
        TextItem {
            text: text.into(),
            x,
            y,
            font_size,
            align,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub title: &'static str,
    pub width: f64,
}

pub const TABLE_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec { title: labels::START_DATE, width: 28.0 },
    ColumnSpec { title: labels::END_DATE, width: 28.0 },
    ColumnSpec { title: labels::NAME, width: 45.0 },
    ColumnSpec { title: labels::ACTIVITY_TYPE, width: 45.0 },
    ColumnSpec { title: labels::ACTIVITY_NAME, width: 55.0 },
    ColumnSpec { title: labels::OUTCOME, width: 55.0 },
    ColumnSpec { title: "ชั่วโมงอบรม", width: 25.0 },
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub y: f64,
    pub height: f64,
    pub fill: [u8; 3],
    /// Wrapped lines per column
    pub cells: Vec<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePage {
    pub header_y: f64,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub filename: &'static str,
    pub page: PageSize,
    /// Title block, printed once on the first page
    pub heading: Vec<TextItem>,
    pub columns: Vec<ColumnSpec>,
    pub start_x: f64,
    pub table_width: f64,
    pub header_height: f64,
    pub header_fill: [u8; 3],
    pub header_font_size: f64,
    pub body_font_size: f64,
    pub cell_padding: f64,
    pub line_height: f64,
    pub pages: Vec<TablePage>,
    /// Printed once, at the bottom of the last page
    pub footer: TextItem,
}

impl TableLayout {
    pub fn row_count(&self) -> usize {
        self.pages.iter().map(|p| p.rows.len()).sum()
    }
}

/// Line height in millimetres for a font size in points
pub fn line_height_mm(font_pt: f64) -> f64 {
    font_pt * LINE_HEIGHT_FACTOR * MM_PER_PT
}

/// Advance width of one character, in em
fn glyph_em(c: char) -> f64 {
    match c {
        // Thai vowel and tone marks sit above or below the base consonant
        '\u{0E31}' | '\u{0E34}'..='\u{0E3A}' | '\u{0E47}'..='\u{0E4E}' => 0.0,
        '\u{0300}'..='\u{036F}' | '\u{200B}'..='\u{200D}' => 0.0,
        ' ' => 0.25,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.6,
        _ => 0.5,
    }
}

/// Estimated rendered width of `text` in millimetres
pub fn text_width_mm(text: &str, font_pt: f64) -> f64 {
    text.chars().map(glyph_em).sum::<f64>() * font_pt * MM_PER_PT
}

/// Greedy word wrap to `max_width_mm`.
///
/// Breaks on spaces and explicit newlines; a word wider than the column is split
/// between characters. Always returns at least one line.
pub fn wrap_text(text: &str, max_width_mm: f64, font_pt: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width_mm(&candidate, font_pt) <= max_width_mm {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            for c in word.chars() {
                current.push(c);
                if text_width_mm(&current, font_pt) > max_width_mm && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                }
            }
        }
        lines.push(current);
    }

    lines
}

fn or_dash(value: &str) -> String {
    if value.is_empty() { "-".to_string() } else { value.to_string() }
}

fn table_cells(record: &Record, parser: &DateParser) -> [String; 7] {
    [
        parser.format_display_date(&record.start_date),
        parser.format_display_date(&record.end_date),
        or_dash(&record.name),
        or_dash(&record.activity_type),
        or_dash(&record.activity_name),
        or_dash(&record.outcome),
        or_dash(record.training_hours.as_deref().unwrap_or("")),
    ]
}

/// Thai numeric date with Buddhist year, e.g. `19/10/2569`
pub fn format_print_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year() + 543)
}

/// Lay the filtered records out as a paginated landscape table.
///
/// Row height follows the tallest wrapped cell. A row that would cross the bottom
/// margin starts a new page with a fresh header band.
pub fn layout_table(
    records: &[Record],
    summary: &Summary,
    printed_on: NaiveDate,
    parser: &DateParser,
) -> Result<TableLayout> {
    if records.is_empty() {
        return Err(DashboardError::NothingToExport);
    }

    let page = A4_LANDSCAPE;
    let table_width: f64 = TABLE_COLUMNS.iter().map(|c| c.width).sum();
    let start_x = (page.width - table_width) / 2.0;
    let line_height = line_height_mm(BODY_FONT_PT);
    let page_limit = page.height - BOTTOM_MARGIN;

    let heading = vec![
        TextItem::new(REPORT_TITLE, page.width / 2.0, 20.0, 18.0, Align::Center),
        TextItem::new(REPORT_SUBTITLE, page.width / 2.0, 30.0, 14.0, Align::Center),
        TextItem::new(
            format!("วันที่พิมพ์: {}", format_print_date(printed_on)),
            10.0,
            40.0,
            10.0,
            Align::Left,
        ),
        TextItem::new(
            format!("จำนวนรายการทั้งหมด: {} รายการ", summary.count),
            10.0,
            50.0,
            12.0,
            Align::Left,
        ),
        TextItem::new(
            format!("จำนวนชั่วโมงอบรมรวม: {} ชั่วโมง", summary.display_hours()),
            10.0,
            60.0,
            12.0,
            Align::Left,
        ),
    ];

    let mut pages = vec![TablePage {
        header_y: TABLE_TOP,
        rows: Vec::new(),
    }];
    let mut current_y = TABLE_TOP + HEADER_HEIGHT;

    for (index, record) in records.iter().enumerate() {
        let cells: Vec<Vec<String>> = table_cells(record, parser)
            .iter()
            .zip(TABLE_COLUMNS.iter())
            .map(|(text, column)| wrap_text(text, column.width - CELL_PADDING * 2.0, BODY_FONT_PT))
            .collect();
        let tallest = cells.iter().map(Vec::len).max().unwrap_or(1) as f64;
        let height = tallest * line_height + CELL_PADDING * 2.0;

        let page_has_rows = pages.last().is_some_and(|page| !page.rows.is_empty());
        if page_has_rows && current_y + height > page_limit {
            pages.push(TablePage {
                header_y: CONTINUATION_TOP,
                rows: Vec::new(),
            });
            current_y = CONTINUATION_TOP + HEADER_HEIGHT;
        }

        let fill = if index % 2 == 0 { EVEN_ROW_FILL } else { ODD_ROW_FILL };
        if let Some(page) = pages.last_mut() {
            page.rows.push(TableRow {
                y: current_y,
                height,
                fill,
                cells,
            });
        }
        current_y += height;
    }

    log::debug!(
        "laid out {} records over {} table pages",
        records.len(),
        pages.len()
    );

    Ok(TableLayout {
        filename: TABLE_FILENAME,
        page,
        heading,
        columns: TABLE_COLUMNS.to_vec(),
        start_x,
        table_width,
        header_height: HEADER_HEIGHT,
        header_fill: HEADER_FILL,
        header_font_size: HEADER_FONT_PT,
        body_font_size: BODY_FONT_PT,
        cell_padding: CELL_PADDING,
        line_height,
        pages,
        footer: TextItem::new(
            FOOTER_CREDIT,
            page.width / 2.0,
            page.height - 10.0,
            10.0,
            Align::Center,
        ),
    })
}

/// Where the raster goes on the page
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailLayout {
    pub page: PageSize,
    pub image: Placement,
    pub footer: TextItem,
}

pub fn detail_filename(name: &str) -> String {
    let name = if name.is_empty() { "ข้อมูล" } else { name };
    format!("รายละเอียด-{name}.pdf")
}

/// Fit a raster of `image_width`×`image_height` pixels onto a portrait page.
///
/// The image spans the page width minus side margins unless that would run into the
/// footer band, in which case it is scaled down to the available height. Aspect ratio
/// is kept and the image is centred horizontally below a fixed top margin.
pub fn layout_detail(image_width: u32, image_height: u32) -> Result<DetailLayout> {
    if image_width == 0 || image_height == 0 {
        return Err(DashboardError::Render(format!(
            "cannot place an empty raster ({image_width}x{image_height})"
        )));
    }

    let page = A4_PORTRAIT;
    let ratio = image_width as f64 / image_height as f64;
    let available_width = page.width - DETAIL_SIDE_MARGIN * 2.0;
    let available_height = page.height - DETAIL_TOP_MARGIN - DETAIL_FOOTER_BAND;

    let mut width = available_width;
    let mut height = width / ratio;
    if height > available_height {
        height = available_height;
        width = height * ratio;
    }

    Ok(DetailLayout {
        page,
        image: Placement {
            x: (page.width - width) / 2.0,
            y: DETAIL_TOP_MARGIN,
            width,
            height,
        },
        footer: TextItem::new(
            FOOTER_CREDIT,
            page.width / 2.0,
            page.height - DETAIL_FOOTER_OFFSET,
            10.0,
            Align::Center,
        ),
    })
}
