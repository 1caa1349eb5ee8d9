use crate::aggregate::{CategoryCounts, ChartField};
use serde::Serialize;
#[cfg(feature = "web")]
use plotters::{
    element::Pie,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

/// Slice colours, reused in order when there are more categories than colours
pub const PALETTE: [(u8, u8, u8); 10] = [
    (0xFF, 0x63, 0x84),
    (0x36, 0xA2, 0xEB),
    (0xFF, 0xCE, 0x56),
    (0x4B, 0xC0, 0xC0),
    (0x99, 0x66, 0xFF),
    (0xFF, 0x9F, 0x40),
    (0x8A, 0xC2, 0x49),
    (0xEA, 0x80, 0xFC),
    (0x00, 0xE5, 0xFF),
    (0xFF, 0x52, 0x52),
];

/// Shown instead of a pie when the result is empty
pub const EMPTY_CHART_TEXT: &str = "ไม่พบข้อมูล";

/// Configuration options for chart rendering
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Width of the image in pixels
    pub width: u32,

    /// Height of the image in pixels
    pub height: u32,

    /// Font family for title, legend and percentages
    pub font: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            font: "sans-serif".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: usize,
    /// Share of the total, one decimal place
    pub percentage: f64,
    /// `#RRGGBB`
    pub color: String,
    /// `label: value (pct%)`
    pub legend: String,
}

/// Everything a pie chart needs, derived from one frequency table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartData {
    pub field: ChartField,
    pub title: &'static str,
    pub total: usize,
    pub slices: Vec<ChartSlice>,
}

impl ChartData {
    pub fn from_counts(field: ChartField, counts: &CategoryCounts) -> Self {
        let total = counts.total();
        let slices = counts
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let percentage = if total == 0 {
                    0.0
                } else {
                    (entry.count as f64 / total as f64 * 1000.0).round() / 10.0
                };
                let (r, g, b) = PALETTE[i % PALETTE.len()];
                ChartSlice {
                    label: entry.value.clone(),
                    value: entry.count,
                    percentage,
                    color: format!("#{r:02X}{g:02X}{b:02X}"),
                    legend: format!("{}: {} ({:.1}%)", entry.value, entry.count, percentage),
                }
            })
            .collect();

        ChartData {
            field,
            title: field.title(),
            total,
            slices,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Render a pie chart with a legend to PNG
///
/// # Arguments
/// * `data` - Slices to draw; an empty chart renders the "no data" state
/// * `options` - Image size and font
///
/// # Returns
/// * PNG bytes, or a render error
#[cfg(feature = "web")]
pub fn render_pie_chart(
    data: &ChartData,
    options: &GraphOptions,
) -> crate::error::Result<Vec<u8>> {
    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];

    draw_pie(&mut buffer, data, options)
        .map_err(|e| crate::error::DashboardError::Render(e.to_string()))?;

    encode_rgb_png(buffer, width, height)
}

#[cfg(feature = "web")]
fn draw_pie(
    buffer: &mut [u8],
    data: &ChartData,
    options: &GraphOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let font = options.font.as_str();
    let root =
        BitMapBackend::with_buffer(buffer, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(data.title, (font, 24).into_font())?;

    if data.is_empty() {
        let (w, h) = root.dim_in_pixel();
        let grey = BLACK.mix(0.5);
        let style = TextStyle::from((font, 20).into_font())
            .color(&grey)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(EMPTY_CHART_TEXT, (w as i32 / 2, h as i32 / 2), style))?;
        root.present()?;
        return Ok(());
    }

    let (w, _) = root.dim_in_pixel();
    let (pie_area, legend_area) = root.split_horizontally(w * 11 / 20);

    let (pw, ph) = pie_area.dim_in_pixel();
    let center = (pw as i32 / 2, ph as i32 / 2);
    let radius = (pw.min(ph) as f64 / 2.0) * 0.85;
    let sizes: Vec<f64> = data.slices.iter().map(|s| s.value as f64).collect();
    let colors: Vec<RGBColor> = (0..data.slices.len())
        .map(|i| {
            let (r, g, b) = PALETTE[i % PALETTE.len()];
            RGBColor(r, g, b)
        })
        .collect();
    let labels: Vec<&str> = data.slices.iter().map(|_| "").collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.percentages((font, 14).into_font().color(&BLACK));
    pie_area.draw(&pie)?;

    for (i, slice) in data.slices.iter().enumerate() {
        let y = 10 + i as i32 * 24;
        legend_area.draw(&Rectangle::new([(4, y), (18, y + 14)], colors[i].filled()))?;
        legend_area.draw(&Text::new(
            slice.legend.clone(),
            (26, y),
            (font, 16).into_font(),
        ))?;
    }

    root.present()?;
    Ok(())
}

/// Encode a packed RGB buffer as PNG
#[cfg(feature = "web")]
pub(crate) fn encode_rgb_png(buffer: Vec<u8>, width: u32, height: u32) -> crate::error::Result<Vec<u8>> {
    use crate::error::DashboardError;

    let img = image::RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        DashboardError::Render(format!("buffer does not match {width}x{height} image"))
    })?;
    let mut png = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageOutputFormat::Png,
        )
        .map_err(|e| DashboardError::Render(e.to_string()))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[&str]) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for v in values {
            counts.increment(v);
        }
        counts
    }

    #[test]
    fn slices_carry_share_colour_and_legend() {
        let data = ChartData::from_counts(ChartField::Status, &counts(&["ครู", "ครู", "นักเรียน"]));
        assert_eq!(data.title, "สถานะ");
        assert_eq!(data.total, 3);
        assert_eq!(data.slices[0].percentage, 66.7);
        assert_eq!(data.slices[0].color, "#FF6384");
        assert_eq!(data.slices[0].legend, "ครู: 2 (66.7%)");
        assert_eq!(data.slices[1].legend, "นักเรียน: 1 (33.3%)");
    }

    #[test]
    fn palette_cycles_past_ten_categories() {
        let values: Vec<String> = (0..12).map(|i| format!("v{i}")).collect();
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let data = ChartData::from_counts(ChartField::Level, &counts(&refs));
        assert_eq!(data.slices[10].color, data.slices[0].color);
        assert_eq!(data.slices[11].color, "#36A2EB");
    }

    #[test]
    fn empty_counts_give_empty_chart() {
        let data = ChartData::from_counts(ChartField::Format, &CategoryCounts::default());
        assert!(data.is_empty());
        assert_eq!(data.total, 0);
    }

    #[cfg(feature = "web")]
    #[test]
    fn renders_pie_and_empty_state_as_png() {
        let options = GraphOptions::default();
        let data = ChartData::from_counts(ChartField::Status, &counts(&["ครู", "ครู", "นักเรียน"]));
        let pie = render_pie_chart(&data, &options).unwrap();
        assert!(pie.starts_with(b"\x89PNG"));

        let empty = ChartData::from_counts(ChartField::Status, &CategoryCounts::default());
        let placeholder = render_pie_chart(&empty, &options).unwrap();
        assert!(placeholder.starts_with(b"\x89PNG"));
        assert_ne!(pie, placeholder);

        use image::GenericImageView;
        let decoded = image::load_from_memory(&pie).unwrap();
        assert_eq!(decoded.dimensions(), (options.width, options.height));
    }
}
