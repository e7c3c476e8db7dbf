//! Screenshot annotation — numbered label boxes stacked top to bottom.
//!
//! Box positions are purely sequential: they are not tied to where the
//! labelled element sits in the image.

use crate::contract::{Severity, VisualLabel};
use crate::upload::encode_png;
use base64::Engine;
use image::{Rgb, RgbImage};

const LEFT: u32 = 20;
const FIRST_Y: u32 = 30;
const STEP_Y: u32 = 45;
const PAD_ABOVE: u32 = 8;
const PAD_BELOW: u32 = 28;
const TEXT_INSET: u32 = 10;
const CHAR_WIDTH: u32 = 9;
const OUTLINE_WIDTH: u32 = 2;

const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Outline and fill colour of one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxColors {
    pub outline: Rgb<u8>,
    pub fill: Rgb<u8>,
}

/// Colours for a label. Labels without a severity use the error palette.
pub fn colors_for(severity: Option<Severity>) -> BoxColors {
    match severity {
        Some(Severity::Info) => BoxColors {
            outline: Rgb([60, 120, 220]),
            fill: Rgb([220, 232, 255]),
        },
        Some(Severity::Warning) => BoxColors {
            outline: Rgb([230, 160, 0]),
            fill: Rgb([255, 240, 200]),
        },
        Some(Severity::Error) | None => BoxColors {
            outline: Rgb([255, 80, 80]),
            fill: Rgb([255, 220, 220]),
        },
    }
}

/// One positioned label box. Coordinates are inclusive pixel bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBox {
    pub text: String,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub text_x: u32,
    pub text_y: u32,
    pub colors: BoxColors,
}

/// Lay out one box per label, numbered from 1.
pub fn layout(labels: &[VisualLabel]) -> Vec<LabelBox> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let y = FIRST_Y + STEP_Y * i as u32;
            let text = format!("{}. {}", i + 1, label.label);
            let width = text.chars().count() as u32 * CHAR_WIDTH + 2 * TEXT_INSET;
            LabelBox {
                left: LEFT,
                top: y - PAD_ABOVE,
                right: LEFT + width,
                bottom: y + PAD_BELOW,
                text_x: LEFT + TEXT_INSET,
                text_y: y,
                colors: colors_for(label.severity),
                text,
            }
        })
        .collect()
}

/// Whether a result should be drawn onto the uploaded image at all.
pub fn should_annotate(has_image: bool, labels: &[VisualLabel]) -> bool {
    has_image && !labels.is_empty()
}

/// Paint the boxes (fill + outline) onto `image`, clipped to its bounds.
/// Text is not rasterised; use [`render_svg`] for labelled output.
pub fn draw_boxes(image: &mut RgbImage, boxes: &[LabelBox]) {
    let (width, height) = image.dimensions();
    for b in boxes {
        if b.left >= width || b.top >= height {
            continue;
        }
        let right = b.right.min(width - 1);
        let bottom = b.bottom.min(height - 1);
        for y in b.top..=bottom {
            for x in b.left..=right {
                let on_outline = x < b.left + OUTLINE_WIDTH
                    || x + OUTLINE_WIDTH > b.right
                    || y < b.top + OUTLINE_WIDTH
                    || y + OUTLINE_WIDTH > b.bottom;
                let color = if on_outline {
                    b.colors.outline
                } else {
                    b.colors.fill
                };
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// Render the image with labelled boxes as an SVG document. The screenshot
/// is embedded as a base64 PNG.
pub fn render_svg(image: &RgbImage, boxes: &[LabelBox]) -> Result<String, image::ImageError> {
    let png = encode_png(image)?;
    let data = base64::engine::general_purpose::STANDARD.encode(&png);
    let (width, height) = image.dimensions();

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <image width="{width}" height="{height}" href="data:image/png;base64,{data}"/>"#
    ));
    svg.push('\n');
    for b in boxes {
        svg.push_str(&format!(
            r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            b.left,
            b.top,
            b.right - b.left,
            b.bottom - b.top,
            css_rgb(b.colors.fill),
            css_rgb(b.colors.outline),
            OUTLINE_WIDTH
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r#"  <text x="{}" y="{}" dominant-baseline="hanging" font-family="monospace" font-size="14" fill="{}">{}</text>"#,
            b.text_x,
            b.text_y,
            css_rgb(TEXT_COLOR),
            escape_xml(&b.text)
        ));
        svg.push('\n');
    }
    svg.push_str("</svg>\n");
    Ok(svg)
}

fn css_rgb(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("rgb({},{},{})", r, g, b)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
