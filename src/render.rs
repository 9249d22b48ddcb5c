use std::path::{Path, PathBuf};

use anyhow::anyhow;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::{
    color::{Color, BLACK, HOSPITAL, HOUSE, WHITE},
    coordinate::Coordinate,
    cost::CostEvaluator,
    snapshot::Snapshot,
};

/// 3x5 bitmap digits, one row per byte, high bit on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Draws a snapshot as a grid image: black cells, houses, hospitals, the
/// path from each house to its nearest hospital, and the total cost in a footer.
#[derive(Clone, Debug)]
pub struct Renderer {
    cell_size: u32,
    cell_border: u32,
    footer: u32,
    padding: u32,
    line_width: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            cell_size: 100,
            cell_border: 2,
            footer: 40,
            padding: 10,
            line_width: 5,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size.max(10);
        self.line_width = (self.cell_size / 20).max(1);
        self
    }

    /// Image size in pixels, or `None` when the grid does not fit in `u32`.
    pub fn dimensions(&self, snapshot: &Snapshot<'_>) -> Option<(u32, u32)> {
        let width = u32::try_from(snapshot.width)
            .ok()?
            .checked_mul(self.cell_size)?;
        let height = u32::try_from(snapshot.height)
            .ok()?
            .checked_mul(self.cell_size)?
            .checked_add(self.footer)?
            .checked_add(self.padding.checked_mul(2)?)?;
        Some((width, height))
    }

    pub fn render(&self, snapshot: &Snapshot<'_>) -> anyhow::Result<RgbaImage> {
        let (width, height) = self.dimensions(snapshot).ok_or_else(|| {
            anyhow!(
                "{}x{} grid is too large to render at {}px per cell",
                snapshot.height,
                snapshot.width,
                self.cell_size
            )
        })?;
        let mut img = RgbaImage::from_pixel(width, height, WHITE.into());

        let cs = self.cell_size as i64;
        let border = self.cell_border as i64;
        for row in 0..snapshot.height as i64 {
            for col in 0..snapshot.width as i64 {
                fill_rect(
                    &mut img,
                    (col * cs + border, row * cs + border),
                    ((col + 1) * cs - border, (row + 1) * cs - border),
                    BLACK,
                );
            }
        }

        let assignments = CostEvaluator::new(snapshot.houses)
            .assignments(snapshot.hospitals)
            .unwrap_or_default();

        for (index, assignment) in assignments.iter().enumerate() {
            self.draw_path(&mut img, &assignment.house, &assignment.hospital, Color::path(index));
        }
        for house in snapshot.houses {
            self.draw_house(&mut img, house);
        }
        for hospital in snapshot.hospitals {
            self.draw_hospital(&mut img, hospital);
        }

        let scale = (cs / 30).max(1);
        for (index, assignment) in assignments.iter().enumerate() {
            let (x, y) = self.origin(&assignment.house);
            draw_number(
                &mut img,
                assignment.distance,
                (x + cs / 4, y + border * 2),
                scale,
                Color::path(index),
            );
        }

        let grid_bottom = snapshot.height as i64 * cs;
        fill_rect(
            &mut img,
            (0, grid_bottom),
            (width as i64, height as i64),
            BLACK,
        );
        draw_number(
            &mut img,
            snapshot.cost,
            (self.padding as i64, grid_bottom + self.padding as i64),
            (self.footer as i64 / 5).max(1),
            WHITE,
        );

        Ok(img)
    }

    /// Writes `<stem>.png` and a `<stem>.json` dump of the snapshot, where the
    /// stem is `prefix` plus the zero-padded iteration. Returns the image path.
    pub fn save(&self, snapshot: &Snapshot<'_>, prefix: &str) -> anyhow::Result<PathBuf> {
        let stem = snapshot.artifact_stem(prefix);
        let png = PathBuf::from(format!("{}.png", stem));
        let json = PathBuf::from(format!("{}.json", stem));

        if let Some(parent) = png.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        DynamicImage::from(self.render(snapshot)?).save_with_format(&png, ImageFormat::Png)?;
        std::fs::write(&json, snapshot.to_json()?)?;
        debug!(path = %png.display(), iteration = snapshot.iteration, "snapshot saved");

        Ok(png)
    }

    fn origin(&self, c: &Coordinate) -> (i64, i64) {
        let cs = self.cell_size as i64;
        (c.col as i64 * cs, c.row as i64 * cs)
    }

    fn center(&self, c: &Coordinate) -> (i64, i64) {
        let (x, y) = self.origin(c);
        let half = self.cell_size as i64 / 2;
        (x + half, y + half)
    }

    /// Horizontal leg along the house row, then vertical leg down the hospital column.
    fn draw_path(&self, img: &mut RgbaImage, house: &Coordinate, hospital: &Coordinate, color: Color) {
        let (hx, hy) = self.center(house);
        let (px, py) = self.center(hospital);
        let half = self.line_width as i64 / 2;
        let thick = self.line_width as i64;

        fill_rect(
            img,
            (hx.min(px) - half, hy - half),
            (hx.max(px) - half + thick, hy - half + thick),
            color,
        );
        fill_rect(
            img,
            (px - half, hy.min(py) - half),
            (px - half + thick, hy.max(py) - half + thick),
            color,
        );
    }

    fn draw_house(&self, img: &mut RgbaImage, house: &Coordinate) {
        let (x, y) = self.origin(house);
        let cs = self.cell_size as i64;
        let inset = cs / 4;
        // roof band over the walls
        fill_rect(img, (x + inset, y + inset), (x + cs - inset, y + cs - inset), HOUSE);
        fill_rect(
            img,
            (x + inset, y + inset),
            (x + cs - inset, y + inset + cs / 10),
            Color::new(139, 69, 19),
        );
    }

    fn draw_hospital(&self, img: &mut RgbaImage, hospital: &Coordinate) {
        let (x, y) = self.origin(hospital);
        let (cx, cy) = self.center(hospital);
        let cs = self.cell_size as i64;
        let inset = cs / 4;
        let arm = (cs / 16).max(1);
        fill_rect(img, (x + inset, y + inset), (x + cs - inset, y + cs - inset), HOSPITAL);
        fill_rect(img, (cx - arm, y + inset + arm), (cx + arm, y + cs - inset - arm), WHITE);
        fill_rect(img, (x + inset + arm, cy - arm), (x + cs - inset - arm, cy + arm), WHITE);
    }
}

/// Fills the half-open rectangle `[min, max)`, clipped to the image.
fn fill_rect(img: &mut RgbaImage, min: (i64, i64), max: (i64, i64), color: Color) {
    let x0 = min.0.clamp(0, img.width() as i64) as u32;
    let y0 = min.1.clamp(0, img.height() as i64) as u32;
    let x1 = max.0.clamp(0, img.width() as i64) as u32;
    let y1 = max.1.clamp(0, img.height() as i64) as u32;
    let rgba = color.into();
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x, y, rgba);
        }
    }
}

fn draw_number(img: &mut RgbaImage, value: u64, origin: (i64, i64), scale: i64, color: Color) {
    let (mut x, y) = origin;
    for digit in value.to_string().bytes().map(|b| (b - b'0') as usize) {
        for (dy, bits) in DIGITS[digit].iter().enumerate() {
            for dx in 0..3 {
                if bits & (0b100 >> dx) != 0 {
                    let px = x + dx * scale;
                    let py = y + dy as i64 * scale;
                    fill_rect(img, (px, py), (px + scale, py + scale), color);
                }
            }
        }
        x += 4 * scale;
    }
}

/// Convenience for callers that only know a directory and a file prefix.
pub fn artifact_prefix(dir: &Path, prefix: &str) -> String {
    dir.join(prefix).to_string_lossy().into_owned()
}
