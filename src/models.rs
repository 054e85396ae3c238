use image::{DynamicImage, GrayImage};
use std::path::{Path, PathBuf};

/// Axis-aligned integer rectangle in pixel coordinates.
///
/// `width` and `height` are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0, "negative rectangle extent");
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    /// Build from the `xmin;xmax;ymin;ymax` corner order used by annotations.
    /// Returns `None` when a maximum lies before its minimum or an extent
    /// does not fit in `i32`.
    pub fn from_corners(xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> Option<Self> {
        if xmax < xmin || ymax < ymin {
            return None;
        }
        let width = xmax.checked_sub(xmin)?;
        let height = ymax.checked_sub(ymin)?;
        Some(Self::new(xmin, ymin, width, height))
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Exclusive right edge. Widened so edges near `i32::MAX` cannot overflow.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// y-coordinate of the bottom-right corner.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Overlapping region, or `None` if the rectangles share no pixels.
    pub fn intersection(&self, other: &Rectangle) -> Option<Rectangle> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        let (width, height) = (x1 - x0 as i64, y1 - y0 as i64);
        if width <= 0 || height <= 0 {
            return None;
        }
        // Never wider than either input, so the extents fit back into i32
        Some(Rectangle::new(x0, y0, width as i32, height as i32))
    }

    /// Clamp to an image of the given size. `None` if nothing remains.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let frame = Rectangle::new(0, 0, width as i32, height as i32);
        self.intersection(&frame)
            .map(|r| (r.x as u32, r.y as u32, r.width as u32, r.height as u32))
    }
}

/// Extent of one connected edge component.
#[derive(Debug, Clone)]
pub struct Contour {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Contour {
    /// Empty component anchored at its first pixel; `absorb` counts that pixel.
    pub fn seed(label: u32, x: u32, y: u32) -> Self {
        Self {
            label,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            pixel_count: 0,
        }
    }

    pub fn absorb(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.pixel_count += 1;
    }

    /// Inclusive pixel extent as a rectangle.
    pub fn bounding_rect(&self) -> Rectangle {
        Rectangle::new(
            self.min_x as i32,
            self.min_y as i32,
            (self.max_x - self.min_x + 1) as i32,
            (self.max_y - self.min_y + 1) as i32,
        )
    }
}

/// Image crop named by a rectangle, tagged with that rectangle's index.
#[derive(Debug, Clone)]
pub struct Patch {
    pub source_index: usize,
    pub image: DynamicImage,
}

impl Patch {
    pub fn gray(&self) -> GrayImage {
        self.image.to_luma8()
    }
}

/// Classifier answer for a single patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Boat,
    NotBoat,
}

/// A file or image left out of a run, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItem {
    pub path: PathBuf,
    pub reason: String,
}

impl SkippedItem {
    pub fn new(path: &Path, reason: &impl std::fmt::Display) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
