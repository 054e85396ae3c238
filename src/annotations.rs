//! Ground-truth annotation parsing.
//!
//! Each line of an annotation file reads `label:xmin;xmax;ymin;ymax`. Only
//! lines labelled exactly `boat` become ground truth; `hiddenboat` and any
//! other label are ignored.

use std::path::Path;

use log::warn;

use crate::error::{DetectorError, Result};
use crate::models::Rectangle;

pub const BOAT_LABEL: &str = "boat";

/// Parse an annotation file body into ground-truth rectangles, in file order.
/// Malformed `boat` lines are logged and skipped.
pub fn parse_ground_truth(text: &str) -> Vec<Rectangle> {
    let mut ground_truth = Vec::new();

    for (i, line) in text.lines().enumerate() {
        match parse_line(i + 1, line) {
            Ok(Some(rect)) => ground_truth.push(rect),
            Ok(None) => {}
            Err(e) => warn!("{}", e),
        }
    }

    ground_truth
}

/// Parse a single annotation line. `Ok(None)` for lines that are not boats.
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<Rectangle>> {
    let line = line.trim_end_matches('\r');
    let Some((label, corners)) = line.split_once(':') else {
        return Ok(None);
    };

    if label != BOAT_LABEL {
        return Ok(None);
    }

    let malformed = || DetectorError::MalformedAnnotationLine {
        line_number,
        line: line.to_string(),
    };

    let mut values = Vec::with_capacity(4);
    let mut tokens = corners.split(';').map(str::trim).peekable();
    while let Some(token) = tokens.next() {
        // A trailing separator leaves one empty token at the end
        if token.is_empty() && tokens.peek().is_none() && values.len() == 4 {
            break;
        }
        values.push(token.parse::<i32>().map_err(|_| malformed())?);
    }

    let &[xmin, xmax, ymin, ymax] = values.as_slice() else {
        return Err(malformed());
    };

    Rectangle::from_corners(xmin, xmax, ymin, ymax)
        .map(Some)
        .ok_or_else(malformed)
}

/// Read and parse an annotation file.
pub fn load_ground_truth(path: &Path) -> Result<Vec<Rectangle>> {
    let text = std::fs::read_to_string(path).map_err(|e| DetectorError::file_access(path, e))?;
    Ok(parse_ground_truth(&text))
}
