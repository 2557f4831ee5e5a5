use lopdf::Object;
use serde::Serialize;

use crate::cuts::{derive_cuts, Axis, SplitConfig};
use crate::error::Result;

/// A page-space rectangle, `[left bottom right top]` in PDF order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl Rect {
    pub fn new(left: f32, bottom: f32, right: f32, top: f32) -> Self {
        Rect {
            left,
            bottom,
            right,
            top,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Read a 4-number array. Corners may be given in any order.
    pub fn from_numbers(values: &[f32]) -> Option<Self> {
        match values {
            &[x0, y0, x1, y1] => Some(Rect::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))),
            _ => None,
        }
    }

    pub fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.left),
            Object::Real(self.bottom),
            Object::Real(self.right),
            Object::Real(self.top),
        ])
    }
}

/// Crop rectangles for one page, in output order.
///
/// Vertical splits run left to right; horizontal splits run top to bottom,
/// so percentages always count from the edge the preview starts at.
///
/// Horizontal parts come out top to bottom. The earlier form-based splitter
/// measured horizontal cuts up from the bottom edge when cropping and so
/// emitted the bottom strip first; its outputs list horizontal parts in the
/// reverse order of ours.
pub fn crop_rects(page: Rect, config: &SplitConfig) -> Result<Vec<Rect>> {
    let cuts = config.cuts();
    let rects = match config.axis() {
        Axis::Vertical => {
            let xs = derive_cuts(cuts, page.width())?;
            xs.windows(2)
                .map(|pair| {
                    Rect::new(
                        page.left + pair[0],
                        page.bottom,
                        page.left + pair[1],
                        page.top,
                    )
                })
                .collect()
        }
        Axis::Horizontal => {
            let ys = derive_cuts(cuts, page.height())?;
            ys.windows(2)
                .map(|pair| {
                    Rect::new(
                        page.left,
                        page.top - pair[1],
                        page.right,
                        page.top - pair[0],
                    )
                })
                .collect()
        }
    };
    Ok(rects)
}
