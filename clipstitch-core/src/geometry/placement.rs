use kurbo::{Affine, Size, Vec2};

use crate::foundation::core::Canvas;
use crate::foundation::error::{StitchError, StitchResult};

/// Fit-inside placement of one clip on the shared canvas: a uniform scale,
/// a centering translate, and the clip's base rotation transform.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Uniform scale factor. May be above or below 1.
    pub scale: f64,
    /// Centering offset in canvas pixels.
    pub translate: Vec2,
    /// The clip's base transform (rotation metadata).
    pub base: Affine,
}

impl Placement {
    /// The affine applied to each source frame: base transform first, then
    /// the uniform fit scale, then the centering translate.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translate) * Affine::scale(self.scale) * self.base
    }

    /// True when the placement leaves frames untouched.
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.translate == Vec2::ZERO && self.base == Affine::IDENTITY
    }

    /// The display size after the fit scale.
    pub fn scaled_size(&self, display: Size) -> Size {
        Size::new(display.width * self.scale, display.height * self.scale)
    }
}

/// Plan the placement of one clip's display bounds on the canvas.
///
/// `scale = min(canvas.w / display.w, canvas.h / display.h)`: the largest
/// uniform scale at which the whole frame still fits. When the display size
/// equals the canvas both ratios divide out to exactly 1.0 and the translate
/// is exactly zero, so a solo clip re-encodes unmoved.
pub fn plan_placement(
    clip_index: usize,
    display: Size,
    canvas: Canvas,
    base: Affine,
) -> StitchResult<Placement> {
    if display.width <= 0.0 || display.height <= 0.0 {
        return Err(StitchError::DegenerateClipGeometry { clip_index });
    }
    let target = canvas.size();
    if target.width <= 0.0 || target.height <= 0.0 {
        return Err(StitchError::no_playable("placement canvas has zero area"));
    }

    let scale = (target.width / display.width).min(target.height / display.height);
    let translate = Vec2::new(
        (target.width - display.width * scale) / 2.0,
        (target.height - display.height * scale) / 2.0,
    );
    Ok(Placement {
        scale,
        translate,
        base,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/placement.rs"]
mod tests;
