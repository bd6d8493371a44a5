//! The crop session model: owned state, snapshot/validate/revert lifecycle.
//!
//! The session is a two-state machine, Idle and Dragging. Every interactive
//! mutation - a drag step, a perspective change, a programmatic crop - runs
//! through validation before it becomes observable, and a candidate that
//! fails leaves the crop exactly as it was. The model works entirely in
//! *logical* space (the orientation the user sees); the rotation-invariant
//! texture encoding exists only at the persistence boundary and is converted
//! explicitly on the way in and out. Validating a rect in one space against
//! a quad computed in another produces plausible-looking garbage, so there
//! is deliberately no second quad to reach for.

use crate::error::GeometryError;
use crate::geometry::{
    logical_to_texture, texture_to_logical, CropRect, CropSnapshot, MIN_CROP_SIZE,
};
use crate::projection::{PerspectiveMatrix, ProjectedQuad};
use crate::session::gesture::GestureStrategy;
use crate::solver::uv_bounds::DEFAULT_MARGIN_PX;
use crate::solver::{constrain_rect_to_bounds, validate_corners, SafetyPadding};
use crate::PerspectiveParameters;
use serde::{Deserialize, Serialize};

/// The flat scalar map committed at gesture end.
///
/// This is the engine's only contract with the persistence layer: crop
/// coordinates in texture space (rotation-invariant) plus the perspective
/// parameters needed to rebuild the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionParameters {
    pub crop_center_x: f64,
    pub crop_center_y: f64,
    pub crop_width: f64,
    pub crop_height: f64,
    pub perspective_vertical: f64,
    pub perspective_horizontal: f64,
    pub straighten_degrees: f64,
    pub rotate_steps: u8,
    pub flip_horizontal: bool,
}

/// A gesture in flight.
#[derive(Debug, Clone, Copy)]
struct ActiveGesture {
    strategy: GestureStrategy,
    /// Center/size view of the crop at gesture start; strategies derive
    /// their candidates from this.
    snapshot: CropSnapshot,
    /// The exact pre-gesture rect, restored verbatim on a failed
    /// validation.
    origin: CropRect,
    total_dx: f64,
    total_dy: f64,
}

/// Interactive crop-box session over one image.
///
/// Owns the perspective parameters, the derived sampling matrix, the valid
/// region quad, and the live crop rect. The matrix and quad are derived
/// state: they are rebuilt whenever the parameters change and never mutated
/// independently.
#[derive(Debug, Clone)]
pub struct CropSession {
    params: PerspectiveParameters,
    texture_width: u32,
    texture_height: u32,
    /// Sampling matrix: logical centered point -> texture UV.
    matrix: PerspectiveMatrix,
    /// Valid region in logical space: the padded UV square pulled back
    /// through the inverse matrix.
    valid_quad: ProjectedQuad,
    /// Texel safety margin, expressed in the matrix's UV axes.
    padding: SafetyPadding,
    /// Live crop, logical space.
    crop: CropRect,
    /// Remembered ideal rect used to re-derive the crop when perspective
    /// parameters change.
    baseline: CropSnapshot,
    gesture: Option<ActiveGesture>,
}

impl CropSession {
    /// Create a session for an image with no corrections applied.
    ///
    /// The initial crop is the largest frame-centered rect that samples
    /// safely, which for an identity transform is the full frame inset by
    /// the texel margin.
    pub fn new(texture_width: u32, texture_height: u32) -> Result<Self, GeometryError> {
        let params = PerspectiveParameters {
            image_aspect_ratio: logical_aspect(texture_width, texture_height, 0),
            ..PerspectiveParameters::default()
        };
        Self::with_parameters(params, texture_width, texture_height)
    }

    /// Create a session with an explicit parameter set.
    pub fn with_parameters(
        params: PerspectiveParameters,
        texture_width: u32,
        texture_height: u32,
    ) -> Result<Self, GeometryError> {
        let mut session = Self {
            params: params.clamped(),
            texture_width,
            texture_height,
            matrix: PerspectiveMatrix::IDENTITY,
            valid_quad: ProjectedQuad::project_frame(&PerspectiveMatrix::IDENTITY)?,
            padding: SafetyPadding::none(),
            crop: CropRect::full(),
            baseline: CropSnapshot::of(&CropRect::full()),
            gesture: None,
        };
        session.rebuild_projection()?;
        session.apply_baseline_perspective_fit();
        session.baseline = CropSnapshot::of(&session.crop);
        Ok(session)
    }

    /// Rebuild a session from previously committed parameters.
    pub fn from_parameters(
        saved: &SessionParameters,
        texture_width: u32,
        texture_height: u32,
    ) -> Result<Self, GeometryError> {
        let steps = saved.rotate_steps % 4;
        let params = PerspectiveParameters {
            vertical: saved.perspective_vertical,
            horizontal: saved.perspective_horizontal,
            straighten_degrees: saved.straighten_degrees,
            rotate_steps: steps,
            flip_horizontal: saved.flip_horizontal,
            image_aspect_ratio: logical_aspect(texture_width, texture_height, steps),
        };
        let mut session = Self::with_parameters(params, texture_width, texture_height)?;

        let texture_rect = CropRect::from_center(
            saved.crop_center_x,
            saved.crop_center_y,
            saved.crop_width,
            saved.crop_height,
        );
        session.set_crop(texture_to_logical(&texture_rect, steps));
        session.baseline = CropSnapshot::of(&session.crop);
        Ok(session)
    }

    /// Current crop in logical space.
    pub fn crop_rect(&self) -> CropRect {
        self.crop
    }

    /// Current crop in texture space (the persisted encoding).
    pub fn texture_crop_rect(&self) -> CropRect {
        logical_to_texture(&self.crop, self.params.rotate_steps)
    }

    /// The valid region in logical space. A crop rect is safe exactly when
    /// it lies inside this quad.
    pub fn valid_quad(&self) -> &ProjectedQuad {
        &self.valid_quad
    }

    /// The texture UV quad the current crop samples - the region the
    /// renderer actually reads for this crop.
    pub fn crop_uv_quad(&self) -> Result<ProjectedQuad, GeometryError> {
        ProjectedQuad::project(&self.matrix, &self.crop)
    }

    /// Whether the current crop samples safely inside the texture.
    pub fn is_valid(&self) -> bool {
        validate_corners(&self.crop, &self.matrix, &self.padding)
    }

    /// Current perspective parameters.
    pub fn parameters(&self) -> &PerspectiveParameters {
        &self.params
    }

    /// True while a gesture is in flight.
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Texture pixel dimensions this session was created for.
    pub fn texture_size(&self) -> (u32, u32) {
        (self.texture_width, self.texture_height)
    }

    /// Logical aspect ratio the given rotation step would produce for this
    /// session's texture.
    pub fn logical_aspect_for_steps(&self, rotate_steps: u8) -> f64 {
        logical_aspect(self.texture_width, self.texture_height, rotate_steps)
    }

    /// Enter the Dragging state, capturing the pre-gesture snapshot.
    ///
    /// A gesture already in flight is replaced; its uncommitted state stays
    /// on the crop, exactly as a pointer-grab handoff would leave it.
    pub fn begin_gesture(&mut self, strategy: GestureStrategy) {
        self.gesture = Some(ActiveGesture {
            strategy,
            snapshot: CropSnapshot::of(&self.crop),
            origin: self.crop,
            total_dx: 0.0,
            total_dy: 0.0,
        });
    }

    /// Feed one pointer delta (normalized logical units) into the active
    /// gesture.
    ///
    /// Returns true when the resulting candidate was accepted, possibly
    /// after shrinking. Returns false - leaving the crop identical to the
    /// pre-gesture state - when the candidate failed validation, or when no
    /// gesture is active. Deltas accumulate from gesture start, so call this
    /// in pointer-event order.
    pub fn drag_by(&mut self, dx: f64, dy: f64) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        gesture.total_dx += dx;
        gesture.total_dy += dy;

        let g = *gesture;
        let candidate = g.strategy.candidate(&g.snapshot, g.total_dx, g.total_dy);
        self.ensure_valid_or_revert(g.origin, candidate, g.strategy.allows_shrink())
    }

    /// Leave the Dragging state, committing whatever the last accepted
    /// candidate was, and return the committed parameter map.
    ///
    /// The committed crop becomes the new baseline for future perspective
    /// fits.
    pub fn end_gesture(&mut self) -> SessionParameters {
        self.gesture = None;
        self.baseline = CropSnapshot::of(&self.crop);
        self.committed_parameters()
    }

    /// Replace the crop programmatically (restoring a saved edit, applying a
    /// preset). The rect is validated like any gesture candidate, with
    /// shrinking allowed; returns false if even the shrunk rect is unusable.
    pub fn set_crop(&mut self, rect: CropRect) -> bool {
        let revert = self.crop;
        self.ensure_valid_or_revert(revert, rect.clamped(MIN_CROP_SIZE), true)
    }

    /// Apply a new perspective parameter set.
    ///
    /// When the rotation step changes, the crop and baseline are re-encoded
    /// through texture space so the persisted crop stays rotation-invariant.
    /// The matrix and valid quad are rebuilt in logical space - the space
    /// the live crop occupies - and if the crop no longer fits, it is
    /// re-derived from the baseline.
    pub fn update_perspective(
        &mut self,
        params: PerspectiveParameters,
    ) -> Result<(), GeometryError> {
        let old_steps = self.params.rotate_steps % 4;
        let new_steps = params.rotate_steps % 4;
        if old_steps != new_steps {
            let texture_rect = logical_to_texture(&self.crop, old_steps);
            self.crop = texture_to_logical(&texture_rect, new_steps);
            let baseline_texture = logical_to_texture(&self.baseline.to_rect(), old_steps);
            self.baseline = CropSnapshot::of(&texture_to_logical(&baseline_texture, new_steps));
        }

        self.params = params.clamped();
        self.rebuild_projection()?;

        if !self.valid_quad.contains_rect(&self.crop) {
            self.apply_baseline_perspective_fit();
        }
        Ok(())
    }

    /// Rotate the display a quarter turn clockwise, keeping the persisted
    /// crop invariant.
    pub fn rotate_clockwise(&mut self) -> Result<(), GeometryError> {
        let mut params = self.params;
        params.rotate_steps = (params.rotate_steps + 1) % 4;
        params.image_aspect_ratio =
            logical_aspect(self.texture_width, self.texture_height, params.rotate_steps);
        self.update_perspective(params)
    }

    /// Snapshot the committed state as the flat persistence map.
    pub fn committed_parameters(&self) -> SessionParameters {
        let texture_rect = self.texture_crop_rect();
        let center = texture_rect.center();
        SessionParameters {
            crop_center_x: center.x,
            crop_center_y: center.y,
            crop_width: texture_rect.width(),
            crop_height: texture_rect.height(),
            perspective_vertical: self.params.vertical,
            perspective_horizontal: self.params.horizontal,
            straighten_degrees: self.params.straighten_degrees,
            rotate_steps: self.params.rotate_steps,
            flip_horizontal: self.params.flip_horizontal,
        }
    }

    /// Accept `candidate` if it sits inside the valid region; otherwise
    /// shrink it if the caller allows; otherwise restore `revert_to`
    /// verbatim and report failure.
    ///
    /// On failure the crop is bit-identical to `revert_to` - there is no
    /// partial mutation to observe.
    fn ensure_valid_or_revert(
        &mut self,
        revert_to: CropRect,
        candidate: CropRect,
        allow_shrink: bool,
    ) -> bool {
        if self.valid_quad.contains_rect(&candidate) {
            self.crop = candidate;
            return true;
        }

        if allow_shrink {
            if let Some(shrunk) = constrain_rect_to_bounds(&candidate, &self.matrix, &self.padding)
            {
                if shrunk.width() >= MIN_CROP_SIZE && shrunk.height() >= MIN_CROP_SIZE {
                    self.crop = shrunk;
                    return true;
                }
            }
        }

        self.crop = revert_to;
        false
    }

    /// Re-derive the crop from the remembered baseline after a perspective
    /// change: re-center on the quad centroid if the baseline center fell
    /// outside the valid region, then shrink to fit, clamped to the minimum
    /// crop size.
    ///
    /// Under extreme two-axis keystone the quad stretches far past the
    /// canvas and its centroid with it, so the re-centering target is
    /// clamped back onto the frame before solving.
    fn apply_baseline_perspective_fit(&mut self) {
        let mut target = self.baseline.to_rect();
        if !self.valid_quad.contains_point(target.center()) {
            let centroid = self.valid_quad.centroid();
            target = CropRect::from_center(
                centroid.x.clamp(0.0, 1.0),
                centroid.y.clamp(0.0, 1.0),
                target.width(),
                target.height(),
            );
        }
        target = target.shifted_into_frame();

        let fitted = constrain_rect_to_bounds(&target, &self.matrix, &self.padding)
            .map(|rect| rect.clamped(MIN_CROP_SIZE))
            .filter(|rect| validate_corners(rect, &self.matrix, &self.padding));

        self.crop = match fitted {
            Some(rect) => rect,
            None => {
                // Not even the target center samples safely; fall back to
                // the smallest legal rect near the centroid. The validity
                // flag reports the result honestly.
                let centroid = self.valid_quad.centroid();
                CropRect::from_center(
                    centroid.x.clamp(0.0, 1.0),
                    centroid.y.clamp(0.0, 1.0),
                    MIN_CROP_SIZE,
                    MIN_CROP_SIZE,
                )
                .clamped(MIN_CROP_SIZE)
            }
        };
    }

    /// Rebuild the matrix, padding, and valid quad from the current
    /// parameters.
    fn rebuild_projection(&mut self) -> Result<(), GeometryError> {
        self.matrix = PerspectiveMatrix::from_parameters(&self.params);

        let base = SafetyPadding::for_texture(
            self.texture_width,
            self.texture_height,
            DEFAULT_MARGIN_PX,
        );
        // The matrix's UV axes follow the logical frame; odd quarter turns
        // run the logical u axis along texture rows, swapping the margins.
        self.padding = if self.params.rotate_steps % 2 == 1 {
            base.swapped()
        } else {
            base
        };

        let safe_uv = CropRect::new(
            self.padding.u,
            self.padding.v,
            1.0 - self.padding.u,
            1.0 - self.padding.v,
        );
        self.valid_quad = ProjectedQuad::project(&self.matrix.invert()?, &safe_uv)?;
        Ok(())
    }
}

/// Logical (post-rotation) aspect ratio of a texture.
fn logical_aspect(texture_width: u32, texture_height: u32, rotate_steps: u8) -> f64 {
    let w = f64::from(texture_width.max(1));
    let h = f64::from(texture_height.max(1));
    if rotate_steps % 2 == 1 {
        h / w
    } else {
        w / h
    }
}
