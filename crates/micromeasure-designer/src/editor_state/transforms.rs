//! Origin, image rotation, scale-bar detection and intensity profiles.

use image::RgbImage;

use micromeasure_core::{LengthUnit, Point};

use super::EditorState;
use crate::commands::*;
use crate::coordinates::{apply_rotation, normalize_degrees, rotate_image, RotationDirection};
use crate::model::{MeasurementShape, ShapeParams};
use crate::profile::{IntensityImage, IntensityProfile, Interpolation, ProfileOptions};
use crate::scale_bar::{self, ScaleBarDetection, ScaleBarParams};

/// Everything an image rotation changes, except the image itself which is
/// derived from the source image and the rotation angle.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationSnapshot {
    pub shapes: Vec<(u64, ShapeParams)>,
    pub origin: Point,
    pub scale_bar: Option<ScaleBarDetection>,
    pub rotation_degrees: i32,
}

impl EditorState {
    /// Moves the coordinate origin with undo.
    pub fn set_origin(&mut self, origin: Point) {
        if origin == self.origin {
            return;
        }
        tracing::info!("Origin set to ({:.2}, {:.2})", origin.x, origin.y);
        self.push_command(DesignerCommand::SetOrigin(SetOrigin {
            before: self.origin,
            after: origin,
        }));
    }

    /// Turns the image, every shape and the origin by a quarter turn, with
    /// undo. Returns false when no image is loaded.
    pub fn rotate_image(&mut self, direction: RotationDirection) -> bool {
        if self.image.is_none() {
            tracing::warn!("Rotate image ignored: no image loaded");
            return false;
        }
        self.push_command(DesignerCommand::RotateImage90(RotateImage90::new(direction)));
        tracing::info!("Image rotated to {}°", self.rotation_degrees);
        true
    }

    pub(crate) fn capture_rotation(&self) -> RotationSnapshot {
        RotationSnapshot {
            shapes: self.shapes.iter().map(|o| (o.id, o.shape.save())).collect(),
            origin: self.origin,
            scale_bar: self.scale_bar.clone(),
            rotation_degrees: self.rotation_degrees,
        }
    }

    pub(crate) fn restore_rotation(&mut self, snapshot: &RotationSnapshot) {
        for (id, params) in &snapshot.shapes {
            self.restore_shape_params(*id, params);
        }
        self.origin = snapshot.origin;
        self.scale_bar = snapshot.scale_bar.clone();
        self.rotation_degrees = snapshot.rotation_degrees;
        self.image = self
            .source_image
            .as_ref()
            .map(|source| apply_rotation(source, self.rotation_degrees));
    }

    pub(crate) fn perform_rotation(&mut self, direction: RotationDirection) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let size = image.dimensions();
        let rotated = rotate_image(image, direction);
        let new_size = rotated.dimensions();
        let map = move |p: Point| direction.map_point(p, size);

        for obj in self.shapes.iter_mut() {
            obj.shape.transform(&map, direction.angle_delta());
        }
        self.origin = map(self.origin);
        if let Some(detection) = self.scale_bar.as_mut() {
            detection.params = detection.params.mapped(size, new_size, map);
        }
        self.rotation_degrees = normalize_degrees(self.rotation_degrees + direction.degrees());
        self.image = Some(rotated);
    }

    /// Runs scale-bar detection on the displayed image and stores the pixel
    /// length in the calibration, with undo. Returns the detected length, or
    /// `None` without touching the state when there is no image or the seed
    /// lies outside it.
    pub fn find_scale_bar(&mut self, params: ScaleBarParams) -> Option<u32> {
        let image = self.image.as_ref()?;
        let detection = scale_bar::detect(image, &params);
        let pixels = detection.pixels;
        if pixels == 0 {
            tracing::warn!("Scale bar detection at {:?} found nothing", params.seed);
            return None;
        }

        let mut calibration = self.calibration.clone();
        calibration.pixels = Some(pixels as f64);
        tracing::info!("Scale bar detected: {} px", pixels);
        self.push_command(DesignerCommand::FindScaleBarWidth(FindScaleBarWidth {
            before: (self.scale_bar.clone(), self.calibration.clone()),
            after: (Some(detection), calibration),
        }));
        Some(pixels)
    }

    /// Scale-bar detection with the configured threshold and direction.
    pub fn find_scale_bar_at(&mut self, seed: Point) -> Option<u32> {
        let params = ScaleBarParams::absolute(
            seed,
            self.settings.scale_bar.default_threshold,
            self.settings.scale_bar.default_direction,
        );
        self.find_scale_bar(params)
    }

    /// Removes the detection overlay with undo. The calibration is kept.
    pub fn clear_scale_bar(&mut self) {
        if self.scale_bar.is_none() {
            return;
        }
        self.push_command(DesignerCommand::FindScaleBarWidth(FindScaleBarWidth {
            before: (self.scale_bar.clone(), self.calibration.clone()),
            after: (None, self.calibration.clone()),
        }));
    }

    /// Displayed image with the detected scale bar filled in.
    pub fn scale_bar_overlay(&self) -> Option<RgbImage> {
        let image = self.image.as_ref()?;
        let detection = self.scale_bar.as_ref()?;
        Some(scale_bar::fill(image, &detection.params))
    }

    /// Sets the physical side of the calibration.
    pub fn set_scale(&mut self, length: f64, unit: LengthUnit) {
        self.calibration.length = Some(length);
        self.calibration.unit = Some(unit);
        self.is_modified = true;
    }

    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            interpolation: Interpolation::from_order(self.settings.profile.interpolation_order),
            samples_per_pixel: self.settings.profile.samples_per_pixel,
            origin: self.origin,
        }
    }

    /// Intensity profile along a shape, with origin-relative coordinates.
    pub fn intensity_profile(&self, id: u64) -> Option<IntensityProfile> {
        let image = self.image.as_ref()?;
        let obj = self.shapes.get(id)?;
        let intensity = IntensityImage::from_rgb(image);
        Some(obj.shape.intensity_profile(&intensity, &self.profile_options()))
    }
}
