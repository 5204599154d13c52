use std::borrow::Cow;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Rgb, Rgba};
use rust_openxr_bridge_api::{FlipAxis, FrameBuffer, FrameSubmitter, FrameTransformations, PixelFormat,
                             ViewConfigurationView, XrError, XrResult};

/// Applies the configured flip and fit to frames before they are submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTransformer {
    transformations: FrameTransformations,
}

impl FrameTransformer {
    pub fn new(transformations: FrameTransformations) -> FrameTransformer {
        FrameTransformer { transformations }
    }

    pub fn transformations(&self) -> FrameTransformations {
        self.transformations
    }

    pub fn set_transformations(&mut self, transformations: FrameTransformations) {
        self.transformations = transformations;
    }

    /// Returns the frame itself when nothing is configured, otherwise a new
    /// buffer the caller owns.
    pub fn transform<'a>(&self, frame: &'a FrameBuffer, view: &ViewConfigurationView) -> XrResult<Cow<'a, FrameBuffer>> {
        if self.transformations.is_identity() {
            return Ok(Cow::Borrowed(frame));
        }
        let target = view.recommended_size();
        let data = match frame.format {
            PixelFormat::Rgb => self.apply(to_image::<Rgb<u8>>(frame)?, target)?.into_raw(),
            PixelFormat::Rgba => self.apply(to_image::<Rgba<u8>>(frame)?, target)?.into_raw(),
        };
        let (width, height) = if self.transformations.fit {
            target
        } else {
            (frame.width, frame.height)
        };
        FrameBuffer::new(width, height, frame.format, data).map(Cow::Owned)
    }

    fn apply<P>(&self, mut image: ImageBuffer<P, Vec<u8>>, target: (u32, u32)) -> XrResult<ImageBuffer<P, Vec<u8>>>
        where P: Pixel<Subpixel = u8> + 'static
    {
        match self.transformations.flip {
            Some(FlipAxis::Vertical) => imageops::flip_vertical_in_place(&mut image),
            Some(FlipAxis::Horizontal) => imageops::flip_horizontal_in_place(&mut image),
            Some(FlipAxis::Both) => {
                imageops::flip_vertical_in_place(&mut image);
                imageops::flip_horizontal_in_place(&mut image);
            }
            None => {}
        }
        if self.transformations.fit {
            image = fit(&image, target)?;
        }
        Ok(image)
    }
}

/// Frame submission handed to render handlers: each eye is transformed
/// against its own view configuration before it reaches the runtime.
pub struct FrameSink<'a> {
    transformer: &'a FrameTransformer,
    submitter: &'a mut dyn FrameSubmitter,
}

impl<'a> FrameSink<'a> {
    pub fn new(transformer: &'a FrameTransformer, submitter: &'a mut dyn FrameSubmitter) -> FrameSink<'a> {
        FrameSink { transformer, submitter }
    }

    /// Submits the images of the current frame. `right` is absent for a single view.
    pub fn set_frames(&mut self,
                      config_views: &[ViewConfigurationView],
                      left: &FrameBuffer,
                      right: Option<&FrameBuffer>) -> XrResult<()> {
        let rgba = left.is_rgba();
        let left_view = config_views.first()
            .ok_or_else(|| XrError::Frame("no view configuration for the left eye".into()))?;
        let left = self.transformer.transform(left, left_view)?;
        match right {
            Some(right) => {
                let right_view = config_views.get(1)
                    .ok_or_else(|| XrError::Frame("no view configuration for the right eye".into()))?;
                let right = self.transformer.transform(right, right_view)?;
                self.submitter.submit(&left, Some(&*right), rgba)
            }
            None => self.submitter.submit(&left, None, rgba),
        }
    }
}

// Crops symmetrically to the target aspect ratio, then scales to the target size.
fn fit<P>(image: &ImageBuffer<P, Vec<u8>>, target: (u32, u32)) -> XrResult<ImageBuffer<P, Vec<u8>>>
    where P: Pixel<Subpixel = u8> + 'static
{
    let (width, height) = image.dimensions();
    let (target_width, target_height) = target;
    if target_width == 0 || target_height == 0 {
        return Err(XrError::Frame(format!("invalid recommended size {}x{}", target_width, target_height)));
    }

    let current_ratio = width as f64 / height as f64;
    let recommended_ratio = target_width as f64 / target_height as f64;

    let (x, y, crop_width, crop_height) = if current_ratio > recommended_ratio {
        let margin = ((recommended_ratio * height as f64 - width as f64).abs() / 2.0) as u32;
        (margin, 0, width.saturating_sub(2 * margin), height)
    } else {
        let margin = ((width as f64 / recommended_ratio - height as f64).abs() / 2.0) as u32;
        (0, margin, width, height.saturating_sub(2 * margin))
    };
    if crop_width == 0 || crop_height == 0 {
        return Err(XrError::Frame(format!("{}x{} frame cannot be fitted to {}x{}",
                                          width, height, target_width, target_height)));
    }

    if x == 0 && y == 0 {
        return Ok(imageops::resize(image, target_width, target_height, FilterType::Triangle));
    }
    let cropped = imageops::crop_imm(image, x, y, crop_width, crop_height).to_image();
    Ok(imageops::resize(&cropped, target_width, target_height, FilterType::Triangle))
}

fn to_image<P>(frame: &FrameBuffer) -> XrResult<ImageBuffer<P, Vec<u8>>>
    where P: Pixel<Subpixel = u8>
{
    if frame.is_empty() {
        return Err(XrError::Frame("empty frame".into()));
    }
    ImageBuffer::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| XrError::Frame(format!("buffer too small for a {}x{} frame", frame.width, frame.height)))
}
