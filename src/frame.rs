use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use ndarray::{Array2, Array3};

/// Color-channel ordering of a 3-channel pixel buffer.
///
/// `Rgb` is the reference order every consumer expects; backends whose
/// devices deliver the other order report `Bgr` so normalization can fix
/// it up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// A single video frame: grayscale rows×cols, or color rows×cols×3.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Gray(Array2<u8>),
    Color(Array3<u8>),
}

impl Frame {
    pub fn height(&self) -> usize {
        match self {
            Frame::Gray(data) => data.dim().0,
            Frame::Color(data) => data.dim().0,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Frame::Gray(data) => data.dim().1,
            Frame::Color(data) => data.dim().1,
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            Frame::Gray(_) => 1,
            Frame::Color(_) => 3,
        }
    }

    /// Build a color frame from a decoded RGB image.
    pub fn from_rgb_image(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let data = Array3::from_shape_fn(
            (height as usize, width as usize, 3),
            |(y, x, channel)| image.get_pixel(x as u32, y as u32)[channel],
        );
        Frame::Color(data)
    }

    /// Convert to an `image` buffer for display or recording consumers.
    /// Color frames are assumed to already be in reference (RGB) order.
    pub fn to_image(&self) -> DynamicImage {
        match self {
            Frame::Gray(data) => {
                let (height, width) = data.dim();
                let gray = GrayImage::from_fn(width as u32, height as u32, |x, y| {
                    Luma([data[[y as usize, x as usize]]])
                });
                DynamicImage::ImageLuma8(gray)
            }
            Frame::Color(data) => {
                let (height, width, _) = data.dim();
                let rgb = RgbImage::from_fn(width as u32, height as u32, |x, y| {
                    Rgb([
                        data[[y as usize, x as usize, 0]],
                        data[[y as usize, x as usize, 1]],
                        data[[y as usize, x as usize, 2]],
                    ])
                });
                DynamicImage::ImageRgb8(rgb)
            }
        }
    }
}
