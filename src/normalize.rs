//! Raw-frame post-processing: rotation, cropping, and channel-order fix.

use ndarray::{s, Array3, Axis};

use crate::config::{CropRect, DeviceConfig};
use crate::frame::{ChannelOrder, Frame};

/// Normalize a raw frame into the output contract: rotate with a
/// canvas-expanding bound, crop, then convert to reference (RGB) channel
/// order. Pure in `config` and `source_order`; nothing here branches on
/// which backend produced the frame.
///
/// Panics if the crop rectangle falls outside the rotated frame.
pub fn normalize(frame: Frame, source_order: ChannelOrder, config: &DeviceConfig) -> Frame {
    let mut frame = frame;

    if let Some(degrees) = config.rotation_degrees {
        if degrees != 0.0 {
            frame = rotate_bound(frame, degrees);
        }
    }

    if let Some(crop) = config.crop {
        frame = crop_frame(frame, crop);
    }

    match frame {
        Frame::Color(data) if source_order == ChannelOrder::Bgr => {
            Frame::Color(data.slice(s![.., .., ..;-1]).to_owned())
        }
        other => other,
    }
}

/// Rotate clockwise by `degrees`, expanding the canvas so no pixel data
/// is lost. Regions of the new canvas outside the source are black.
fn rotate_bound(frame: Frame, degrees: f64) -> Frame {
    match frame {
        Frame::Gray(data) => {
            let rotated = rotate_pixels(data.insert_axis(Axis(2)), degrees);
            Frame::Gray(rotated.index_axis_move(Axis(2), 0))
        }
        Frame::Color(data) => Frame::Color(rotate_pixels(data, degrees)),
    }
}

fn rotate_pixels(data: Array3<u8>, degrees: f64) -> Array3<u8> {
    // Quarter turns get exact index remapping; interpolation would only
    // smear them.
    if (degrees / 90.0).fract() == 0.0 {
        let turns = ((degrees / 90.0) as i64).rem_euclid(4) as u32;
        return rotate_quarter(data, turns);
    }

    let (height, width, channels) = data.dim();
    let (sin, cos) = degrees.to_radians().sin_cos();
    let new_width = (height as f64 * sin.abs() + width as f64 * cos.abs()).round() as usize;
    let new_height = (height as f64 * cos.abs() + width as f64 * sin.abs()).round() as usize;

    let src_center = ((width as f64 - 1.0) / 2.0, (height as f64 - 1.0) / 2.0);
    let dst_center = ((new_width as f64 - 1.0) / 2.0, (new_height as f64 - 1.0) / 2.0);

    let mut out = Array3::zeros((new_height, new_width, channels));
    for y in 0..new_height {
        for x in 0..new_width {
            // Inverse-map the output pixel into the source and take the
            // nearest sample.
            let dx = x as f64 - dst_center.0;
            let dy = y as f64 - dst_center.1;
            let src_x = (cos * dx + sin * dy + src_center.0).round();
            let src_y = (-sin * dx + cos * dy + src_center.1).round();
            if src_x < 0.0 || src_y < 0.0 {
                continue;
            }
            let (src_x, src_y) = (src_x as usize, src_y as usize);
            if src_x >= width || src_y >= height {
                continue;
            }
            for c in 0..channels {
                out[[y, x, c]] = data[[src_y, src_x, c]];
            }
        }
    }
    out
}

fn rotate_quarter(data: Array3<u8>, turns: u32) -> Array3<u8> {
    let (height, width, channels) = data.dim();
    match turns {
        0 => data,
        1 => {
            let mut out = Array3::zeros((width, height, channels));
            for y in 0..height {
                for x in 0..width {
                    for c in 0..channels {
                        out[[x, height - 1 - y, c]] = data[[y, x, c]];
                    }
                }
            }
            out
        }
        2 => {
            let mut out = Array3::zeros((height, width, channels));
            for y in 0..height {
                for x in 0..width {
                    for c in 0..channels {
                        out[[height - 1 - y, width - 1 - x, c]] = data[[y, x, c]];
                    }
                }
            }
            out
        }
        _ => {
            let mut out = Array3::zeros((width, height, channels));
            for y in 0..height {
                for x in 0..width {
                    for c in 0..channels {
                        out[[width - 1 - x, y, c]] = data[[y, x, c]];
                    }
                }
            }
            out
        }
    }
}

fn crop_frame(frame: Frame, crop: CropRect) -> Frame {
    let (left, right) = (crop.left as usize, crop.right as usize);
    let (top, bottom) = (crop.top as usize, crop.bottom as usize);
    match frame {
        Frame::Gray(data) => Frame::Gray(data.slice(s![top..bottom, left..right]).to_owned()),
        Frame::Color(data) => Frame::Color(data.slice(s![top..bottom, left..right, ..]).to_owned()),
    }
}
