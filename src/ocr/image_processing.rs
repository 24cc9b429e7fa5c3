use crate::error::{decode_error, AppResult};
use image::{DynamicImage, ImageDecoder, ImageReader};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::hough::{detect_lines, LineDetectionOptions};
use std::f32::consts::PI;
use std::io::Cursor;
use tracing::{debug, info};

/// Rotations below this are not worth the interpolation blur (~0.57°)
const MIN_SKEW_RAD: f32 = 0.01;
/// Rotations above this are more likely misdetections than skew (~14.3°)
const MAX_SKEW_RAD: f32 = 0.25;

/// Decode a schedule screenshot and straighten its table grid
pub fn preprocess_schedule_image(image_data: &[u8]) -> AppResult<DynamicImage> {
    info!(
        "Preprocessing schedule image, size: {} bytes",
        image_data.len()
    );

    let img = load_image_with_orientation(image_data)?;
    Ok(deskew_grid(&img))
}

/// Decode an image and apply its EXIF orientation if present
pub fn load_image_with_orientation(image_data: &[u8]) -> AppResult<DynamicImage> {
    let format = image::guess_format(image_data)
        .map_err(|e| decode_error(&format!("Failed to determine image format: {}", e)))?;
    debug!("Detected image format: {:?}", format);

    let mut decoder = ImageReader::with_format(Cursor::new(image_data), format)
        .into_decoder()
        .map_err(|e| decode_error(&format!("Failed to create image decoder: {}", e)))?;
    let orientation = decoder
        .orientation()
        .map_err(|e| decode_error(&format!("Failed to read image orientation: {}", e)))?;

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| decode_error(&format!("Failed to decode image: {}", e)))?;
    img.apply_orientation(orientation);

    info!(
        "Image loaded with dimensions {}x{}",
        img.width(),
        img.height()
    );

    Ok(img)
}

/// Detect grid lines and correct skew. Returns the input unchanged when no
/// usable skew is found.
pub fn deskew_grid(img: &DynamicImage) -> DynamicImage {
    let gray_img = img.to_luma8();
    let edges = canny(&gray_img, 50.0, 150.0);

    let options = LineDetectionOptions {
        vote_threshold: 500,
        suppression_radius: 5,
    };
    let lines = detect_lines(&edges, options);
    debug!("Detected {} lines in the image", lines.len());

    let mut horizontal_angles = Vec::new();
    let mut vertical_angles = Vec::new();

    for line in &lines {
        let angle_deg = (line.angle_in_degrees % 180) as f32;

        if !(20.0..=160.0).contains(&angle_deg) {
            // Fold angles near 180° onto small negative ones
            let folded = if angle_deg > 90.0 {
                angle_deg - 180.0
            } else {
                angle_deg
            };
            horizontal_angles.push(folded);
        } else if (angle_deg - 90.0).abs() < 20.0 {
            vertical_angles.push(angle_deg - 90.0);
        }
    }

    let skew_deg = average(&horizontal_angles)
        .or_else(|| average(&vertical_angles))
        .unwrap_or(0.0);
    let skew_rad = skew_deg * PI / 180.0;

    if skew_rad.abs() < MIN_SKEW_RAD {
        debug!("Skew of {:.2}° is negligible, skipping rotation", skew_deg);
        return img.clone();
    }
    if skew_rad.abs() > MAX_SKEW_RAD {
        info!("Skew of {:.2}° looks wrong, skipping rotation", skew_deg);
        return img.clone();
    }

    info!("Rotating image by {:.2}° to correct skew", -skew_deg);
    let rotated = rotate_about_center(
        &img.to_rgb8(),
        -skew_rad,
        Interpolation::Bilinear,
        image::Rgb([255, 255, 255]),
    );

    DynamicImage::ImageRgb8(rotated)
}

fn average(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}
