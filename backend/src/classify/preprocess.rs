use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;
use shared::ModelFamily;

/// Input edge length both classifier families were trained on.
pub const INPUT_SIZE: u32 = 224;

// Published ImageNet normalization for the EfficientNet backbone. These
// must match the constants used at training time exactly.
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Structural decode of the uploaded bytes. The caller maps any failure
/// to its own invalid-image error; the decoder error never reaches the
/// HTTP client.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    image::load_from_memory(bytes)
}

/// Resize to 224x224 RGB and normalize for the given family, producing
/// the batch-of-one NHWC tensor the artifacts expect. Borrows the decoded
/// image so `/compare` can normalize the same decode twice.
pub fn normalize(image: &DynamicImage, family: ModelFamily) -> Array4<f32> {
    let resized = image
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();

    let side = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, side, side, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            let scaled = pixel[channel] as f32 / 255.0;
            tensor[[0, y as usize, x as usize, channel]] = match family {
                ModelFamily::Mobilenet => scaled,
                ModelFamily::Efficientnet => {
                    (scaled - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel]
                }
            };
        }
    }
    tensor
}
