//! Blocking pipeline calls behind the build and inspect endpoints.

use relief_engine::export::write_stl;
use relief_engine::field::decode_image;
use relief_engine::{generate_from_image, BuildOutput, PipelineConfig, Result};
use shared::{ModelReport, ReliefSettings};

/// Encoded STL plus the number of diagnostics raised while building it.
pub struct StlBuild {
    pub bytes: Vec<u8>,
    pub diagnostics: usize,
}

fn run(image: &[u8], settings: &ReliefSettings, config: &PipelineConfig) -> Result<BuildOutput> {
    let img = decode_image(image)?;
    generate_from_image(&img, settings, config)
}

/// Decode the uploaded image, build the mesh and encode it as binary STL.
pub fn build_stl(image: &[u8], settings: &ReliefSettings, config: &PipelineConfig) -> Result<StlBuild> {
    let output = run(image, settings, config)?;
    for d in &output.diagnostics {
        tracing::warn!("build: {d}");
    }
    Ok(StlBuild {
        bytes: write_stl(&output.mesh),
        diagnostics: output.diagnostics.len(),
    })
}

/// Decode the uploaded image, build the mesh and summarize it.
pub fn inspect(image: &[u8], settings: &ReliefSettings, config: &PipelineConfig) -> Result<ModelReport> {
    Ok(run(image, settings, config)?.report())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    /// PNG of a white square on a transparent background.
    pub(crate) fn square_png() -> Vec<u8> {
        let mut img = RgbaImage::new(32, 32);
        for y in 8..24 {
            for x in 8..24 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn small_settings() -> ReliefSettings {
        ReliefSettings {
            resolution: 32,
            ..Default::default()
        }
    }

    #[test]
    fn test_build_stl_size() {
        let out = build_stl(&square_png(), &small_settings(), &PipelineConfig::default()).unwrap();
        let tris = u32::from_le_bytes([out.bytes[80], out.bytes[81], out.bytes[82], out.bytes[83]]);
        assert!(tris > 0);
        assert_eq!(out.bytes.len(), 84 + 50 * tris as usize);
        assert_eq!(out.diagnostics, 0);
    }

    #[test]
    fn test_inspect_reports_one_polygon() {
        let report = inspect(&square_png(), &small_settings(), &PipelineConfig::default()).unwrap();
        assert_eq!(report.polygons, 1);
        assert!(report.triangles > 0);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = build_stl(b"not an image", &small_settings(), &PipelineConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, relief_engine::ReliefError::ImageDecode(_)));
    }
}
