//! End-to-end build: pixels -> field -> contours -> polygons -> mesh.

use image::DynamicImage;
use shared::{ModelReport, OutputMode, ReliefSettings};

use crate::config::PipelineConfig;
use crate::contour::trace_contours;
use crate::error::{Diagnostic, Result};
use crate::extrude::{build_solid_mesh, SolidOptions};
use crate::field::{build_scalar_field, relief_field, PixelBuffer, ScalarField};
use crate::geometry::WorldFrame;
use crate::heightfield::{build_heightfield_mesh, ReliefOptions};
use crate::hierarchy::{assemble_polygons, ContainmentTree, ContourInfo, LinearScan, PolygonSet};
use crate::mesh::Mesh;
use crate::simplify::simplify;

/// Result of one build. An empty mesh is a valid outcome, explained by `diagnostics`.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub mesh: Mesh,
    pub mode: OutputMode,
    pub polygon_count: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutput {
    pub fn report(&self) -> ModelReport {
        let (lo, hi) = self.mesh.bounds().unwrap_or_default();
        ModelReport {
            mode: self.mode,
            triangles: self.mesh.triangle_count(),
            polygons: self.polygon_count,
            bounds_min: lo.to_array(),
            bounds_max: hi.to_array(),
            diagnostics: self.diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Trace, simplify and normalize the contours of `field`, then classify them by nesting.
///
/// `tolerance` is in field grid units.
pub fn trace_tree(
    field: &ScalarField,
    threshold: f64,
    tolerance: f64,
    frame: &WorldFrame,
    config: &PipelineConfig,
) -> ContainmentTree {
    let loops = trace_contours(field, threshold, config.stitch_scale());

    let contours: Vec<ContourInfo> = loops
        .iter()
        .map(|l| simplify(&l.points, tolerance))
        .filter(|pts| pts.len() >= 3)
        .map(|pts| ContourInfo::new(pts.into_iter().map(|p| frame.to_world(p)).collect()))
        .collect();

    tracing::debug!("trace_tree: {} loops -> {} contours", loops.len(), contours.len());
    ContainmentTree::build(contours, &LinearScan)
}

/// [`trace_tree`] followed by polygon assembly.
pub fn trace_polygons(
    field: &ScalarField,
    threshold: f64,
    tolerance: f64,
    frame: &WorldFrame,
    config: &PipelineConfig,
) -> PolygonSet {
    let tree = trace_tree(field, threshold, tolerance, frame, config);
    let set = assemble_polygons(&tree);
    tracing::debug!(
        "trace_polygons: {} contours -> {} polygons",
        tree.len(),
        set.polygons.len()
    );
    set
}

/// Build a mesh from a validated pixel buffer.
///
/// Settings are sanitized first; the buffer's own resolution wins over
/// `settings.resolution`.
pub fn generate(
    pixels: &PixelBuffer,
    settings: &ReliefSettings,
    config: &PipelineConfig,
) -> BuildOutput {
    let settings = settings.sanitized();
    let mode = OutputMode::for_settings(&settings);
    let frame = WorldFrame::new(pixels.resolution() as usize, config.world_size);

    let output = match mode {
        OutputMode::Vector => generate_vector(pixels, &settings, config, &frame),
        OutputMode::Heightfield => generate_heightfield(pixels, &settings, config, &frame),
    };

    tracing::info!(
        "generate: {:?} mode, {} polygons, {} triangles, {} diagnostics",
        output.mode,
        output.polygon_count,
        output.mesh.triangle_count(),
        output.diagnostics.len()
    );
    output
}

/// Letterbox a decoded image to `settings.resolution` and build it.
pub fn generate_from_image(
    img: &DynamicImage,
    settings: &ReliefSettings,
    config: &PipelineConfig,
) -> Result<BuildOutput> {
    let pixels = PixelBuffer::from_image(img, settings.sanitized().resolution)?;
    Ok(generate(&pixels, settings, config))
}

fn generate_vector(
    pixels: &PixelBuffer,
    settings: &ReliefSettings,
    config: &PipelineConfig,
    frame: &WorldFrame,
) -> BuildOutput {
    let field = build_scalar_field(pixels, settings.contrast, settings.invert);
    let set = trace_polygons(
        &field,
        settings.mask_threshold,
        settings.simplification,
        frame,
        config,
    );

    let mut diagnostics = Vec::new();
    if set.orphan_holes > 0 {
        diagnostics.push(Diagnostic::OrphanHoles {
            count: set.orphan_holes,
        });
    }

    if set.polygons.is_empty() {
        tracing::warn!(
            "generate: no contours at threshold {:.2}",
            settings.mask_threshold
        );
        diagnostics.push(Diagnostic::EmptyResult {
            threshold: settings.mask_threshold,
        });
        return BuildOutput {
            mesh: Mesh::new(),
            mode: OutputMode::Vector,
            polygon_count: 0,
            diagnostics,
        };
    }

    let options = SolidOptions {
        extrusion_height: settings.height_scale,
        base_thickness: settings.base_thickness,
        include_base: settings.enable_base,
    };
    let (mesh, build_diagnostics) = build_solid_mesh(&set.polygons, &options, frame);
    diagnostics.extend(build_diagnostics);

    BuildOutput {
        mesh,
        mode: OutputMode::Vector,
        polygon_count: set.polygons.len(),
        diagnostics,
    }
}

fn generate_heightfield(
    pixels: &PixelBuffer,
    settings: &ReliefSettings,
    config: &PipelineConfig,
    frame: &WorldFrame,
) -> BuildOutput {
    let field = relief_field(pixels, settings.invert);
    let options = ReliefOptions {
        height_scale: settings.height_scale,
        base_thickness: settings.base_thickness,
        skirt: config.relief_skirt,
    };
    BuildOutput {
        mesh: build_heightfield_mesh(&field, &options, frame),
        mode: OutputMode::Heightfield,
        polygon_count: 0,
        diagnostics: Vec::new(),
    }
}
