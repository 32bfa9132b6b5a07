//! Whole-scene SVG export.

use crate::error::{ExportError, RenderError};
use crate::icons::IconProvider;
use crate::renderer::{ClayRenderer, RenderOptions};
use crate::svg::{SVG_NS, fmt_num, paint_attr, place_transform};
use iconclay_core::{CanvasElement, CanvasSettings, ElementId, Scene};
use kurbo::Vec2;
use std::fmt::Write as _;
use std::path::Path;

/// Flip transform inside an element box of `w` x `h`, `None` when unflipped.
pub fn flip_transform(element: &CanvasElement) -> Option<String> {
    let (w, h) = (fmt_num(element.width), fmt_num(element.height));
    match (element.flip_x, element.flip_y) {
        (true, true) => Some(format!("translate({w}, {h}) scale(-1, -1)")),
        (true, false) => Some(format!("translate({w}, 0) scale(-1, 1)")),
        (false, true) => Some(format!("translate(0, {h}) scale(1, -1)")),
        (false, false) => None,
    }
}

fn composite_style(element: &CanvasElement) -> String {
    format!(
        "mix-blend-mode: {}; opacity: {}",
        element.style.blend_mode.as_css(),
        fmt_num(element.style.opacity)
    )
}

/// Serialize the scene as one self-contained SVG document.
///
/// Elements are painted through the hierarchy in list order. Hidden
/// elements hide their subtree, merged folders draw as one union layer and
/// masked elements are clipped by their mask's silhouette.
pub fn export_scene_svg<P: IconProvider>(
    scene: &Scene,
    settings: &CanvasSettings,
    renderer: &ClayRenderer<P>,
) -> Result<String, RenderError> {
    let (w, h) = (fmt_num(settings.canvas_size.width), fmt_num(settings.canvas_size.height));
    let mut out = format!("<svg xmlns=\"{SVG_NS}\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">");
    if let Some(background) = settings.canvas_fill() {
        let _ = write!(out, "<rect width=\"100%\" height=\"100%\"{}/>", paint_attr("fill", background));
    }
    write_level(&mut out, scene, None, renderer)?;
    out.push_str("</svg>");
    Ok(out)
}

/// Export the scene and write it to `path`.
pub fn write_scene_svg<P: IconProvider>(
    path: impl AsRef<Path>,
    scene: &Scene,
    settings: &CanvasSettings,
    renderer: &ClayRenderer<P>,
) -> Result<(), ExportError> {
    let svg = export_scene_svg(scene, settings, renderer)?;
    std::fs::write(path.as_ref(), svg)?;
    log::info!("Exported {} elements to {}", scene.len(), path.as_ref().display());
    Ok(())
}

fn write_level<P: IconProvider>(
    out: &mut String,
    scene: &Scene,
    parent: Option<&ElementId>,
    renderer: &ClayRenderer<P>,
) -> Result<(), RenderError> {
    for id in scene.children_of(parent) {
        let Some(element) = scene.get(id) else {
            continue;
        };
        if !element.visible {
            continue;
        }

        if !element.is_folder() {
            let options = RenderOptions { mask: scene.mask_of(id), ..RenderOptions::default() };
            write_element(out, element, options, renderer)?;
        } else if element.merge {
            let children: Vec<&CanvasElement> = scene
                .children_of(Some(id))
                .iter()
                .filter_map(|child| scene.get(child))
                .filter(|child| child.visible && !child.is_folder())
                .collect();
            if children.is_empty() {
                continue;
            }
            let options = RenderOptions::default().with_merged_children(&children);
            write_element(out, element, options, renderer)?;
        } else {
            let _ = write!(out, "<g style=\"{}\">", composite_style(element));
            write_level(out, scene, Some(id), renderer)?;
            out.push_str("</g>");
        }
    }
    Ok(())
}

fn write_element<P: IconProvider>(
    out: &mut String,
    element: &CanvasElement,
    options: RenderOptions<'_>,
    renderer: &ClayRenderer<P>,
) -> Result<(), RenderError> {
    let layer = renderer.render(element, options)?;
    let (w, h) = (fmt_num(element.width), fmt_num(element.height));

    let _ = write!(
        out,
        "<g transform=\"{}\" style=\"{}\"><svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" overflow=\"visible\">",
        place_transform(Vec2::new(element.x, element.y), element.rotation, element.size()),
        composite_style(element)
    );
    match flip_transform(element) {
        Some(flip) => {
            let _ = write!(out, "<g transform=\"{flip}\">");
        }
        None => out.push_str("<g>"),
    }
    layer.write_inline(out);
    out.push_str("</g></svg></g>");
    Ok(())
}
