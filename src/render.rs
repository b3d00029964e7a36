use crate::config::{Config, RenderConfig};
use crate::error::{DiagramError, Result};
use crate::ir::NodeDescription;
use crate::layout::{Matrix, fmt_num};
use crate::nodes::SVG_NAMESPACE;
use crate::primitive::{Element, Primitive};
use crate::tree::{NodeRef, RenderTree};
use std::path::Path;

/// Mount `description`, drive it until the root settles, and hand back the tree.
pub fn layout_description(description: &NodeDescription, config: &Config) -> Result<RenderTree> {
    let mut tree = RenderTree::new(config.theme.clone(), config.layout.clone());
    tree.mount(description)?;
    let settlement = tree.run_until_idle(config.layout.max_settle_turns);
    if !settlement.is_settled() {
        return Err(DiagramError::Unsettled {
            turns: settlement.turns,
        });
    }
    Ok(tree)
}

pub fn render_description(description: &NodeDescription, config: &Config) -> Result<String> {
    let tree = layout_description(description, config)?;
    Ok(render_svg(&tree, &config.render))
}

/// Like [`render_description`], but lets `inspect` look at the settled root
/// before the document is serialised.
pub fn render_with_image_ref<F>(
    description: &NodeDescription,
    config: &Config,
    inspect: F,
) -> Result<String>
where
    F: FnOnce(NodeRef<'_>),
{
    let tree = layout_description(description, config)?;
    if let Some(image) = tree.image_ref() {
        inspect(image);
    }
    Ok(render_svg(&tree, &config.render))
}

/// Serialise the tree's current committed state as a standalone SVG document.
///
/// An `Image` root is already a document; anything else is framed in an
/// `<svg>` sized to the root's box plus the configured margin.
pub fn render_svg(tree: &RenderTree, render: &RenderConfig) -> String {
    let Some(root) = tree.image_ref() else {
        let empty = Element::new("svg")
            .attr("xmlns", SVG_NAMESPACE)
            .attr("width", "0")
            .attr("height", "0");
        return Primitive::from(empty).to_svg();
    };
    let content = root.primitive();
    if matches!(&content, Primitive::Element(element) if element.tag == "svg") {
        return content.to_svg();
    }

    let bbox = root.committed_bbox().unwrap_or_default();
    let margin = render.margin;
    let width = fmt_num(bbox.width + margin * 2.0);
    let height = fmt_num(bbox.height + margin * 2.0);
    let offset = Matrix::translate(margin - bbox.x, margin - bbox.y);
    let document = Element::new("svg")
        .attr("xmlns", SVG_NAMESPACE)
        .attr("width", width.clone())
        .attr("height", height.clone())
        .attr("viewBox", format!("0 0 {width} {height}"))
        .child(
            Element::new("rect")
                .attr("class", "background")
                .attr("width", "100%")
                .attr("height", "100%")
                .attr("fill", render.background.clone()),
        )
        .child(Element::new("g").transform(Some(&offset)).child(content));
    Primitive::from(document).to_svg()
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    font_family: &str,
) -> anyhow::Result<()> {
    let mut opt = usvg::Options {
        font_family: font_family.to_string(),
        ..Default::default()
    };
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}
