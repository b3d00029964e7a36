use reflow_svg_renderer::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    margin: Option<f32>,
    fast_text: Option<bool>,
}

fn build_render_options(options: DiagramRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(margin) = options.margin {
        render_options.render.margin = margin;
    }
    // No system fonts in the browser sandbox.
    render_options.with_fast_text_metrics(options.fast_text.unwrap_or(true))
}

#[wasm_bindgen]
pub fn render_diagram_svg(
    description_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<DiagramRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        DiagramRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(description_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
