use crate::theme::{TextStyle, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Gap between children of a HorizontalLayout without a `padding` prop.
    pub horizontal_padding: f32,
    /// Gap between children of a VerticalLayout without a `padding` prop.
    pub vertical_padding: f32,
    /// Margin an Image leaves around its content.
    pub image_padding: f32,
    pub pin_radius: f32,
    /// Skip font lookup and measure with the built-in width table.
    pub fast_text_metrics: bool,
    /// Scheduler turns allowed before a render gives up on settling.
    pub max_settle_turns: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_padding: 10.0,
            vertical_padding: 5.0,
            image_padding: 10.0,
            pin_radius: 5.0,
            fast_text_metrics: false,
            max_settle_turns: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    /// Space kept around a root that is not itself an Image.
    pub margin: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            margin: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    text_color: Option<String>,
    quote_color: Option<String>,
    pin_fill: Option<String>,
    pin_stroke: Option<String>,
    background: Option<String>,
    text_styles: Option<BTreeMap<String, TextStyle>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(value) => Some(*value),
            NumberOrString::String(value) => value.trim().trim_end_matches("px").parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    horizontal_padding: Option<f32>,
    vertical_padding: Option<f32>,
    image_padding: Option<f32>,
    pin_radius: Option<f32>,
    fast_text_metrics: Option<bool>,
    max_settle_turns: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    margin: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed)?;
    Ok(config)
}

/// Apply an inline `init` directive on top of an already loaded config.
pub fn merge_init_config(config: &mut Config, init: serde_json::Value) -> anyhow::Result<()> {
    let parsed: ConfigFile = serde_json::from_value(init)?;
    apply_config_file(config, parsed)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) -> anyhow::Result<()> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::named(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.quote_color {
            config.theme.quote_color = v;
        }
        if let Some(v) = vars.pin_fill {
            config.theme.pin_fill = v;
        }
        if let Some(v) = vars.pin_stroke {
            config.theme.pin_stroke = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(styles) = vars.text_styles {
            config.theme.text_styles.extend(styles);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.horizontal_padding {
            config.layout.horizontal_padding = v;
        }
        if let Some(v) = layout.vertical_padding {
            config.layout.vertical_padding = v;
        }
        if let Some(v) = layout.image_padding {
            config.layout.image_padding = v;
        }
        if let Some(v) = layout.pin_radius {
            config.layout.pin_radius = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
        if let Some(v) = layout.max_settle_turns {
            config.layout.max_settle_turns = v;
        }
    }

    if let Some(v) = parsed.margin {
        config.render.margin = v;
    }

    config.render.background = config.theme.background.clone();
    Ok(())
}
