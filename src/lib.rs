#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod measure;
pub mod nodes;
pub mod parser;
pub mod primitive;
pub mod reflow;
pub mod render;
pub mod scheduler;
pub mod text_metrics;
pub mod theme;
pub mod tree;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use dispatch::Registry;
pub use error::{DiagramError, Result};
pub use ir::{Child, NodeDescription};
pub use render::{layout_description, render_description, render_svg, render_with_image_ref};
pub use theme::Theme;
pub use tree::{NodeId, NodeRef, RenderTree, Settlement};

/// Theme and layout settings for [`render_with_options`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::with_theme(Theme::classic())
    }

    pub fn modern() -> Self {
        Self::with_theme(Theme::modern())
    }

    fn with_theme(theme: Theme) -> Self {
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

    /// Measure text with the built-in width table instead of system fonts.
    pub fn with_fast_text_metrics(mut self, fast: bool) -> Self {
        self.layout.fast_text_metrics = fast;
        self
    }
}

impl From<RenderOptions> for Config {
    fn from(options: RenderOptions) -> Self {
        Config {
            theme: options.theme,
            layout: options.layout,
            render: options.render,
        }
    }
}

/// Parse a JSON or JSON5 description and render it to an SVG document.
pub fn render_with_options(input: &str, options: RenderOptions) -> Result<String> {
    let description = parser::parse_description(input)?;
    render_description(&description, &options.into())
}
