use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub quote_color: String,
    pub pin_fill: String,
    pub pin_stroke: String,
    pub background: String,
    /// Named text variants selected by a Text node's `theme` prop.
    pub text_styles: BTreeMap<String, TextStyle>,
}

impl Theme {
    pub fn classic() -> Self {
        let mut text_styles = BTreeMap::new();
        text_styles.insert(
            "anchorText".to_string(),
            TextStyle {
                fill: Some("#6b6659".to_string()),
                font_size: Some(12.0),
                ..Default::default()
            },
        );
        text_styles.insert(
            "literal".to_string(),
            TextStyle {
                fill: Some("#000000".to_string()),
                ..Default::default()
            },
        );
        text_styles.insert(
            "label".to_string(),
            TextStyle {
                font_size: Some(12.0),
                font_style: Some("italic".to_string()),
                ..Default::default()
            },
        );
        Self {
            font_family: "Arial, sans-serif".to_string(),
            font_size: 16.0,
            text_color: "#000000".to_string(),
            quote_color: "#908c83".to_string(),
            pin_fill: "#6b6659".to_string(),
            pin_stroke: "#000000".to_string(),
            background: "#FFFFFF".to_string(),
            text_styles,
        }
    }

    pub fn modern() -> Self {
        let mut theme = Self::classic();
        theme.font_family = "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string();
        theme.font_size = 13.0;
        theme.text_color = "#1C2430".to_string();
        theme.quote_color = "#7A8AA6".to_string();
        theme.pin_fill = "#7A8AA6".to_string();
        theme.pin_stroke = "#1C2430".to_string();
        if let Some(anchor) = theme.text_styles.get_mut("anchorText") {
            anchor.fill = Some("#7A8AA6".to_string());
            anchor.font_size = Some(11.0);
        }
        theme
    }

    pub fn named(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "base" => Some(Self::classic()),
            _ => None,
        }
    }

    /// Style of a Text node, with the named variant layered over the base.
    pub fn text_style(&self, variant: Option<&str>) -> TextStyle {
        let mut style = TextStyle {
            fill: Some(self.text_color.clone()),
            font_size: Some(self.font_size),
            font_weight: None,
            font_style: None,
        };
        if let Some(overrides) = variant.and_then(|name| self.text_styles.get(name)) {
            if overrides.fill.is_some() {
                style.fill = overrides.fill.clone();
            }
            if overrides.font_size.is_some() {
                style.font_size = overrides.font_size;
            }
            if overrides.font_weight.is_some() {
                style.font_weight = overrides.font_weight.clone();
            }
            if overrides.font_style.is_some() {
                style.font_style = overrides.font_style.clone();
            }
        }
        style
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_variant_overrides_base_style() {
        let theme = Theme::classic();
        let style = theme.text_style(Some("anchorText"));
        assert_eq!(style.font_size, Some(12.0));
        assert_eq!(style.fill.as_deref(), Some("#6b6659"));
    }

    #[test]
    fn unknown_variant_falls_back_to_base() {
        let theme = Theme::modern();
        assert_eq!(theme.text_style(Some("nope")), theme.text_style(None));
    }
}
