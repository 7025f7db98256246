use crate::geometry::{Margin, Orientation, Size};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSpacing {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for NodeSpacing {
    fn default() -> Self {
        Self {
            horizontal: 20.0,
            vertical: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub default_size: Size,
    /// Height used by the two-node modes (`staging-archive`, `staging-transform`).
    pub compact_height: f32,
    /// Size used by `archive-only`.
    pub archive_only_size: Size,
    pub spacing: NodeSpacing,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            default_size: Size::new(334.0, 74.0),
            compact_height: 44.0,
            archive_only_size: Size::new(150.0 + 8.0 + 8.0, 44.0),
            spacing: NodeSpacing::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub container_margin: Margin,
    /// Extra width reserved on a collapsed container for its toggle button.
    pub collapse_affordance: f32,
    pub container_label_padding: Size,
    pub leaf_label_padding: Size,
    pub leaf_default_size: Size,
    /// Gap between children of generic (`group`, `lane`, `columns`) containers.
    pub stack_spacing: f32,
    pub adapter: AdapterConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            container_margin: Margin::new(18.0, 8.0, 8.0, 8.0),
            collapse_affordance: 14.0,
            container_label_padding: Size::new(8.0, 4.0),
            leaf_label_padding: Size::new(8.0, 4.0),
            leaf_default_size: Size::new(150.0, 18.0),
            stack_spacing: 20.0,
            adapter: AdapterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
    /// Padding added on every side of a focus bounding box.
    pub focus_padding: f32,
    pub orientation: Orientation,
    pub min_scale: f32,
    pub max_scale: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            focus_padding: 2.0,
            orientation: Orientation::Vertical,
            min_scale: 1.0,
            max_scale: 40.0,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
        }
    }
}

impl ViewportConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
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
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct MarginFile {
    top: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
    left: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    label_line_height: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct AdapterConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    compact_height: Option<f32>,
    archive_only_width: Option<f32>,
    horizontal_spacing: Option<f32>,
    vertical_spacing: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    container_margin: Option<MarginFile>,
    collapse_affordance: Option<f32>,
    leaf_width: Option<f32>,
    leaf_height: Option<f32>,
    stack_spacing: Option<f32>,
    adapter: Option<AdapterConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ViewportConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    focus_padding: Option<f32>,
    orientation: Option<String>,
    scale_extent: Option<[f32; 2]>,
    zoom_in_factor: Option<f32>,
    zoom_out_factor: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeFile>,
    layout: Option<LayoutConfigFile>,
    viewport: Option<ViewportConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "default" || theme_name == "dashboard" {
            config.theme = Theme::dashboard();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.as_ref().and_then(NumberOrString::as_f32) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_line_height {
            config.theme.label_line_height = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(margin) = layout.container_margin {
            let current = config.layout.container_margin;
            config.layout.container_margin = Margin::new(
                margin.top.unwrap_or(current.top),
                margin.right.unwrap_or(current.right),
                margin.bottom.unwrap_or(current.bottom),
                margin.left.unwrap_or(current.left),
            );
        }
        if let Some(v) = layout.collapse_affordance {
            config.layout.collapse_affordance = v;
        }
        if let Some(v) = layout.leaf_width {
            config.layout.leaf_default_size.width = v;
        }
        if let Some(v) = layout.leaf_height {
            config.layout.leaf_default_size.height = v;
        }
        if let Some(v) = layout.stack_spacing {
            config.layout.stack_spacing = v;
        }
        if let Some(adapter) = layout.adapter {
            let target = &mut config.layout.adapter;
            if let Some(v) = adapter.width {
                target.default_size.width = v;
            }
            if let Some(v) = adapter.height {
                target.default_size.height = v;
            }
            if let Some(v) = adapter.compact_height {
                target.compact_height = v;
                target.archive_only_size.height = v;
            }
            if let Some(v) = adapter.archive_only_width {
                target.archive_only_size.width = v;
            }
            if let Some(v) = adapter.horizontal_spacing {
                target.spacing.horizontal = v;
            }
            if let Some(v) = adapter.vertical_spacing {
                target.spacing.vertical = v;
            }
        }
    }

    if let Some(viewport) = parsed.viewport {
        let target = &mut config.viewport;
        if let Some(v) = viewport.width {
            target.width = v;
        }
        if let Some(v) = viewport.height {
            target.height = v;
        }
        if let Some(v) = viewport.focus_padding {
            target.focus_padding = v;
        }
        if let Some(token) = viewport.orientation.as_deref() {
            match Orientation::from_token(token) {
                Some(orientation) => target.orientation = orientation,
                None => tracing::warn!("unknown viewport orientation {token:?}, keeping default"),
            }
        }
        if let Some([min, max]) = viewport.scale_extent {
            target.min_scale = min.min(max);
            target.max_scale = max.max(min);
        }
        if let Some(v) = viewport.zoom_in_factor {
            target.zoom_in_factor = v;
        }
        if let Some(v) = viewport.zoom_out_factor {
            target.zoom_out_factor = v;
        }
    }

    Ok(config)
}
