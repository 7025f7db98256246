use serde::{Deserialize, Serialize};

/// Font settings used when measuring node labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub label_line_height: f32,
}

impl Theme {
    pub fn dashboard() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 12.0,
            label_line_height: 1.2,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            label_line_height: 1.2,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dashboard()
    }
}
