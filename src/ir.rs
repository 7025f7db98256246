use serde::{Deserialize, Serialize};

/// Role a child plays inside an adapter container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Staging,
    Archive,
    Transform,
}

impl Role {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "staging" => Some(Self::Staging),
            "archive" => Some(Self::Archive),
            "transform" => Some(Self::Transform),
            _ => None,
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Staging => "stg",
            Self::Archive => "arc",
            Self::Transform => "trn",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Archive => "archive",
            Self::Transform => "transform",
        }
    }

    pub fn label_prefix(self) -> &'static str {
        match self {
            Self::Staging => "Staging",
            Self::Archive => "Archive",
            Self::Transform => "Transform",
        }
    }
}

/// Node type tag as declared in the input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Adapter,
    Group,
    Lane,
    Columns,
    #[default]
    Node,
    Other(String),
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Adapter | Self::Group | Self::Lane | Self::Columns)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Adapter => "adapter",
            Self::Group => "group",
            Self::Lane => "lane",
            Self::Columns => "columns",
            Self::Node => "node",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "adapter" => Self::Adapter,
            "group" => Self::Group,
            "lane" => Self::Lane,
            "columns" => Self::Columns,
            "node" => Self::Node,
            _ => Self::Other(value),
        }
    }
}

impl From<NodeKind> for String {
    fn from(value: NodeKind) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescriptor {
    pub mode: Option<String>,
    pub arrangement: Option<ArrangementCode>,
}

/// Arrangement code as written in the input: `2` or `"2"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrangementCode {
    Number(f64),
    Text(String),
}

impl ArrangementCode {
    /// The code as a small integer, if it reads as one.
    pub fn code(&self) -> Option<u8> {
        let value = match self {
            ArrangementCode::Number(val) => *val,
            ArrangementCode::Text(val) => val.trim().parse::<f64>().ok()?,
        };
        (value.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&value)).then_some(value as u8)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutDescriptor>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDescriptor>,
}

impl NodeDescriptor {
    pub fn is_container(&self) -> bool {
        self.kind.is_container() || !self.children.is_empty()
    }

    /// Typed role, `None` for untyped or unknown role tags.
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::from_token)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDescriptor {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub edge_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Renderer settings, kept opaque.
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default)]
    pub nodes: Vec<NodeDescriptor>,
    #[serde(default)]
    pub edges: Vec<EdgeDescriptor>,
}
