use crate::geometry::Size;
use crate::theme::Theme;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Measures the rendered extent of a label. Minimum node sizes are derived from it.
pub trait LabelMeasurer {
    fn measure_label(&self, text: &str) -> Size;
}

/// Measures labels against a system font found through fontdb, falling back to
/// calibrated per-character widths when no face is available.
#[derive(Debug, Clone)]
pub struct FontMeasurer {
    font_family: String,
    font_size: f32,
    line_height: f32,
}

impl FontMeasurer {
    pub fn new(theme: &Theme) -> Self {
        Self {
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            line_height: theme.label_line_height,
        }
    }
}

impl LabelMeasurer for FontMeasurer {
    fn measure_label(&self, text: &str) -> Size {
        let lines = split_lines(text);
        let width = lines
            .iter()
            .map(|line| {
                measure_text_width(line, self.font_size, &self.font_family)
                    .unwrap_or_else(|| fallback_text_width(line, self.font_size))
            })
            .fold(0.0, f32::max);
        let height = lines.len() as f32 * self.font_size * self.line_height;
        Size::new(width, height)
    }
}

/// Deterministic measurer: every character advances by the same width.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasurer {
    pub char_width: f32,
    pub line_height: f32,
}

impl FixedMeasurer {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Default for FixedMeasurer {
    fn default() -> Self {
        Self::new(6.0, 14.0)
    }
}

impl LabelMeasurer for FixedMeasurer {
    fn measure_label(&self, text: &str) -> Size {
        let lines = split_lines(text);
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Size::new(
            longest as f32 * self.char_width,
            lines.len() as f32 * self.line_height,
        )
    }
}

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

fn split_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    if lines.is_empty() { vec![""] } else { lines }
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '-' | '_' => 0.321,
        'i' | 'j' | 'l' | 'I' => 0.24,
        'f' | 'r' | 't' => 0.34,
        'm' | 'w' | 'M' | 'W' => 0.88,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.6,
        _ => 0.56,
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        face.measure_width(text, font_size)
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            if let Ok(face) = Face::parse(data, index) {
                loaded = Some(FontFace {
                    data: data.to_vec(),
                    index,
                    units_per_em: face.units_per_em().max(1),
                    advances: HashMap::new(),
                });
            }
        });
        if loaded.is_none() {
            tracing::debug!("no usable font face for {font_family:?}, using fallback widths");
        }
        loaded
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let face = Face::parse(&self.data, self.index).ok()?;
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        for ch in text.chars() {
            let advance = *self.advances.entry(ch).or_insert_with(|| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
            width += match advance {
                Some(value) if value > 0 => value as f32 * scale,
                _ => fallback,
            };
        }
        Some(width.max(0.0))
    }
}
