use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Horizontal advance and vertical extents of a run of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// Measure `text` with the first available system font of `font_family`.
///
/// Returns `None` when no matching font is installed.
pub fn measure_run(text: &str, font_size: f32, font_family: &str) -> Option<RunMetrics> {
    if font_size <= 0.0 {
        return Some(RunMetrics {
            width: 0.0,
            ascent: 0.0,
            descent: 0.0,
        });
    }
    let mut guard = FONT_CACHE.lock().ok()?;
    let face = guard.face(font_family)?;
    Some(face.measure(text, font_size))
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<LoadedFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, font_family: &str) -> Option<&mut LoadedFace> {
        let key = normalize_family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load(font_family);
            self.faces.insert(key.clone(), face);
        }
        self.faces.get_mut(&key).and_then(|face| face.as_mut())
    }

    fn load(&mut self, font_family: &str) -> Option<LoadedFace> {
        let names = family_names(font_family);
        let mut families: Vec<Family<'_>> = Vec::with_capacity(names.len());
        for name in &names {
            families.push(match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name.as_str()),
            });
        }
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
        self.db
            .with_face_data(id, |data, index| LoadedFace::parse(data, index))
            .flatten()
    }
}

/// A face's raw bytes plus its vertical metrics. The bytes are re-parsed for
/// each run; advances are cached per character.
struct LoadedFace {
    units_per_em: f32,
    ascender: f32,
    descender: f32,
    advances: HashMap<char, Option<u16>>,
    data: Vec<u8>,
    index: u32,
}

impl LoadedFace {
    fn parse(data: &[u8], index: u32) -> Option<Self> {
        let face = Face::parse(data, index).ok()?;
        Some(Self {
            units_per_em: f32::from(face.units_per_em().max(1)),
            ascender: f32::from(face.ascender()),
            descender: f32::from(face.descender()),
            advances: HashMap::new(),
            data: data.to_vec(),
            index,
        })
    }

    fn measure(&mut self, text: &str, font_size: f32) -> RunMetrics {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;
        let mut missing: Vec<char> = Vec::new();
        for ch in text.chars() {
            if !self.advances.contains_key(&ch) {
                missing.push(ch);
            }
        }
        if !missing.is_empty()
            && let Ok(face) = Face::parse(&self.data, self.index)
        {
            for ch in missing {
                let advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph));
                self.advances.insert(ch, advance);
            }
        }
        for ch in text.chars() {
            match self.advances.get(&ch).copied().flatten() {
                Some(advance) if ch != '\n' => width += f32::from(advance) * scale,
                Some(_) => {}
                None => width += fallback,
            }
        }
        RunMetrics {
            width: width.max(0.0),
            ascent: self.ascender * scale,
            descent: -self.descender * scale,
        }
    }
}

fn family_names(font_family: &str) -> Vec<String> {
    font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
