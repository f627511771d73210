//! Card measurement.
//!
//! A card holds two lines: the event title and its formatted time. The
//! timeline asks a [`CardMeasurer`] for the box size whenever a card has not
//! been measured yet; hosts that measure cards themselves push sizes with
//! `Command::Measure` instead.

use std::collections::HashMap;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use ttf_parser::Face;

use crate::config::CardConfig;
use crate::theme::Theme;

const AVERAGE_ADVANCE: f64 = 0.56;
const LINE_HEIGHT: f64 = 1.2;
const SUBTITLE_SCALE: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardSize {
    pub width: f64,
    pub height: f64,
}

pub trait CardMeasurer {
    fn measure_card(&mut self, title: &str, subtitle: &str) -> CardSize;
}

/// Font sizes and box metrics shared by measurement and SVG output.
#[derive(Debug, Clone, PartialEq)]
pub struct CardStyle {
    pub font_size: f64,
    pub padding_x: f64,
    pub padding_y: f64,
    pub line_gap: f64,
    pub min_width: f64,
    pub max_width: f64,
    pub border_width: f64,
}

impl CardStyle {
    pub fn new(theme: &Theme, card: &CardConfig) -> Self {
        Self {
            font_size: theme.font_size,
            padding_x: card.padding_x,
            padding_y: card.padding_y,
            line_gap: card.line_gap,
            min_width: card.min_width,
            max_width: card.max_width,
            border_width: card.border_width,
        }
    }

    pub fn subtitle_font_size(&self) -> f64 {
        self.font_size * SUBTITLE_SCALE
    }

    /// Baseline of the title, relative to the card top.
    pub fn title_baseline(&self) -> f64 {
        self.padding_y + self.font_size
    }

    pub fn subtitle_baseline(&self) -> f64 {
        self.padding_y + self.font_size * LINE_HEIGHT + self.line_gap + self.subtitle_font_size()
    }

    /// Box size for the given text widths, rounded to whole pixels.
    pub fn card_size(&self, title_width: f64, subtitle_width: f64) -> CardSize {
        let content = title_width.max(subtitle_width);
        let width = (content + 2.0 * self.padding_x + self.border_width)
            .clamp(self.min_width, self.max_width.max(self.min_width));
        let height = 2.0 * self.padding_y
            + self.font_size * LINE_HEIGHT
            + self.line_gap
            + self.subtitle_font_size() * LINE_HEIGHT;
        CardSize {
            width: width.round(),
            height: height.round(),
        }
    }
}

/// Fixed average glyph advance; deterministic and font-independent.
#[derive(Debug, Clone)]
pub struct ApproxMeasurer {
    style: CardStyle,
}

impl ApproxMeasurer {
    pub fn new(style: CardStyle) -> Self {
        Self { style }
    }
}

impl CardMeasurer for ApproxMeasurer {
    fn measure_card(&mut self, title: &str, subtitle: &str) -> CardSize {
        let title_width = approx_width(title, self.style.font_size);
        let subtitle_width = approx_width(subtitle, self.style.subtitle_font_size());
        self.style.card_size(title_width, subtitle_width)
    }
}

fn approx_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * AVERAGE_ADVANCE
}

/// Measures with real glyph advances from the first installed face matching
/// a CSS-style family list. System fonts are loaded on first use.
pub struct FontMeasurer {
    style: CardStyle,
    font_family: String,
    db: Database,
    loaded: bool,
    face: Option<FontFace>,
}

impl FontMeasurer {
    pub fn new(style: CardStyle, font_family: impl Into<String>) -> Self {
        Self {
            style,
            font_family: font_family.into(),
            db: Database::new(),
            loaded: false,
            face: None,
        }
    }

    /// Builds a measurer over an explicit font database, skipping the system
    /// font scan.
    pub fn with_database(style: CardStyle, font_family: impl Into<String>, db: Database) -> Self {
        Self {
            style,
            font_family: font_family.into(),
            db,
            loaded: true,
            face: None,
        }
    }

    fn text_width(&mut self, text: &str, font_size: f64) -> f64 {
        if !self.loaded {
            self.db.load_system_fonts();
            self.loaded = true;
            self.face = load_face(&self.db, &self.font_family);
            if self.face.is_none() {
                tracing::debug!(family = %self.font_family, "no font face found, using average advance");
            }
        } else if self.face.is_none() && !self.db.is_empty() {
            self.face = load_face(&self.db, &self.font_family);
        }
        match self.face.as_mut() {
            Some(face) => face.measure(text, font_size),
            None => approx_width(text, font_size),
        }
    }
}

impl CardMeasurer for FontMeasurer {
    fn measure_card(&mut self, title: &str, subtitle: &str) -> CardSize {
        let title_width = self.text_width(title, self.style.font_size);
        let subtitle_width = self.text_width(subtitle, self.style.subtitle_font_size());
        self.style.card_size(title_width, subtitle_width)
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f64,
    ascii_advances: [u16; 128],
    advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = f64::from(face.units_per_em().max(1));
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advances: HashMap::new(),
        })
    }

    fn measure(&mut self, text: &str, font_size: f64) -> f64 {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * AVERAGE_ADVANCE;
        let mut width = 0.0;
        let mut face = None;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(self.ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else if let Some(cached) = self.advances.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Face::parse(&self.data, self.index).ok();
                }
                let advance = face.as_ref().and_then(|face| {
                    face.glyph_index(ch)
                        .and_then(|glyph| face.glyph_hor_advance(glyph))
                });
                self.advances.insert(ch, advance);
                advance
            };
            width += match advance {
                Some(advance) => f64::from(advance) * scale,
                None => fallback,
            };
        }
        width
    }
}

fn load_face(db: &Database, font_family: &str) -> Option<FontFace> {
    let names: Vec<&str> = font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .filter(|part| !part.is_empty())
        .collect();
    let mut families: Vec<Family<'_>> = names
        .iter()
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "serif" => Family::Serif,
            "monospace" | "ui-monospace" => Family::Monospace,
            "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
            _ => Family::Name(name),
        })
        .collect();
    if families.is_empty() {
        families.push(Family::SansSerif);
    }

    let query = Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    };
    let id = db.query(&query)?;
    db.with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
        .flatten()
}
