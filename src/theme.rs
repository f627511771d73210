use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub text_color: String,
    pub muted_text_color: String,
    pub axis_color: String,
    pub tick_color: String,
    pub card_background: String,
    pub card_shadow: String,
    pub highlight_color: String,
    pub background: String,
}

impl Theme {
    pub fn pansy() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            muted_text_color: "#6B7A90".to_string(),
            axis_color: "#7A8AA6".to_string(),
            tick_color: "#C7D2E5".to_string(),
            card_background: "#FFFFFF".to_string(),
            card_shadow: "#E3E8F2".to_string(),
            highlight_color: "#F59E0B".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#E6EAF2".to_string(),
            muted_text_color: "#8B97AD".to_string(),
            axis_color: "#5C6A82".to_string(),
            tick_color: "#3A4458".to_string(),
            card_background: "#1E2533".to_string(),
            card_shadow: "#111722".to_string(),
            highlight_color: "#FBBF24".to_string(),
            background: "#141A24".to_string(),
        }
    }
}
