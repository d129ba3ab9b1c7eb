//! Trend category tokens and display-string mapping
//!
//! The database stores a fixed set of category tokens. User-facing surfaces
//! historically sent display strings ("Humor & Memes"), which must map
//! deterministically onto the tokens. Unmapped display strings fall back to
//! a lowercase/underscore transform; empty input falls back to the
//! known-safe `meme_format` token.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category tokens accepted by the trend_submissions table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    VisualStyle,
    AudioMusic,
    CreatorTechnique,
    MemeFormat,
    ProductBrand,
    BehaviorPattern,
}

impl Category {
    /// Token stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::VisualStyle => "visual_style",
            Category::AudioMusic => "audio_music",
            Category::CreatorTechnique => "creator_technique",
            Category::MemeFormat => "meme_format",
            Category::ProductBrand => "product_brand",
            Category::BehaviorPattern => "behavior_pattern",
        }
    }

    /// All well-known tokens; the fallback transform may store others
    pub const ALL: [Category; 6] = [
        Category::VisualStyle,
        Category::AudioMusic,
        Category::CreatorTechnique,
        Category::MemeFormat,
        Category::ProductBrand,
        Category::BehaviorPattern,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visual_style" => Ok(Category::VisualStyle),
            "audio_music" => Ok(Category::AudioMusic),
            "creator_technique" => Ok(Category::CreatorTechnique),
            "meme_format" => Ok(Category::MemeFormat),
            "product_brand" => Ok(Category::ProductBrand),
            "behavior_pattern" => Ok(Category::BehaviorPattern),
            other => Err(format!("unknown category token: {}", other)),
        }
    }
}

/// Fixed lookup table from display strings to category tokens
///
/// Covers the submission form's category options plus the legacy
/// token-per-display pairs that predate the form.
const DISPLAY_MAP: [(&str, Category); 20] = [
    ("Visual Style", Category::VisualStyle),
    ("Audio/Music", Category::AudioMusic),
    ("Creator Technique", Category::CreatorTechnique),
    ("Meme Format", Category::MemeFormat),
    ("Product/Brand", Category::ProductBrand),
    ("Behavior Pattern", Category::BehaviorPattern),
    ("Fashion & Beauty", Category::VisualStyle),
    ("Food & Drink", Category::BehaviorPattern),
    ("Humor & Memes", Category::MemeFormat),
    ("Lifestyle", Category::BehaviorPattern),
    ("Politics & Social Issues", Category::BehaviorPattern),
    ("Music & Dance", Category::AudioMusic),
    ("Sports & Fitness", Category::BehaviorPattern),
    ("Tech & Gaming", Category::CreatorTechnique),
    ("Art & Creativity", Category::VisualStyle),
    ("Education & Science", Category::CreatorTechnique),
    ("Luxury", Category::ProductBrand),
    ("Celebrity", Category::BehaviorPattern),
    ("Meme Coin", Category::MemeFormat),
    ("Meme Stock", Category::MemeFormat),
];

/// Map a user-supplied category (display string or token) to a stored token
///
/// Resolution order:
/// 1. Already a valid token → returned as-is
/// 2. Known display string → mapped via the lookup table
/// 3. Non-empty unknown value → lowercase with whitespace collapsed to `_`
/// 4. Empty/whitespace → `meme_format`
pub fn map_category(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Category::MemeFormat.as_str().to_string();
    }

    if let Ok(token) = Category::from_str(trimmed) {
        return token.as_str().to_string();
    }

    for (display, token) in DISPLAY_MAP {
        if display == trimmed {
            return token.as_str().to_string();
        }
    }

    trimmed
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_map_to_tokens() {
        assert_eq!(map_category("Humor & Memes"), "meme_format");
        assert_eq!(map_category("Music & Dance"), "audio_music");
        assert_eq!(map_category("Fashion & Beauty"), "visual_style");
        assert_eq!(map_category("Tech & Gaming"), "creator_technique");
        assert_eq!(map_category("Luxury"), "product_brand");
        assert_eq!(map_category("Lifestyle"), "behavior_pattern");
        assert_eq!(map_category("Meme Stock"), "meme_format");
    }

    #[test]
    fn valid_tokens_pass_through() {
        for token in Category::ALL {
            assert_eq!(map_category(token.as_str()), token.as_str());
        }
    }

    #[test]
    fn unmapped_values_use_lowercase_underscore_transform() {
        assert_eq!(map_category("Cottage Core"), "cottage_core");
        assert_eq!(map_category("  Street   Food  "), "street_food");
    }

    #[test]
    fn empty_input_falls_back_to_meme_format() {
        assert_eq!(map_category(""), "meme_format");
        assert_eq!(map_category("   "), "meme_format");
    }

    #[test]
    fn mapping_is_deterministic() {
        let first = map_category("Humor & Memes");
        for _ in 0..10 {
            assert_eq!(map_category("Humor & Memes"), first);
        }
    }
}
