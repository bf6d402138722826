//! Quality presets
//!
//! Each preset bundles a frame rate, output width, and palette size.
//! Explicit CLI flags override individual fields.

use clap::ValueEnum;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityPreset {
    Low,
    Medium,
    High,
    Max,
}

impl QualityPreset {
    pub fn fps(&self) -> u32 {
        match self {
            QualityPreset::Low => 10,
            QualityPreset::Medium => 15,
            QualityPreset::High => 20,
            QualityPreset::Max => 30,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            QualityPreset::Low => 480,
            QualityPreset::Medium => 720,
            QualityPreset::High => 1080,
            QualityPreset::Max => 2160,
        }
    }

    pub fn colors(&self) -> u16 {
        match self {
            QualityPreset::Low => 128,
            QualityPreset::Medium => 256,
            QualityPreset::High => 256,
            QualityPreset::Max => 256,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Small file size, lower quality",
            QualityPreset::Medium => "Balanced quality and file size",
            QualityPreset::High => "High quality, larger file size",
            QualityPreset::Max => "Maximum quality, very large file size",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
            QualityPreset::Max => "max",
        }
    }
}

impl Default for QualityPreset {
    fn default() -> Self {
        QualityPreset::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_values() {
        let cases: &[(QualityPreset, u32, u32, u16)] = &[
            (QualityPreset::Low, 10, 480, 128),
            (QualityPreset::Medium, 15, 720, 256),
            (QualityPreset::High, 20, 1080, 256),
            (QualityPreset::Max, 30, 2160, 256),
        ];

        for (preset, fps, width, colors) in cases {
            assert_eq!(preset.fps(), *fps, "{} fps", preset.as_str());
            assert_eq!(preset.width(), *width, "{} width", preset.as_str());
            assert_eq!(preset.colors(), *colors, "{} colors", preset.as_str());
        }
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(QualityPreset::default(), QualityPreset::Medium);
    }

    #[test]
    fn test_preset_colors_in_palette_range() {
        for preset in [
            QualityPreset::Low,
            QualityPreset::Medium,
            QualityPreset::High,
            QualityPreset::Max,
        ] {
            let colors = preset.colors();
            assert!((2..=256).contains(&colors), "{}", preset.as_str());
        }
    }

    #[test]
    fn test_descriptions_non_empty() {
        for preset in [
            QualityPreset::Low,
            QualityPreset::Medium,
            QualityPreset::High,
            QualityPreset::Max,
        ] {
            assert!(!preset.description().is_empty());
        }
    }
}
