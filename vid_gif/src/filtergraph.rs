//! Filter-graph construction
//!
//! Translates a [`GifConfig`] into the FFmpeg filter chains for the
//! two-pass GIF encode. Chains are built as typed stage lists and only
//! rendered to FFmpeg's textual filter syntax at the invocation
//! boundary, keeping stage selection and ordering separate from syntax.
//!
//! Stage order is fixed: trim (with timestamp reset) before the
//! frame-rate stage, frame rate before scaling, scaling before the
//! palette stage.

use crate::config::{GifConfig, DEFAULT_FPS};

/// Which of the two encode passes a chain is built for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterMode {
    /// Pass 1: analyze frames, emit a palette image.
    PaletteGen,
    /// Pass 2: map frames through the generated palette.
    PaletteUse,
}

/// One stage of a filter chain.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterStage {
    /// Time window selection; at least one bound is set.
    Trim { start: Option<f64>, end: Option<f64> },
    /// Restart presentation timestamps at zero after a trim.
    ResetPts,
    /// Frame-rate conversion.
    Fps { fps: u32 },
    /// Aspect-preserving Lanczos scale; height is computed by the
    /// encoder and forced even.
    Scale { width: u32 },
    /// Palette generation with per-frame-difference statistics.
    PaletteGen { max_colors: u16 },
    /// Palette application with ordered bayer dithering at fixed
    /// strength 5.
    PaletteUse,
}

impl FilterStage {
    pub fn serialize(&self) -> String {
        match self {
            FilterStage::Trim { start, end } => {
                let mut parts = Vec::new();
                if let Some(start) = start {
                    parts.push(format!("start={}", start));
                }
                if let Some(end) = end {
                    parts.push(format!("end={}", end));
                }
                format!("trim={}", parts.join(":"))
            }
            FilterStage::ResetPts => "setpts=PTS-STARTPTS".to_string(),
            FilterStage::Fps { fps } => format!("fps={}", fps),
            FilterStage::Scale { width } => format!("scale={}:-2:flags=lanczos", width),
            FilterStage::PaletteGen { max_colors } => {
                format!("palettegen=max_colors={}:stats_mode=diff", max_colors)
            }
            FilterStage::PaletteUse => "paletteuse=dither=bayer:bayer_scale=5".to_string(),
        }
    }
}

/// Ordered filter chain for one encode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    mode: FilterMode,
    stages: Vec<FilterStage>,
}

impl FilterChain {
    /// Builds the chain for `mode`. Pure: no I/O, fully determined by
    /// the configuration.
    pub fn build(config: &GifConfig, mode: FilterMode) -> Self {
        let mut stages = Vec::new();

        if config.start.is_some() || config.end.is_some() {
            stages.push(FilterStage::Trim {
                start: config.start,
                end: config.end,
            });
            stages.push(FilterStage::ResetPts);
        }

        stages.push(FilterStage::Fps {
            fps: config.fps.unwrap_or(DEFAULT_FPS),
        });

        if let Some(width) = config.width {
            stages.push(FilterStage::Scale { width });
        }

        match mode {
            FilterMode::PaletteGen => stages.push(FilterStage::PaletteGen {
                max_colors: config.colors,
            }),
            FilterMode::PaletteUse => stages.push(FilterStage::PaletteUse),
        }

        Self { mode, stages }
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Number of encoder inputs the chain consumes: the source stream,
    /// plus the palette image in palette-application mode.
    pub fn input_count(&self) -> usize {
        match self.mode {
            FilterMode::PaletteGen => 1,
            FilterMode::PaletteUse => 2,
        }
    }

    /// Renders the chain in FFmpeg filter syntax.
    ///
    /// The palette-application chain labels the filtered stream `[x]`
    /// and feeds it together with the palette input `[1:v]` into
    /// paletteuse.
    pub fn to_filter_arg(&self) -> String {
        match self.mode {
            FilterMode::PaletteGen => self
                .stages
                .iter()
                .map(FilterStage::serialize)
                .collect::<Vec<_>>()
                .join(","),
            FilterMode::PaletteUse => {
                let filtered = self
                    .stages
                    .iter()
                    .filter(|s| !matches!(s, FilterStage::PaletteUse))
                    .map(FilterStage::serialize)
                    .collect::<Vec<_>>()
                    .join(",");
                format!(
                    "{}[x];[x][1:v]{}",
                    filtered,
                    FilterStage::PaletteUse.serialize()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::QualityPreset;

    fn base_config() -> GifConfig {
        GifConfig::from_preset(QualityPreset::Medium)
    }

    #[test]
    fn test_no_trim_bounds_no_trim_stage() {
        let config = base_config();
        let chain = FilterChain::build(&config, FilterMode::PaletteGen);

        assert!(!chain
            .stages()
            .iter()
            .any(|s| matches!(s, FilterStage::Trim { .. })));
        assert!(!chain
            .stages()
            .iter()
            .any(|s| matches!(s, FilterStage::ResetPts)));
    }

    #[test]
    fn test_trim_start_only() {
        let mut config = base_config();
        config.start = Some(1.5);

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        let trim = &chain.stages()[0];

        assert_eq!(
            *trim,
            FilterStage::Trim {
                start: Some(1.5),
                end: None
            }
        );
        assert_eq!(trim.serialize(), "trim=start=1.5");
        assert_eq!(chain.stages()[1], FilterStage::ResetPts);
    }

    #[test]
    fn test_trim_end_only() {
        let mut config = base_config();
        config.end = Some(4.0);

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        let trim = &chain.stages()[0];

        assert_eq!(trim.serialize(), "trim=end=4");
    }

    #[test]
    fn test_trim_both_bounds() {
        let mut config = base_config();
        config.start = Some(1.5);
        config.end = Some(4.0);

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        assert_eq!(chain.stages()[0].serialize(), "trim=start=1.5:end=4");
    }

    #[test]
    fn test_fps_defaults_when_unset() {
        let mut config = base_config();
        config.fps = None;

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        assert!(chain
            .stages()
            .iter()
            .any(|s| *s == FilterStage::Fps { fps: DEFAULT_FPS }));
    }

    #[test]
    fn test_no_width_no_scale_stage() {
        let mut config = base_config();
        config.width = None;

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        assert!(!chain
            .stages()
            .iter()
            .any(|s| matches!(s, FilterStage::Scale { .. })));
    }

    #[test]
    fn test_scale_declares_even_auto_height() {
        let stage = FilterStage::Scale { width: 720 };
        assert_eq!(stage.serialize(), "scale=720:-2:flags=lanczos");
    }

    #[test]
    fn test_palette_gen_chain_ends_in_palette_stage() {
        let config = base_config();
        let chain = FilterChain::build(&config, FilterMode::PaletteGen);

        assert!(matches!(
            chain.stages().last(),
            Some(FilterStage::PaletteGen { .. })
        ));
        assert_eq!(chain.input_count(), 1);
    }

    #[test]
    fn test_palette_use_chain_consumes_two_inputs() {
        let config = base_config();
        let chain = FilterChain::build(&config, FilterMode::PaletteUse);

        assert!(matches!(
            chain.stages().last(),
            Some(FilterStage::PaletteUse)
        ));
        assert_eq!(chain.input_count(), 2);
    }

    #[test]
    fn test_stage_ordering() {
        let mut config = base_config();
        config.start = Some(0.5);
        config.end = Some(2.5);

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        let position = |pred: fn(&FilterStage) -> bool| {
            chain.stages().iter().position(pred).unwrap()
        };

        let trim = position(|s| matches!(s, FilterStage::Trim { .. }));
        let reset = position(|s| matches!(s, FilterStage::ResetPts));
        let fps = position(|s| matches!(s, FilterStage::Fps { .. }));
        let scale = position(|s| matches!(s, FilterStage::Scale { .. }));
        let palette = position(|s| matches!(s, FilterStage::PaletteGen { .. }));

        assert!(trim < reset);
        assert!(reset < fps);
        assert!(fps < scale);
        assert!(scale < palette);
    }

    #[test]
    fn test_palette_gen_filter_arg() {
        let mut config = base_config();
        config.start = Some(1.5);
        config.end = Some(4.0);

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        assert_eq!(
            chain.to_filter_arg(),
            "trim=start=1.5:end=4,setpts=PTS-STARTPTS,fps=15,\
             scale=720:-2:flags=lanczos,palettegen=max_colors=256:stats_mode=diff"
        );
    }

    #[test]
    fn test_palette_use_filter_arg() {
        let config = base_config();
        let chain = FilterChain::build(&config, FilterMode::PaletteUse);

        assert_eq!(
            chain.to_filter_arg(),
            "fps=15,scale=720:-2:flags=lanczos[x];[x][1:v]\
             paletteuse=dither=bayer:bayer_scale=5"
        );
    }

    #[test]
    fn test_minimal_chain_is_fps_plus_palette() {
        let mut config = base_config();
        config.width = None;

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        assert_eq!(chain.stages().len(), 2);
        assert_eq!(
            chain.to_filter_arg(),
            "fps=15,palettegen=max_colors=256:stats_mode=diff"
        );
    }

    #[test]
    fn test_custom_colors_in_palette_stage() {
        let mut config = base_config();
        config.colors = 128;
        config.width = None;

        let chain = FilterChain::build(&config, FilterMode::PaletteGen);
        assert!(chain.to_filter_arg().contains("max_colors=128"));
    }
}
