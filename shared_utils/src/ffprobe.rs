//! FFprobe wrapper module
//!
//! Shared FFprobe functionality for source video analysis.
//! Used by vid-gif to pick frame-rate defaults and detect short clips.

use std::path::Path;
use std::process::Command;

/// Duration of the video in seconds, `None` if ffprobe is missing or
/// the file cannot be analyzed.
pub fn get_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            "--",
            path.to_str()?,
        ])
        .output()
        .ok()?;

    if output.status.success() {
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .ok()
    } else {
        None
    }
}

/// Frame rate of the first video stream, `None` if ffprobe is missing,
/// the file cannot be analyzed, or it has no video stream.
pub fn get_frame_rate(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "--",
            path.to_str()?,
        ])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&json_str).ok()?;

    let streams = json["streams"].as_array()?;
    let video_stream = streams
        .iter()
        .find(|s| s["codec_type"].as_str() == Some("video"))?;

    Some(parse_frame_rate(
        video_stream["r_frame_rate"].as_str().unwrap_or("0/1"),
    ))
}

const FALLBACK_FRAME_RATE: f64 = 24.0;

pub fn parse_frame_rate(s: &str) -> f64 {
    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 2 {
            let num = parts[0].parse::<f64>().unwrap_or(0.0);
            let den = parts[1].parse::<f64>().unwrap_or(0.0);
            if den > 0.0 {
                let rate = num / den;
                if rate > 0.0 {
                    return rate;
                }
            }
        }
    }
    match s.parse::<f64>() {
        Ok(v) if v > 0.0 => v,
        _ => {
            if !s.is_empty() && s != "0" && s != "0/1" {
                eprintln!(
                    "⚠️ [ffprobe] Failed to parse frame rate '{}', using fallback {}fps",
                    s, FALLBACK_FRAME_RATE
                );
            }
            FALLBACK_FRAME_RATE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        let cases: &[(&str, f64, f64)] = &[
            ("30/1", 30.0, 0.001),
            ("24/1", 24.0, 0.001),
            ("60/1", 60.0, 0.001),
            ("25/1", 25.0, 0.001),
            ("30000/1001", 30000.0 / 1001.0, 0.0001),
            ("24000/1001", 24000.0 / 1001.0, 0.0001),
            ("60000/1001", 60000.0 / 1001.0, 0.0001),
            ("15", 15.0, 0.001),
            ("29.97", 29.97, 0.01),
            ("50/1", 50.0, 0.001),
            ("120/1", 120.0, 0.001),
        ];

        for (input, expected, tolerance) in cases {
            let result = parse_frame_rate(input);
            assert!(
                (result - expected).abs() < *tolerance,
                "parse_frame_rate({:?}): expected {}, got {}",
                input,
                expected,
                result
            );
        }
    }

    #[test]
    fn test_parse_frame_rate_edge_cases() {
        assert_eq!(parse_frame_rate("30/0"), FALLBACK_FRAME_RATE);
        assert_eq!(parse_frame_rate("invalid"), FALLBACK_FRAME_RATE);
        assert_eq!(parse_frame_rate(""), FALLBACK_FRAME_RATE);
        assert_eq!(parse_frame_rate("30/1/extra"), FALLBACK_FRAME_RATE);
        assert_eq!(parse_frame_rate("0/1"), FALLBACK_FRAME_RATE);
    }

    #[test]
    fn test_get_duration_missing_file() {
        // Either ffprobe is absent or the file does not exist; both are None
        assert_eq!(
            get_duration(Path::new("/nonexistent/definitely_not_here.mp4")),
            None
        );
    }

    #[test]
    fn test_get_frame_rate_missing_file() {
        assert_eq!(
            get_frame_rate(Path::new("/nonexistent/definitely_not_here.mp4")),
            None
        );
    }
}
