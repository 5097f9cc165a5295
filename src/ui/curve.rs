//! Text rendering of the tempo curve, the progress ring and the pulse.

use crate::config::SessionConfig;
use crate::curve::TempoCurve;

/// Vertical scale of the drawn curve, in BPM.
pub const SCALE_MIN_BPM: f64 = 10.0;
pub const SCALE_MAX_BPM: f64 = 150.0;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CURSOR: char = '◆';
const RING: [char; 5] = ['○', '◔', '◑', '◕', '●'];
const PULSE: [char; 4] = ['·', '○', '◉', '●'];

/// Maps `bpm` onto `0..levels`, clamping to the drawing scale.
pub fn bpm_to_level(bpm: f64, levels: usize) -> usize {
    if levels == 0 {
        return 0;
    }
    let clamped = bpm.clamp(SCALE_MIN_BPM, SCALE_MAX_BPM);
    let t = (clamped - SCALE_MIN_BPM) / (SCALE_MAX_BPM - SCALE_MIN_BPM);
    ((t * (levels - 1) as f64).round() as usize).min(levels - 1)
}

/// One row of block characters tracing the curve, with the cursor drawn at
/// `progress` (or no cursor when `None`).
pub fn render_curve(config: &SessionConfig, width: usize, progress: Option<f64>) -> String {
    let curve = TempoCurve::sample(config, width);
    let cursor = progress.and_then(|p| curve.index_at(p));

    curve
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &bpm)| {
            if Some(i) == cursor {
                CURSOR
            } else {
                LEVELS[bpm_to_level(bpm, LEVELS.len())]
            }
        })
        .collect()
}

/// Ring that fills clockwise as the session progresses.
pub fn ring_glyph(fraction: f64) -> char {
    let last = RING.len() - 1;
    let index = (fraction.clamp(0.0, 1.0) * last as f64).floor() as usize;
    RING[index.min(last)]
}

/// Pulse glyph for an intensity in `[0, 1]` (1 right after a tick).
pub fn pulse_glyph(intensity: f64) -> char {
    let last = PULSE.len() - 1;
    let index = (intensity.clamp(0.0, 1.0) * last as f64).ceil() as usize;
    PULSE[index.min(last)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_to_level_is_clamped() {
        assert_eq!(bpm_to_level(0.0, 8), 0);
        assert_eq!(bpm_to_level(10.0, 8), 0);
        assert_eq!(bpm_to_level(150.0, 8), 7);
        assert_eq!(bpm_to_level(200.0, 8), 7);
        assert_eq!(bpm_to_level(80.0, 8), 4);
        assert_eq!(bpm_to_level(80.0, 0), 0);
    }

    #[test]
    fn test_curve_has_valley_and_cursor() {
        let config = SessionConfig::default();
        let line = render_curve(&config, 21, Some(0.0));
        let chars: Vec<char> = line.chars().collect();
        assert_eq!(chars.len(), 21);
        assert_eq!(chars[0], CURSOR);
        assert_eq!(chars[10], '▁');

        let no_cursor = render_curve(&config, 21, None);
        assert!(!no_cursor.contains(CURSOR));
    }

    #[test]
    fn test_ring_and_pulse_glyphs() {
        assert_eq!(ring_glyph(0.0), '○');
        assert_eq!(ring_glyph(0.5), '◑');
        assert_eq!(ring_glyph(1.0), '●');
        assert_eq!(pulse_glyph(0.0), '·');
        assert_eq!(pulse_glyph(1.0), '●');
    }
}
