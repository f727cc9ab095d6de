use crate::error::{Result, SizelockError};

/// Output dimensions computed from a resolution label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Parse a resolution label like `480p` into its target value.
pub fn parse_label(label: &str) -> Result<u32> {
    let value = label
        .strip_suffix('p')
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            SizelockError::Config(format!(
                "Invalid resolution '{}'. Expected a value like 480p",
                label
            ))
        })?;
    Ok(value)
}

/// Scale source dimensions so the longer dimension hits the label value.
///
/// The shorter dimension is scaled proportionally and both dimensions are
/// rounded down to even, as required by 4:2:0 chroma subsampling.
pub fn scale(label: &str, source_width: u32, source_height: u32) -> Result<Resolution> {
    let target = parse_label(label)?;
    if source_width == 0 || source_height == 0 {
        return Err(SizelockError::Probe(format!(
            "Invalid source dimensions {}x{}",
            source_width, source_height
        )));
    }

    let (width, height) = if source_width > source_height {
        let scaled = (source_height as f64 * target as f64 / source_width as f64).round() as u32;
        (target, scaled)
    } else if source_height > source_width {
        let scaled = (source_width as f64 * target as f64 / source_height as f64).round() as u32;
        (scaled, target)
    } else {
        (target, target)
    };

    Ok(Resolution {
        width: force_even(width),
        height: force_even(height),
    })
}

fn force_even(value: u32) -> u32 {
    (value & !1).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("480p").unwrap(), 480);
        assert_eq!(parse_label("1080p").unwrap(), 1080);
        assert!(parse_label("480").is_err());
        assert!(parse_label("p").is_err());
        assert!(parse_label("0p").is_err());
        assert!(parse_label("abc").is_err());
    }

    #[test]
    fn test_landscape_targets_width() {
        let r = scale("480p", 1920, 1080).unwrap();
        assert_eq!(r, Resolution { width: 480, height: 270 });
    }

    #[test]
    fn test_portrait_targets_height() {
        let r = scale("480p", 1080, 1920).unwrap();
        assert_eq!(r, Resolution { width: 270, height: 480 });
    }

    #[test]
    fn test_square_source() {
        let r = scale("481p", 720, 720).unwrap();
        assert_eq!(r, Resolution { width: 480, height: 480 });
    }

    #[test]
    fn test_dimensions_always_even_and_positive() {
        for (w, h) in [(1919, 1079), (853, 480), (640, 361), (3, 5), (7, 7)] {
            let r = scale("479p", w, h).unwrap();
            assert_eq!(r.width % 2, 0, "{}x{}", w, h);
            assert_eq!(r.height % 2, 0, "{}x{}", w, h);
            assert!(r.width > 0 && r.height > 0, "{}x{}", w, h);
        }
    }

    #[test]
    fn test_aspect_ratio_preserved_within_even_rounding() {
        let r = scale("720p", 1920, 1080).unwrap();
        let exact = 1080.0 * 720.0 / 1920.0;
        assert!((r.height as f64 - exact).abs() <= 1.0);
        assert_eq!(r.width, 720);
    }
}
