//! The three linking strategies, strongest first.
//!
//! Each tier returns `None` when it cannot commit to a target, letting the
//! caller fall through to the next one.

use super::{DimensionLineTier, ExtensionLineTier, ProximityTier};
use crate::ir::{BoundingBox, GeometryLine, LinkMethod, Orientation, Point, SymbolNode};

/// A successful tier outcome.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TierHit<'a> {
    pub symbol: &'a SymbolNode,
    pub method: LinkMethod,
    pub confidence: f64,
    pub direction: Option<Orientation>,
    pub notes: String,
}

/// Text orientation of a dimension: horizontal when wider than tall.
pub(crate) fn text_orientation(bbox: &BoundingBox) -> Orientation {
    if bbox.is_horizontal() {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    }
}

/// Offset of a line from `center`, measured across the line's axis.
fn cross_axis_offset(line: &GeometryLine, center: Point, axis: Orientation) -> f64 {
    let mid = line.midpoint();
    match axis {
        Orientation::Horizontal => (mid.y - center.y).abs(),
        Orientation::Vertical => (mid.x - center.x).abs(),
    }
}

/// Tier 1: trace the dimension line running alongside the text, then find
/// the symbol lined up with it.
pub(crate) fn dimension_line<'a>(
    bbox: &BoundingBox,
    symbols: &'a [SymbolNode],
    lines: &[GeometryLine],
    cfg: &DimensionLineTier,
) -> Option<TierHit<'a>> {
    let center = bbox.center();
    let orientation = text_orientation(bbox);

    let mut best: Option<(&GeometryLine, f64, f64)> = None;
    for line in lines {
        if line.distance_to_point(center) > cfg.search_radius {
            continue;
        }
        let length = line.length();
        if length < cfg.min_line_length {
            continue;
        }
        if line.orientation(cfg.angle_tolerance_deg) != Some(orientation) {
            continue;
        }
        let offset = cross_axis_offset(line, center, orientation);
        if offset > cfg.line_offset_tolerance {
            continue;
        }
        let score = length / (offset + 1.0);
        if best.map_or(true, |(_, best_score, _)| score > best_score) {
            best = Some((line, score, offset));
        }
    }

    let (line, _, offset) = best?;
    let direction = line.dominant_axis();

    // A horizontal dimension line measures along x, so the feature sits on
    // the same vertical band as the text.
    let symbol = symbols
        .iter()
        .filter_map(|s| {
            let sc = s.bbox.center();
            let misalignment = match direction {
                Orientation::Horizontal => (sc.x - center.x).abs(),
                Orientation::Vertical => (sc.y - center.y).abs(),
            };
            let distance = sc.distance(center);
            (misalignment <= cfg.symbol_alignment_tolerance
                && distance <= cfg.symbol_search_radius)
                .then_some((s, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| s)?;

    Some(TierHit {
        symbol,
        method: LinkMethod::DimensionLine,
        confidence: cfg.confidence,
        direction: Some(direction),
        notes: format!(
            "dimension line {} ({:.1} px long, offset {:.1} px)",
            line.id,
            line.length(),
            offset
        ),
    })
}

/// Tier 2: follow extension lines perpendicular to the text towards a
/// symbol sitting at one of their endpoints.
pub(crate) fn extension_line<'a>(
    bbox: &BoundingBox,
    symbols: &'a [SymbolNode],
    lines: &[GeometryLine],
    cfg: &ExtensionLineTier,
) -> Option<TierHit<'a>> {
    if symbols.is_empty() {
        return None;
    }
    let center = bbox.center();
    let wanted = text_orientation(bbox).perpendicular();

    let mut candidates: Vec<(&GeometryLine, f64)> = lines
        .iter()
        .filter(|line| line.orientation(cfg.angle_tolerance_deg) == Some(wanted))
        .map(|line| (line, line.distance_to_point(center)))
        .filter(|(_, distance)| *distance <= cfg.search_radius)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    for (line, _) in candidates {
        for endpoint in line.endpoints() {
            for symbol in symbols {
                let gap = symbol.bbox.expanded(cfg.symbol_margin).distance_to_point(endpoint);
                if gap <= cfg.endpoint_distance {
                    return Some(TierHit {
                        symbol,
                        method: LinkMethod::ExtensionLine,
                        confidence: cfg.confidence,
                        direction: Some(wanted),
                        notes: format!(
                            "extension line {} ends {:.1} px from symbol",
                            line.id, gap
                        ),
                    });
                }
            }
        }
    }
    None
}

/// Tier 3: the nearest symbol by center distance, with confidence decaying
/// linearly in distance down to the floor.
pub(crate) fn proximity<'a>(
    bbox: &BoundingBox,
    symbols: &'a [SymbolNode],
    cfg: &ProximityTier,
) -> Result<TierHit<'a>, String> {
    let center = bbox.center();
    let (symbol, distance) = symbols
        .iter()
        .map(|s| (s, s.bbox.center().distance(center)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| "no symbols on drawing".to_string())?;

    if distance > cfg.max_distance {
        return Err(format!(
            "nearest symbol {} is {:.1} px away (limit {:.1})",
            symbol.id, distance, cfg.max_distance
        ));
    }

    Ok(TierHit {
        symbol,
        method: LinkMethod::Proximity,
        confidence: cfg.confidence_at(distance),
        direction: None,
        notes: format!("nearest symbol at {:.1} px", distance),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(id: &str, cx: f64, cy: f64) -> SymbolNode {
        SymbolNode::new(
            id,
            "hole",
            BoundingBox::new(cx - 10.0, cy - 10.0, cx + 10.0, cy + 10.0),
        )
    }

    fn hline(id: &str, x1: f64, x2: f64, y: f64) -> GeometryLine {
        GeometryLine::new(id, Point::new(x1, y), Point::new(x2, y))
    }

    #[test]
    fn dimension_line_prefers_long_close_lines() {
        let text = BoundingBox::new(90.0, 90.0, 130.0, 110.0);
        let lines = vec![
            hline("short", 80.0, 110.0, 95.0),
            hline("long", 20.0, 200.0, 88.0),
            hline("far", 20.0, 200.0, 160.0),
        ];
        let symbols = vec![symbol("s1", 110.0, 250.0)];
        let hit = dimension_line(&text, &symbols, &lines, &DimensionLineTier::default())
            .expect("tier 1 hit");
        assert!(hit.notes.contains("long"));
        assert_eq!(hit.direction, Some(Orientation::Horizontal));
    }

    #[test]
    fn dimension_line_ignores_misaligned_symbols() {
        let text = BoundingBox::new(90.0, 90.0, 130.0, 110.0);
        let lines = vec![hline("l1", 20.0, 200.0, 85.0)];
        let symbols = vec![symbol("s1", 400.0, 100.0)];
        assert!(dimension_line(&text, &symbols, &lines, &DimensionLineTier::default()).is_none());
    }

    #[test]
    fn extension_line_endpoint_touches_symbol() {
        let text = BoundingBox::new(90.0, 90.0, 130.0, 110.0);
        let lines = vec![GeometryLine::new(
            "ext",
            Point::new(150.0, 100.0),
            Point::new(150.0, 190.0),
        )];
        let symbols = vec![symbol("s1", 150.0, 205.0)];
        let hit = extension_line(&text, &symbols, &lines, &ExtensionLineTier::default())
            .expect("tier 2 hit");
        assert_eq!(hit.symbol.id.as_str(), "s1");
        assert_eq!(hit.method, LinkMethod::ExtensionLine);
        assert_eq!(hit.confidence, 0.85);
    }

    fn vline(id: &str, x: f64, y1: f64, y2: f64) -> GeometryLine {
        GeometryLine::new(id, Point::new(x, y1), Point::new(x, y2))
    }

    #[test]
    fn vertical_dimension_follows_vertical_line() {
        // Taller than wide, centered at (100, 110).
        let text = BoundingBox::new(90.0, 90.0, 110.0, 130.0);
        let lines = vec![
            hline("across", 20.0, 200.0, 112.0),
            vline("v1", 95.0, 20.0, 200.0),
        ];
        let symbols = vec![symbol("below", 100.0, 300.0), symbol("side", 250.0, 112.0)];
        let hit = dimension_line(&text, &symbols, &lines, &DimensionLineTier::default())
            .expect("tier 1 hit");
        assert_eq!(hit.symbol.id.as_str(), "side");
        assert_eq!(hit.direction, Some(Orientation::Vertical));
        assert!(hit.notes.contains("v1"));
        assert_eq!(hit.confidence, 0.95);
    }

    #[test]
    fn vertical_dimension_rejects_line_off_axis() {
        let text = BoundingBox::new(90.0, 90.0, 110.0, 130.0);
        // Vertical, but 60 px to the side of the text center.
        let lines = vec![vline("v_far", 160.0, 20.0, 200.0)];
        let symbols = vec![symbol("side", 250.0, 112.0)];
        assert!(dimension_line(&text, &symbols, &lines, &DimensionLineTier::default()).is_none());
    }

    #[test]
    fn vertical_dimension_uses_horizontal_extension_lines() {
        let text = BoundingBox::new(90.0, 90.0, 110.0, 130.0);
        let lines = vec![
            // Closer, but parallel to the text, so not an extension line.
            vline("parallel", 100.0, 140.0, 200.0),
            hline("ext", 110.0, 200.0, 110.0),
        ];
        let symbols = vec![symbol("under", 100.0, 215.0), symbol("right", 215.0, 110.0)];
        let hit = extension_line(&text, &symbols, &lines, &ExtensionLineTier::default())
            .expect("tier 2 hit");
        assert_eq!(hit.symbol.id.as_str(), "right");
        assert_eq!(hit.direction, Some(Orientation::Horizontal));
        assert!(hit.notes.contains("ext"));
    }

    #[test]
    fn proximity_confidence_decays_with_distance() {
        let text = BoundingBox::new(0.0, 0.0, 20.0, 10.0);
        let cfg = ProximityTier::default();
        let near = [symbol("s1", 10.0, 5.0)];
        let hit = proximity(&text, &near, &cfg).expect("near symbol");
        assert!((hit.confidence - 0.60).abs() < 1e-9);

        let mid = [symbol("s1", 160.0, 5.0)];
        let hit = proximity(&text, &mid, &cfg).expect("mid symbol");
        assert!((hit.confidence - 0.45).abs() < 1e-9);

        let far = [symbol("s1", 410.0, 5.0)];
        assert!(proximity(&text, &far, &cfg).is_err());
        assert!(proximity(&text, &[], &cfg).is_err());
    }
}
