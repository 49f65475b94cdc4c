use crate::types::{ReasoningThresholds, SignalScores};

/// Location and category strings quoted in the explanation.
#[derive(Debug, Clone, Copy)]
pub struct ReasoningContext<'a> {
    pub new_location: &'a str,
    pub existing_location: &'a str,
    pub new_category: &'a str,
    pub existing_category: &'a str,
}

/// Build the human-readable explanation for a duplicate decision.
///
/// Fragments are emitted in a fixed order (text, location, category) and
/// joined with single spaces. When no signal crosses its display band, a
/// single sentence citing the overall score is returned instead.
pub fn build_reasoning(
    score: f32,
    signals: SignalScores,
    context: ReasoningContext<'_>,
    bands: &ReasoningThresholds,
) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);

    if signals.text >= bands.text_high {
        parts.push(format!(
            "The complaint description and title are highly similar ({}% text overlap).",
            whole_percent(signals.text)
        ));
    } else if signals.text >= bands.text_notable {
        parts.push(format!(
            "The complaint description shares notable similarity ({}%).",
            whole_percent(signals.text)
        ));
    }

    if signals.location >= bands.location_same {
        parts.push(format!(
            "Both complaints reference the same location area ({}).",
            context.existing_location
        ));
    } else if signals.location >= bands.location_nearby {
        parts.push(format!(
            "Locations appear to be nearby ({} vs {}).",
            context.new_location, context.existing_location
        ));
    }

    if signals.category {
        parts.push(format!(
            "Both complaints are categorized under '{}'.",
            context.new_category
        ));
    }

    if parts.is_empty() {
        return format!(
            "Overall similarity score of {}% exceeds the duplicate threshold.",
            whole_percent(score)
        );
    }
    parts.join(" ")
}

fn whole_percent(fraction: f32) -> i64 {
    (fraction * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: ReasoningContext<'static> = ReasoningContext {
        new_location: "Sector 5 Market",
        existing_location: "Sector 5 Main Market",
        new_category: "Roads",
        existing_category: "roads",
    };

    fn signals(text: f32, location: f32, category: bool) -> SignalScores {
        SignalScores {
            text,
            location,
            category,
        }
    }

    #[test]
    fn all_fragments_in_order() {
        let reasoning = build_reasoning(
            0.91,
            signals(0.92, 0.75, true),
            CONTEXT,
            &ReasoningThresholds::default(),
        );
        assert_eq!(
            reasoning,
            "The complaint description and title are highly similar (92% text overlap). \
             Both complaints reference the same location area (Sector 5 Main Market). \
             Both complaints are categorized under 'Roads'."
        );
    }

    #[test]
    fn medium_bands() {
        let reasoning = build_reasoning(
            0.5,
            signals(0.55, 0.4, false),
            CONTEXT,
            &ReasoningThresholds::default(),
        );
        assert_eq!(
            reasoning,
            "The complaint description shares notable similarity (55%). \
             Locations appear to be nearby (Sector 5 Market vs Sector 5 Main Market)."
        );
    }

    #[test]
    fn band_edges_are_inclusive() {
        let reasoning = build_reasoning(
            0.6,
            signals(0.70, 0.60, false),
            CONTEXT,
            &ReasoningThresholds::default(),
        );
        assert!(reasoning.starts_with("The complaint description and title are highly similar"));
        assert!(reasoning.contains("same location area"));
    }

    #[test]
    fn category_alone_suppresses_overall_sentence() {
        let reasoning = build_reasoning(
            0.1,
            signals(0.0, 0.0, true),
            CONTEXT,
            &ReasoningThresholds::default(),
        );
        assert_eq!(reasoning, "Both complaints are categorized under 'Roads'.");
    }

    #[test]
    fn overall_sentence_when_nothing_fires() {
        let reasoning = build_reasoning(
            0.27,
            signals(0.45, 0.0, false),
            CONTEXT,
            &ReasoningThresholds::default(),
        );
        assert_eq!(
            reasoning,
            "Overall similarity score of 27% exceeds the duplicate threshold."
        );
    }

    #[test]
    fn custom_bands_change_wording_only() {
        let bands = ReasoningThresholds {
            text_high: 0.95,
            ..Default::default()
        };
        let reasoning = build_reasoning(0.8, signals(0.9, 0.0, false), CONTEXT, &bands);
        assert_eq!(
            reasoning,
            "The complaint description shares notable similarity (90%)."
        );
    }
}
