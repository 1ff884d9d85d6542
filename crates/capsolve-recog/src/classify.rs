//! Nearest-neighbor glyph classification
//!
//! A glyph is matched against every entry of a reference table with a
//! weighted L1 distance. The best match is accepted only if it passes the
//! confidence gate:
//!
//! - best distance `<= max_distance`, and
//! - runner-up distance minus best distance `>= min_gap`
//!
//! A code is read with one table at a time. The first ambiguous glyph
//! abandons the whole attempt and the next table is tried from the first
//! glyph; when the last table also hits an ambiguous glyph the characters
//! read so far are returned as a low-confidence result.

use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::params::ClassifyParams;
use crate::table::{ReferenceTable, ReferenceTables};
use crate::{RecogError, RecogResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weighted L1 distance between two feature vectors.
///
/// Symmetric in `a` and `b`.
pub fn weighted_distance(
    a: &FeatureVector,
    b: &FeatureVector,
    weights: &[f64; FEATURE_COUNT],
) -> f64 {
    a.values()
        .iter()
        .zip(b.values())
        .zip(weights)
        .map(|((x, y), w)| w * (x - y).abs())
        .sum()
}

/// A candidate character and its distance to the glyph
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Match {
    pub ch: char,
    pub distance: f64,
}

/// All table entries ordered by distance to `features`, nearest first.
///
/// Equal distances keep ascending character order.
pub fn rank(
    features: &FeatureVector,
    table: &ReferenceTable,
    weights: &[f64; FEATURE_COUNT],
) -> Vec<Match> {
    let mut matches: Vec<Match> = table
        .iter()
        .map(|(&ch, reference)| Match {
            ch,
            distance: weighted_distance(reference, features, weights),
        })
        .collect();
    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    matches
}

/// Outcome of classifying one glyph against one table
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlyphMatch {
    /// The best match passed the confidence gate
    Confident(Match),
    /// No trustworthy match; `best` is `None` only for an empty table
    Ambiguous {
        best: Option<Match>,
        second: Option<Match>,
    },
}

impl GlyphMatch {
    /// True if the glyph was classified confidently
    pub fn is_confident(&self) -> bool {
        matches!(self, GlyphMatch::Confident(_))
    }
}

/// Classify one glyph against one table.
///
/// A single-entry table has no runner-up, so only the distance limit
/// applies. An empty table never matches.
pub fn classify_glyph(
    features: &FeatureVector,
    table: &ReferenceTable,
    params: &ClassifyParams,
) -> GlyphMatch {
    let ranked = rank(features, table, &params.weights);
    let best = ranked.first().copied();
    let second = ranked.get(1).copied();

    let Some(b) = best else {
        return GlyphMatch::Ambiguous { best, second };
    };
    let too_far = b.distance > params.max_distance;
    let too_close = second.is_some_and(|s| s.distance - b.distance < params.min_gap);

    if too_far || too_close {
        GlyphMatch::Ambiguous { best, second }
    } else {
        GlyphMatch::Confident(b)
    }
}

/// Kind tag of a [`SolveResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultKind {
    Success,
    LowConfidence,
    InvalidLength,
}

/// Outcome of reading a code
///
/// Serializes as `{"type": "Success", "value": "AB12CD"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TaggedResult", from = "TaggedResult")]
pub enum SolveResult {
    /// Every glyph was read confidently and the count is right
    Success { text: String },
    /// Reading stopped at an ambiguous glyph
    LowConfidence { partial_text: String },
    /// Every glyph was read confidently but the count is wrong
    InvalidLength { partial_text: String },
}

impl SolveResult {
    /// The characters read, complete or not
    pub fn text(&self) -> &str {
        match self {
            SolveResult::Success { text } => text,
            SolveResult::LowConfidence { partial_text }
            | SolveResult::InvalidLength { partial_text } => partial_text,
        }
    }

    /// Kind tag
    pub fn kind(&self) -> ResultKind {
        match self {
            SolveResult::Success { .. } => ResultKind::Success,
            SolveResult::LowConfidence { .. } => ResultKind::LowConfidence,
            SolveResult::InvalidLength { .. } => ResultKind::InvalidLength,
        }
    }

    /// True for [`SolveResult::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, SolveResult::Success { .. })
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveResult::Success { text } => write!(f, "{}", text),
            SolveResult::LowConfidence { partial_text } => {
                write!(f, "low confidence (read {:?})", partial_text)
            }
            SolveResult::InvalidLength { partial_text } => {
                write!(f, "invalid length (read {:?})", partial_text)
            }
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TaggedResult {
    #[serde(rename = "type")]
    kind: ResultKind,
    value: String,
}

impl From<SolveResult> for TaggedResult {
    fn from(result: SolveResult) -> Self {
        let kind = result.kind();
        let value = match result {
            SolveResult::Success { text } => text,
            SolveResult::LowConfidence { partial_text }
            | SolveResult::InvalidLength { partial_text } => partial_text,
        };
        TaggedResult { kind, value }
    }
}

impl From<TaggedResult> for SolveResult {
    fn from(tagged: TaggedResult) -> Self {
        match tagged.kind {
            ResultKind::Success => SolveResult::Success { text: tagged.value },
            ResultKind::LowConfidence => SolveResult::LowConfidence {
                partial_text: tagged.value,
            },
            ResultKind::InvalidLength => SolveResult::InvalidLength {
                partial_text: tagged.value,
            },
        }
    }
}

/// A [`SolveResult`] together with how it was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub result: SolveResult,
    /// Name of the table that produced `result`
    pub table: String,
    /// Number of tables tried
    pub attempts: usize,
    /// Number of glyphs segmented from the image
    pub glyphs: usize,
}

/// Read a sequence of glyph features, trying each table in order.
///
/// The reported text never exceeds `code_length` characters; a glyph
/// count above `code_length` is still reported as `InvalidLength` and the
/// real count is kept in [`SolveReport::glyphs`].
///
/// # Errors
/// Returns [`RecogError::InvalidTable`] if `tables` is empty.
pub fn classify_sequence(
    features: &[FeatureVector],
    tables: &ReferenceTables,
    params: &ClassifyParams,
    code_length: usize,
) -> RecogResult<SolveReport> {
    let count = tables.len();
    for (attempt, table) in tables.iter().enumerate() {
        debug!(
            "attempt {} with {} table ({} glyphs)",
            attempt + 1,
            table.name(),
            features.len()
        );

        let mut text = String::new();
        let mut ambiguous = false;
        for (i, f) in features.iter().enumerate() {
            match classify_glyph(f, table, params) {
                GlyphMatch::Confident(m) => {
                    debug!("glyph {}: {:?} at distance {:.3}", i, m.ch, m.distance);
                    text.push(m.ch);
                }
                GlyphMatch::Ambiguous { best, second } => {
                    debug!(
                        "glyph {}: ambiguous in {} table (best {:?}, second {:?})",
                        i,
                        table.name(),
                        best,
                        second
                    );
                    ambiguous = true;
                    break;
                }
            }
        }

        let text: String = text.chars().take(code_length).collect();
        let result = if ambiguous {
            if attempt + 1 < count {
                continue;
            }
            SolveResult::LowConfidence { partial_text: text }
        } else if features.len() == code_length {
            SolveResult::Success { text }
        } else {
            SolveResult::InvalidLength { partial_text: text }
        };

        return Ok(SolveReport {
            result,
            table: table.name().to_string(),
            attempts: attempt + 1,
            glyphs: features.len(),
        });
    }

    Err(RecogError::InvalidTable(
        "no reference tables to classify with".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: [f64; FEATURE_COUNT] = [1.0, 2.0, 2.0, 2.0, 4.0, 3.0, 3.0, 3.0, 3.0];

    fn fv(first: f64) -> FeatureVector {
        let mut v = [0.0; FEATURE_COUNT];
        v[0] = first;
        FeatureVector::new(v)
    }

    fn table(name: &str, entries: &[(char, f64)]) -> ReferenceTable {
        entries
            .iter()
            .fold(ReferenceTable::new(name), |t, &(ch, x)| t.with_entry(ch, fv(x)))
    }

    #[test]
    fn test_weighted_distance() {
        let a = FeatureVector::new([1.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 2.0]);
        let b = FeatureVector::new([0.0, 0.0, 1.0, 0.0, 12.0, 0.0, 0.0, 0.0, 0.0]);
        // 1*1 + 2*1 + 4*2 + 3*2
        assert_eq!(weighted_distance(&a, &b, &W), 17.0);
        assert_eq!(weighted_distance(&b, &a, &W), 17.0);
        assert_eq!(weighted_distance(&a, &a, &W), 0.0);
    }

    #[test]
    fn test_rank_orders_and_breaks_ties_by_char() {
        let t = table("t", &[('c', 10.0), ('a', 0.0), ('b', 25.0), ('d', 0.0)]);
        let ranked = rank(&fv(10.0), &t, &W);
        let order: String = ranked.iter().map(|m| m.ch).collect();
        assert_eq!(order, "cadb");
        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(ranked[1].distance, 10.0);
    }

    #[test]
    fn test_confidence_gate() {
        let p = ClassifyParams::default();
        let t = table("t", &[('a', 0.0), ('b', 5.0), ('c', 50.0)]);

        // gap exactly 5 is accepted
        assert_eq!(
            classify_glyph(&fv(0.0), &t, &p),
            GlyphMatch::Confident(Match { ch: 'a', distance: 0.0 })
        );
        // gap below 5
        assert!(!classify_glyph(&fv(1.0), &t, &p).is_confident());
        // a tie is always ambiguous
        assert!(!classify_glyph(&fv(2.5), &t, &p).is_confident());
        // best distance above 100
        assert!(!classify_glyph(&fv(-150.0), &t, &p).is_confident());
        // best distance exactly 100 is accepted
        assert!(classify_glyph(&fv(-100.0), &t, &p).is_confident());
    }

    #[test]
    fn test_single_and_empty_tables() {
        let p = ClassifyParams::default();
        let single = table("one", &[('z', 0.0)]);
        assert!(classify_glyph(&fv(3.0), &single, &p).is_confident());
        assert!(!classify_glyph(&fv(300.0), &single, &p).is_confident());

        let empty = ReferenceTable::new("empty");
        assert_eq!(
            classify_glyph(&fv(0.0), &empty, &p),
            GlyphMatch::Ambiguous {
                best: None,
                second: None
            }
        );
    }

    #[test]
    fn test_sequence_success_and_lengths() {
        let p = ClassifyParams::default();
        let tables = ReferenceTables::new().with_table(table("bold", &[('a', 0.0), ('b', 20.0)]));
        let glyphs = [fv(0.0), fv(20.0), fv(0.0)];

        let report = classify_sequence(&glyphs, &tables, &p, 3).unwrap();
        assert_eq!(report.result, SolveResult::Success { text: "aba".into() });
        assert_eq!((report.table.as_str(), report.attempts), ("bold", 1));

        let report = classify_sequence(&glyphs[..2], &tables, &p, 3).unwrap();
        assert_eq!(
            report.result,
            SolveResult::InvalidLength {
                partial_text: "ab".into()
            }
        );

        let report = classify_sequence(&glyphs, &tables, &p, 2).unwrap();
        assert_eq!(report.result.text(), "ab");
        assert_eq!(report.result.kind(), ResultKind::InvalidLength);
        assert_eq!(report.glyphs, 3);
    }

    #[test]
    fn test_sequence_falls_back_per_image() {
        let p = ClassifyParams::default();
        let bold = table("bold", &[('a', 0.0), ('b', 20.0), ('x', 41.0), ('y', 43.0)]);
        let slim = table("slim", &[('A', 0.0), ('B', 20.0), ('X', 42.0)]);
        let tables = ReferenceTables::bold_slim(bold, slim);

        // third glyph is ambiguous in bold (x/y), resolved in slim
        let glyphs = [fv(0.0), fv(20.0), fv(42.0)];
        let report = classify_sequence(&glyphs, &tables, &p, 3).unwrap();
        assert_eq!(report.result, SolveResult::Success { text: "ABX".into() });
        assert_eq!((report.table.as_str(), report.attempts), ("slim", 2));
    }

    #[test]
    fn test_sequence_low_confidence_on_last_table() {
        let p = ClassifyParams::default();
        let bold = table("bold", &[('a', 0.0), ('b', 20.0), ('x', 41.0), ('y', 43.0)]);
        let slim = table("slim", &[('A', 0.0), ('B', 20.0), ('X', 41.0), ('Y', 43.0)]);
        let tables = ReferenceTables::bold_slim(bold, slim);

        let glyphs = [fv(0.0), fv(20.0), fv(42.0), fv(0.0)];
        let report = classify_sequence(&glyphs, &tables, &p, 4).unwrap();
        assert_eq!(
            report.result,
            SolveResult::LowConfidence {
                partial_text: "AB".into()
            }
        );
        assert_eq!(report.table, "slim");
    }

    #[test]
    fn test_sequence_without_tables() {
        let err = classify_sequence(&[fv(0.0)], &ReferenceTables::new(), &ClassifyParams::default(), 6);
        assert!(matches!(err, Err(RecogError::InvalidTable(_))));
    }

    #[test]
    fn test_result_serialization() {
        let r = SolveResult::LowConfidence {
            partial_text: "AB".into(),
        };
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"type":"LowConfidence","value":"AB"}"#);
        let back: SolveResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert_eq!(
            SolveResult::Success { text: "Q1W2E3".into() }.to_string(),
            "Q1W2E3"
        );
    }
}
