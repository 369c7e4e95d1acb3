//! Pattern taxonomy: group -> subgroup -> ranked patterns.
//!
//! Built once at startup and shared read-only. A pattern may appear in more
//! than one place (engulfing is both a bullish and a bearish reversal).

use super::CandlePattern;
use crate::domain::ohlcv::PriceBar;
use serde::Serialize;

pub const WILDCARD: &str = "all";

#[derive(Debug, Clone, Serialize)]
pub struct RankedPattern {
    pub pattern: &'static str,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Subgroup {
    pub name: String,
    pub patterns: Vec<RankedPattern>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub name: String,
    pub subgroups: Vec<Subgroup>,
}

/// Where a pattern sits in the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub group: String,
    pub subgroup: String,
    pub rank: u32,
}

/// Which signal sign counts as an occurrence for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDirection {
    Bullish,
    Bearish,
    Any,
}

impl SignalDirection {
    pub fn for_group(group: &str) -> Self {
        match group.trim().to_ascii_lowercase().as_str() {
            "bullish" => SignalDirection::Bullish,
            "bearish" => SignalDirection::Bearish,
            _ => SignalDirection::Any,
        }
    }

    pub fn matches(self, signal: i32) -> bool {
        match self {
            SignalDirection::Bullish => signal > 0,
            SignalDirection::Bearish => signal < 0,
            SignalDirection::Any => signal != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSelection {
    pub patterns: Vec<CandlePattern>,
    pub direction: SignalDirection,
}

impl PatternSelection {
    /// True when any selected pattern fires in the last `period` bars
    /// (clamped to the series length) with the selection's direction.
    pub fn fires_within(&self, bars: &[PriceBar], period: usize) -> bool {
        let window = period.min(bars.len());
        self.patterns.iter().any(|pattern| {
            let signals = pattern.detect(bars);
            signals[signals.len() - window..]
                .iter()
                .any(|s| self.direction.matches(*s))
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternTaxonomy {
    groups: Vec<Group>,
}

impl PatternTaxonomy {
    pub fn standard() -> Self {
        use CandlePattern::*;

        let layout: [(&str, Vec<(&str, Vec<(CandlePattern, u32)>)>); 3] = [
            (
                "Bullish",
                vec![
                    (
                        "Reversal",
                        vec![
                            (ThreeWhiteSoldiers, 1),
                            (MorningStar, 2),
                            (MorningDojiStar, 3),
                            (Piercing, 4),
                            (Engulfing, 5),
                            (Hammer, 6),
                            (InvertedHammer, 7),
                            (LadderBottom, 8),
                            (Unique3River, 9),
                            (HomingPigeon, 10),
                            (MatchingLow, 11),
                            (ThreeInside, 12),
                            (ThreeOutside, 13),
                        ],
                    ),
                    (
                        "Continuation",
                        vec![
                            (MatHold, 1),
                            (RiseFallThreeMethods, 2),
                            (TasukiGap, 3),
                            (SeparatingLines, 4),
                        ],
                    ),
                ],
            ),
            (
                "Bearish",
                vec![
                    (
                        "Reversal",
                        vec![
                            (ThreeBlackCrows, 1),
                            (EveningStar, 2),
                            (EveningDojiStar, 3),
                            (Engulfing, 4),
                            (DarkCloudCover, 5),
                            (ShootingStar, 6),
                            (HangingMan, 7),
                            (IdenticalThreeCrows, 8),
                            (TwoCrows, 9),
                            (Harami, 10),
                            (HaramiCross, 11),
                            (ThreeInside, 12),
                            (ThreeOutside, 13),
                        ],
                    ),
                    (
                        "Continuation",
                        vec![
                            (RiseFallThreeMethods, 1),
                            (UpsideGapTwoCrows, 2),
                            (GapSideSideWhite, 3),
                            (Thrusting, 4),
                            (OnNeck, 5),
                            (InNeck, 6),
                        ],
                    ),
                ],
            ),
            (
                "Neutral",
                vec![
                    (
                        "Doji",
                        vec![
                            (Doji, 1),
                            (LongLeggedDoji, 2),
                            (DragonflyDoji, 3),
                            (GravestoneDoji, 4),
                            (RickshawMan, 5),
                        ],
                    ),
                    (
                        "Spinning / Range",
                        vec![(SpinningTop, 1), (ShortLine, 2), (LongLine, 3), (HighWave, 4)],
                    ),
                    ("Marubozu", vec![(Marubozu, 1)]),
                    ("Hikkake", vec![(Hikkake, 1), (HikkakeMod, 2)]),
                    (
                        "Side-by-Side / Gap Methods",
                        vec![(GapSideSideWhite, 1), (XSideGapThreeMethods, 2)],
                    ),
                    (
                        "Breakaway / Counterattack / Stalled",
                        vec![
                            (Breakaway, 1),
                            (Counterattack, 2),
                            (StalledPattern, 3),
                            (Takuri, 4),
                        ],
                    ),
                    (
                        "Tri-Star & Special",
                        vec![(Tristar, 1), (ConcealBabySwallow, 2)],
                    ),
                ],
            ),
        ];

        let groups = layout
            .into_iter()
            .map(|(group, subgroups)| Group {
                name: group.to_string(),
                subgroups: subgroups
                    .into_iter()
                    .map(|(subgroup, patterns)| Subgroup {
                        name: subgroup.to_string(),
                        patterns: patterns
                            .into_iter()
                            .map(|(p, rank)| RankedPattern {
                                pattern: p.name(),
                                rank,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Every place `pattern` appears, in taxonomy order.
    pub fn placements(&self, pattern: CandlePattern) -> Vec<Placement> {
        let mut found = Vec::new();
        for group in &self.groups {
            for subgroup in &group.subgroups {
                for ranked in &subgroup.patterns {
                    if ranked.pattern == pattern.name() {
                        found.push(Placement {
                            group: group.name.clone(),
                            subgroup: subgroup.name.clone(),
                            rank: ranked.rank,
                        });
                    }
                }
            }
        }
        found
    }

    /// Patterns matching a (group, subgroup, pattern) filter.
    ///
    /// Matching is case-insensitive, `all` is a wildcard at every level and
    /// pattern names may omit the `CDL` prefix. Returns `None` when nothing
    /// matches.
    pub fn select(&self, group: &str, subgroup: &str, pattern: &str) -> Option<PatternSelection> {
        let wanted_pattern = if is_wildcard(pattern) {
            None
        } else {
            Some(CandlePattern::from_name(pattern)?)
        };

        let mut patterns: Vec<CandlePattern> = Vec::new();
        let groups = self
            .groups
            .iter()
            .filter(|g| is_wildcard(group) || g.name.eq_ignore_ascii_case(group.trim()));
        for g in groups {
            let subgroups = g
                .subgroups
                .iter()
                .filter(|s| is_wildcard(subgroup) || s.name.eq_ignore_ascii_case(subgroup.trim()));
            for s in subgroups {
                for ranked in &s.patterns {
                    let Some(candidate) = CandlePattern::from_name(ranked.pattern) else {
                        continue;
                    };
                    if wanted_pattern.is_some_and(|w| w != candidate) {
                        continue;
                    }
                    if !patterns.contains(&candidate) {
                        patterns.push(candidate);
                    }
                }
            }
        }

        if patterns.is_empty() {
            return None;
        }
        Some(PatternSelection {
            patterns,
            direction: SignalDirection::for_group(group),
        })
    }
}

fn is_wildcard(level: &str) -> bool {
    level.trim().eq_ignore_ascii_case(WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_pattern_is_placed() {
        let taxonomy = PatternTaxonomy::standard();
        for pattern in CandlePattern::ALL {
            assert!(
                !taxonomy.placements(pattern).is_empty(),
                "{} missing from taxonomy",
                pattern
            );
        }
    }

    #[test]
    fn engulfing_has_two_placements() {
        let taxonomy = PatternTaxonomy::standard();
        let placements = taxonomy.placements(CandlePattern::Engulfing);
        assert_eq!(
            placements,
            vec![
                Placement {
                    group: "Bullish".into(),
                    subgroup: "Reversal".into(),
                    rank: 5
                },
                Placement {
                    group: "Bearish".into(),
                    subgroup: "Reversal".into(),
                    rank: 4
                },
            ]
        );
    }

    #[test]
    fn ranks_follow_published_order() {
        let taxonomy = PatternTaxonomy::standard();
        let rank_in = |pattern, group: &str| {
            taxonomy
                .placements(pattern)
                .into_iter()
                .find(|p| p.group == group)
                .map(|p| p.rank)
        };
        assert_eq!(rank_in(CandlePattern::LadderBottom, "Bullish"), Some(8));
        assert_eq!(rank_in(CandlePattern::HomingPigeon, "Bullish"), Some(10));
        assert_eq!(rank_in(CandlePattern::MatHold, "Bullish"), Some(1));
        assert_eq!(rank_in(CandlePattern::StalledPattern, "Neutral"), Some(3));
        assert_eq!(rank_in(CandlePattern::ConcealBabySwallow, "Neutral"), Some(2));
        assert_eq!(
            taxonomy
                .select("Bullish", "Reversal", "CDLLADDERBOTTOM")
                .map(|s| s.patterns),
            Some(vec![CandlePattern::LadderBottom])
        );
    }

    #[test]
    fn select_all_is_deduplicated() {
        let taxonomy = PatternTaxonomy::standard();
        let selection = taxonomy.select("all", "all", "all").unwrap();
        assert_eq!(selection.patterns.len(), CandlePattern::ALL.len());
        assert_eq!(selection.direction, SignalDirection::Any);
    }

    #[test]
    fn select_is_case_insensitive() {
        let taxonomy = PatternTaxonomy::standard();
        let selection = taxonomy.select("bullish", "REVERSAL", "engulfing").unwrap();
        assert_eq!(selection.patterns, vec![CandlePattern::Engulfing]);
        assert_eq!(selection.direction, SignalDirection::Bullish);
    }

    #[test]
    fn select_keeps_taxonomy_order() {
        let taxonomy = PatternTaxonomy::standard();
        let selection = taxonomy.select("Bullish", "Continuation", "all").unwrap();
        assert_eq!(
            selection.patterns,
            vec![
                CandlePattern::MatHold,
                CandlePattern::RiseFallThreeMethods,
                CandlePattern::TasukiGap,
                CandlePattern::SeparatingLines
            ]
        );
    }

    #[test]
    fn select_mismatch_is_none() {
        let taxonomy = PatternTaxonomy::standard();
        assert!(taxonomy.select("Bullish", "Reversal", "CDLDOJI").is_none());
        assert!(taxonomy.select("Sideways", "all", "all").is_none());
        assert!(taxonomy.select("all", "all", "CDLNOPE").is_none());
    }

    #[test]
    fn direction_matches_sign() {
        assert!(SignalDirection::Bullish.matches(100));
        assert!(!SignalDirection::Bullish.matches(-100));
        assert!(SignalDirection::Bearish.matches(-100));
        assert!(SignalDirection::Any.matches(-200));
        assert!(!SignalDirection::Any.matches(0));
    }
}
