//! Candlestick pattern recognition.
//!
//! Detectors follow TA-Lib conventions: each produces one signal per bar,
//! +100 for a bullish occurrence, -100 for a bearish one and 0 otherwise.
//! Both hikkake variants also emit +/-200 on confirmation.

pub mod double;
pub mod multi;
pub mod settings;
pub mod single;
pub mod taxonomy;

pub use taxonomy::{PatternSelection, PatternTaxonomy, SignalDirection};

use crate::domain::ohlcv::PriceBar;
use std::fmt;

type BarDetector = fn(&[PriceBar], usize) -> Option<i32>;

/// Hikkake variants carry state between bars, so they scan the whole series.
enum Detector {
    Bar(BarDetector),
    Series(fn(&[PriceBar]) -> Vec<i32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CandlePattern {
    TwoCrows,
    ThreeBlackCrows,
    ThreeInside,
    ThreeOutside,
    ThreeWhiteSoldiers,
    Breakaway,
    ConcealBabySwallow,
    Counterattack,
    DarkCloudCover,
    Doji,
    DragonflyDoji,
    Engulfing,
    EveningDojiStar,
    EveningStar,
    GapSideSideWhite,
    GravestoneDoji,
    Hammer,
    HangingMan,
    Harami,
    HaramiCross,
    HighWave,
    Hikkake,
    HikkakeMod,
    HomingPigeon,
    IdenticalThreeCrows,
    InNeck,
    InvertedHammer,
    LadderBottom,
    LongLeggedDoji,
    LongLine,
    Marubozu,
    MatchingLow,
    MatHold,
    MorningDojiStar,
    MorningStar,
    OnNeck,
    Piercing,
    RickshawMan,
    RiseFallThreeMethods,
    SeparatingLines,
    ShootingStar,
    ShortLine,
    SpinningTop,
    StalledPattern,
    Takuri,
    TasukiGap,
    Thrusting,
    Tristar,
    Unique3River,
    UpsideGapTwoCrows,
    XSideGapThreeMethods,
}

impl CandlePattern {
    pub const ALL: [CandlePattern; 51] = [
        CandlePattern::TwoCrows,
        CandlePattern::ThreeBlackCrows,
        CandlePattern::ThreeInside,
        CandlePattern::ThreeOutside,
        CandlePattern::ThreeWhiteSoldiers,
        CandlePattern::Breakaway,
        CandlePattern::ConcealBabySwallow,
        CandlePattern::Counterattack,
        CandlePattern::DarkCloudCover,
        CandlePattern::Doji,
        CandlePattern::DragonflyDoji,
        CandlePattern::Engulfing,
        CandlePattern::EveningDojiStar,
        CandlePattern::EveningStar,
        CandlePattern::GapSideSideWhite,
        CandlePattern::GravestoneDoji,
        CandlePattern::Hammer,
        CandlePattern::HangingMan,
        CandlePattern::Harami,
        CandlePattern::HaramiCross,
        CandlePattern::HighWave,
        CandlePattern::Hikkake,
        CandlePattern::HikkakeMod,
        CandlePattern::HomingPigeon,
        CandlePattern::IdenticalThreeCrows,
        CandlePattern::InNeck,
        CandlePattern::InvertedHammer,
        CandlePattern::LadderBottom,
        CandlePattern::LongLeggedDoji,
        CandlePattern::LongLine,
        CandlePattern::Marubozu,
        CandlePattern::MatchingLow,
        CandlePattern::MatHold,
        CandlePattern::MorningDojiStar,
        CandlePattern::MorningStar,
        CandlePattern::OnNeck,
        CandlePattern::Piercing,
        CandlePattern::RickshawMan,
        CandlePattern::RiseFallThreeMethods,
        CandlePattern::SeparatingLines,
        CandlePattern::ShootingStar,
        CandlePattern::ShortLine,
        CandlePattern::SpinningTop,
        CandlePattern::StalledPattern,
        CandlePattern::Takuri,
        CandlePattern::TasukiGap,
        CandlePattern::Thrusting,
        CandlePattern::Tristar,
        CandlePattern::Unique3River,
        CandlePattern::UpsideGapTwoCrows,
        CandlePattern::XSideGapThreeMethods,
    ];

    /// TA-Lib function name, e.g. `CDLENGULFING`.
    pub fn name(self) -> &'static str {
        match self {
            CandlePattern::TwoCrows => "CDL2CROWS",
            CandlePattern::ThreeBlackCrows => "CDL3BLACKCROWS",
            CandlePattern::ThreeInside => "CDL3INSIDE",
            CandlePattern::ThreeOutside => "CDL3OUTSIDE",
            CandlePattern::ThreeWhiteSoldiers => "CDL3WHITESOLDIERS",
            CandlePattern::Breakaway => "CDLBREAKAWAY",
            CandlePattern::ConcealBabySwallow => "CDLCONCEALBABYSWALL",
            CandlePattern::Counterattack => "CDLCOUNTERATTACK",
            CandlePattern::DarkCloudCover => "CDLDARKCLOUDCOVER",
            CandlePattern::Doji => "CDLDOJI",
            CandlePattern::DragonflyDoji => "CDLDRAGONFLYDOJI",
            CandlePattern::Engulfing => "CDLENGULFING",
            CandlePattern::EveningDojiStar => "CDLEVENINGDOJISTAR",
            CandlePattern::EveningStar => "CDLEVENINGSTAR",
            CandlePattern::GapSideSideWhite => "CDLGAPSIDESIDEWHITE",
            CandlePattern::GravestoneDoji => "CDLGRAVESTONEDOJI",
            CandlePattern::Hammer => "CDLHAMMER",
            CandlePattern::HangingMan => "CDLHANGINGMAN",
            CandlePattern::Harami => "CDLHARAMI",
            CandlePattern::HaramiCross => "CDLHARAMICROSS",
            CandlePattern::HighWave => "CDLHIGHWAVE",
            CandlePattern::Hikkake => "CDLHIKKAKE",
            CandlePattern::HikkakeMod => "CDLHIKKAKEMOD",
            CandlePattern::HomingPigeon => "CDLHOMINGPIGEON",
            CandlePattern::IdenticalThreeCrows => "CDLIDENTICAL3CROWS",
            CandlePattern::InNeck => "CDLINNECK",
            CandlePattern::InvertedHammer => "CDLINVERTEDHAMMER",
            CandlePattern::LadderBottom => "CDLLADDERBOTTOM",
            CandlePattern::LongLeggedDoji => "CDLLONGLEGGEDDOJI",
            CandlePattern::LongLine => "CDLLONGLINE",
            CandlePattern::Marubozu => "CDLMARUBOZU",
            CandlePattern::MatchingLow => "CDLMATCHINGLOW",
            CandlePattern::MatHold => "CDLMATHOLD",
            CandlePattern::MorningDojiStar => "CDLMORNINGDOJISTAR",
            CandlePattern::MorningStar => "CDLMORNINGSTAR",
            CandlePattern::OnNeck => "CDLONNECK",
            CandlePattern::Piercing => "CDLPIERCING",
            CandlePattern::RickshawMan => "CDLRICKSHAWMAN",
            CandlePattern::RiseFallThreeMethods => "CDLRISEFALL3METHODS",
            CandlePattern::SeparatingLines => "CDLSEPARATINGLINES",
            CandlePattern::ShootingStar => "CDLSHOOTINGSTAR",
            CandlePattern::ShortLine => "CDLSHORTLINE",
            CandlePattern::SpinningTop => "CDLSPINNINGTOP",
            CandlePattern::StalledPattern => "CDLSTALLEDPATTERN",
            CandlePattern::Takuri => "CDLTAKURI",
            CandlePattern::TasukiGap => "CDLTASUKIGAP",
            CandlePattern::Thrusting => "CDLTHRUSTING",
            CandlePattern::Tristar => "CDLTRISTAR",
            CandlePattern::Unique3River => "CDLUNIQUE3RIVER",
            CandlePattern::UpsideGapTwoCrows => "CDLUPSIDEGAP2CROWS",
            CandlePattern::XSideGapThreeMethods => "CDLXSIDEGAP3METHODS",
        }
    }

    /// Case-insensitive lookup; the `CDL` prefix is optional.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let wanted = upper.strip_prefix("CDL").unwrap_or(&upper);
        Self::ALL
            .into_iter()
            .find(|p| p.name().strip_prefix("CDL") == Some(wanted))
    }

    fn detector(self) -> Detector {
        let detector: BarDetector = match self {
            CandlePattern::TwoCrows => multi::two_crows,
            CandlePattern::ThreeBlackCrows => multi::three_black_crows,
            CandlePattern::ThreeInside => multi::three_inside,
            CandlePattern::ThreeOutside => multi::three_outside,
            CandlePattern::ThreeWhiteSoldiers => multi::three_white_soldiers,
            CandlePattern::Breakaway => multi::breakaway,
            CandlePattern::ConcealBabySwallow => multi::conceal_baby_swallow,
            CandlePattern::Counterattack => double::counterattack,
            CandlePattern::DarkCloudCover => double::dark_cloud_cover,
            CandlePattern::Doji => single::doji,
            CandlePattern::DragonflyDoji => single::dragonfly_doji,
            CandlePattern::Engulfing => double::engulfing,
            CandlePattern::EveningDojiStar => multi::evening_doji_star,
            CandlePattern::EveningStar => multi::evening_star,
            CandlePattern::GapSideSideWhite => multi::gap_side_side_white,
            CandlePattern::GravestoneDoji => single::gravestone_doji,
            CandlePattern::Hammer => double::hammer,
            CandlePattern::HangingMan => double::hanging_man,
            CandlePattern::Harami => double::harami,
            CandlePattern::HaramiCross => double::harami_cross,
            CandlePattern::HighWave => single::high_wave,
            CandlePattern::Hikkake => return Detector::Series(multi::hikkake),
            CandlePattern::HikkakeMod => return Detector::Series(multi::hikkake_mod),
            CandlePattern::HomingPigeon => double::homing_pigeon,
            CandlePattern::IdenticalThreeCrows => multi::identical_three_crows,
            CandlePattern::InNeck => double::in_neck,
            CandlePattern::InvertedHammer => double::inverted_hammer,
            CandlePattern::LadderBottom => multi::ladder_bottom,
            CandlePattern::LongLeggedDoji => single::long_legged_doji,
            CandlePattern::LongLine => single::long_line,
            CandlePattern::Marubozu => single::marubozu,
            CandlePattern::MatchingLow => double::matching_low,
            CandlePattern::MatHold => multi::mat_hold,
            CandlePattern::MorningDojiStar => multi::morning_doji_star,
            CandlePattern::MorningStar => multi::morning_star,
            CandlePattern::OnNeck => double::on_neck,
            CandlePattern::Piercing => double::piercing,
            CandlePattern::RickshawMan => single::rickshaw_man,
            CandlePattern::RiseFallThreeMethods => multi::rise_fall_three_methods,
            CandlePattern::SeparatingLines => double::separating_lines,
            CandlePattern::ShootingStar => double::shooting_star,
            CandlePattern::ShortLine => single::short_line,
            CandlePattern::SpinningTop => single::spinning_top,
            CandlePattern::StalledPattern => multi::stalled_pattern,
            CandlePattern::Takuri => single::takuri,
            CandlePattern::TasukiGap => multi::tasuki_gap,
            CandlePattern::Thrusting => double::thrusting,
            CandlePattern::Tristar => multi::tristar,
            CandlePattern::Unique3River => multi::unique_three_river,
            CandlePattern::UpsideGapTwoCrows => multi::upside_gap_two_crows,
            CandlePattern::XSideGapThreeMethods => multi::x_side_gap_three_methods,
        };
        Detector::Bar(detector)
    }

    /// One signal per bar, aligned with `bars`.
    pub fn detect(self, bars: &[PriceBar]) -> Vec<i32> {
        match self.detector() {
            Detector::Bar(detector) => (0..bars.len())
                .map(|i| detector(bars, i).unwrap_or(0))
                .collect(),
            Detector::Series(detector) => detector(bars),
        }
    }
}

impl fmt::Display for CandlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
