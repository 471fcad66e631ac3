use crate::engine::IndicatorSet;
use crate::error::AnalyticsError;
use crate::sanitizer::normalize_number;
use core_types::PriceSeries;
use rust_decimal::Decimal;
use std::fmt;

/// Text returned when there is not enough history for a classification.
pub const INSUFFICIENT_DATA: &str = "insufficient data for narrative";
/// Minimum number of price points before a narrative is attempted.
pub const MIN_NARRATIVE_POINTS: usize = 60;
/// Distance from SMA 20, as a fraction, still considered "near" it.
pub const CONSOLIDATION_BAND: f64 = 0.05;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

const SEPARATOR: &str = " ";

/// The latest values the narrative is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendInputs {
    /// Number of aligned price points behind the indicators.
    pub points: usize,
    pub close: f64,
    pub sma20: Option<f64>,
    pub sma60: Option<f64>,
    pub rsi14: Option<f64>,
}

impl TrendInputs {
    /// Picks the values at the last date of `series`.
    pub fn latest(series: &PriceSeries, indicators: &IndicatorSet) -> Result<Self, AnalyticsError> {
        let last = series.last().ok_or(AnalyticsError::NoData)?;
        Ok(Self {
            points: series.len(),
            close: last.close,
            sma20: at_end(&indicators.sma20),
            sma60: at_end(&indicators.sma60),
            rsi14: at_end(&indicators.rsi14),
        })
    }
}

fn at_end(column: &[Option<f64>]) -> Option<f64> {
    column.last().copied().flatten()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
    Consolidation,
    Oscillating,
}

impl Trend {
    pub fn phrase(&self) -> &'static str {
        match self {
            Trend::Bullish => {
                "Bullish: price is above the 20-day and 60-day moving averages and the uptrend is intact."
            }
            Trend::Bearish => {
                "Bearish: price is below its moving averages and in a correction or downtrend."
            }
            Trend::Consolidation => {
                "Consolidation: price is trading close to the 20-day moving average with no clear direction."
            }
            Trend::Oscillating => {
                "Oscillating: price has drifted away from its moving averages, a rebound or pullback may follow."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumKind {
    Overbought,
    Oversold,
    Neutral,
}

/// Momentum reading with the RSI value rounded for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    pub kind: MomentumKind,
    pub rsi: Decimal,
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MomentumKind::Overbought => write!(
                f,
                "Overbought (RSI={:.2}): watch for a short-term pullback.",
                self.rsi
            ),
            MomentumKind::Oversold => write!(
                f,
                "Oversold (RSI={:.2}): selling looks stretched and a rebound is possible.",
                self.rsi
            ),
            MomentumKind::Neutral => {
                write!(f, "Neutral momentum (RSI={:.2}): sentiment is steady.", self.rsi)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Narrative {
    InsufficientData,
    Classified { trend: Trend, momentum: Momentum },
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Narrative::InsufficientData => f.write_str(INSUFFICIENT_DATA),
            Narrative::Classified { trend, momentum } => {
                write!(f, "{}{}{}", trend.phrase(), SEPARATOR, momentum)
            }
        }
    }
}

/// Turns the latest indicator values into a fixed-vocabulary trend description.
#[derive(Debug, Clone, Default)]
pub struct NarrativeGenerator {}

impl NarrativeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&self, inputs: &TrendInputs) -> Result<Narrative, AnalyticsError> {
        if inputs.points < MIN_NARRATIVE_POINTS {
            tracing::debug!(points = inputs.points, "Too few points for a narrative.");
            return Ok(Narrative::InsufficientData);
        }
        let (sma20, sma60, rsi14) = match (inputs.sma20, inputs.sma60, inputs.rsi14) {
            (Some(sma20), Some(sma60), Some(rsi14)) => (sma20, sma60, rsi14),
            _ => return Ok(Narrative::InsufficientData),
        };

        for (name, value) in [
            ("close", inputs.close),
            ("sma20", sma20),
            ("sma60", sma60),
            ("rsi14", rsi14),
        ] {
            if !value.is_finite() {
                return Err(AnalyticsError::Computation(format!(
                    "narrative input {} is not finite ({})",
                    name, value
                )));
            }
        }

        let trend = classify_trend(inputs.close, sma20, sma60);
        let rsi = normalize_number(rsi14).ok_or_else(|| {
            AnalyticsError::Computation(format!("RSI {} cannot be displayed", rsi14))
        })?;
        let momentum = Momentum {
            kind: classify_momentum(rsi14),
            rsi,
        };

        Ok(Narrative::Classified { trend, momentum })
    }
}

/// Evaluated in order; the first rule that holds wins.
pub fn classify_trend(close: f64, sma20: f64, sma60: f64) -> Trend {
    if close > sma20 && sma20 > sma60 {
        Trend::Bullish
    } else if close < sma20 && sma20 < sma60 {
        Trend::Bearish
    } else if ((close - sma20) / sma20).abs() < CONSOLIDATION_BAND {
        Trend::Consolidation
    } else {
        Trend::Oscillating
    }
}

pub fn classify_momentum(rsi: f64) -> MomentumKind {
    if rsi > RSI_OVERBOUGHT {
        MomentumKind::Overbought
    } else if rsi < RSI_OVERSOLD {
        MomentumKind::Oversold
    } else {
        MomentumKind::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(close: f64, sma20: f64, sma60: f64, rsi14: f64) -> TrendInputs {
        TrendInputs {
            points: 120,
            close,
            sma20: Some(sma20),
            sma60: Some(sma60),
            rsi14: Some(rsi14),
        }
    }

    #[test]
    fn trend_rules_apply_in_order() {
        assert_eq!(classify_trend(110.0, 105.0, 100.0), Trend::Bullish);
        assert_eq!(classify_trend(90.0, 95.0, 100.0), Trend::Bearish);
        assert_eq!(classify_trend(102.0, 100.0, 101.0), Trend::Consolidation);
        assert_eq!(classify_trend(120.0, 100.0, 101.0), Trend::Oscillating);
    }

    #[test]
    fn all_equal_falls_through_to_consolidation() {
        assert_eq!(classify_trend(100.0, 100.0, 100.0), Trend::Consolidation);
    }

    #[test]
    fn bullish_wins_even_far_from_the_average() {
        // 50% above SMA 20 would also miss the consolidation band; order decides.
        assert_eq!(classify_trend(150.0, 100.0, 90.0), Trend::Bullish);
    }

    #[test]
    fn momentum_thresholds_are_strict() {
        assert_eq!(classify_momentum(70.0), MomentumKind::Neutral);
        assert_eq!(classify_momentum(70.01), MomentumKind::Overbought);
        assert_eq!(classify_momentum(30.0), MomentumKind::Neutral);
        assert_eq!(classify_momentum(29.99), MomentumKind::Oversold);
    }

    #[test]
    fn short_history_is_not_classified() {
        let mut short = inputs(110.0, 105.0, 100.0, 55.0);
        short.points = 59;
        let narrative = NarrativeGenerator::new().generate(&short).unwrap();
        assert_eq!(narrative, Narrative::InsufficientData);
        assert_eq!(narrative.to_string(), INSUFFICIENT_DATA);
    }

    #[test]
    fn undefined_indicator_is_not_classified() {
        let mut missing = inputs(110.0, 105.0, 100.0, 55.0);
        missing.sma60 = None;
        let narrative = NarrativeGenerator::new().generate(&missing).unwrap();
        assert_eq!(narrative, Narrative::InsufficientData);
    }

    #[test]
    fn non_finite_input_is_a_computation_error() {
        let result = NarrativeGenerator::new().generate(&inputs(f64::NAN, 1.0, 1.0, 50.0));
        assert!(matches!(result, Err(AnalyticsError::Computation(_))));
    }

    #[test]
    fn narrative_text_joins_trend_and_momentum() {
        let narrative = NarrativeGenerator::new()
            .generate(&inputs(110.0, 105.0, 100.0, 72.456))
            .unwrap();
        let text = narrative.to_string();
        assert!(text.starts_with(Trend::Bullish.phrase()));
        assert!(text.ends_with("Overbought (RSI=72.46): watch for a short-term pullback."));
    }

    #[test]
    fn narrative_is_deterministic() {
        let generator = NarrativeGenerator::new();
        let a = generator.generate(&inputs(90.0, 95.0, 100.0, 21.5)).unwrap().to_string();
        let b = generator.generate(&inputs(90.0, 95.0, 100.0, 21.5)).unwrap().to_string();
        assert_eq!(a, b);
        assert!(a.contains("RSI=21.50"));
    }
}
