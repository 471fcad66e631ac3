use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::PriceSeries;

/// Moving-average windows reported in the history (`ma5`, `ma20`, `ma60`).
pub const SMA_WINDOWS: [usize; 3] = [5, 20, 60];
pub const RSI_WINDOW: usize = 14;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Rolling indicators aligned one-to-one with the dates of the source series.
/// `None` marks a date that sits inside an indicator's warm-up window.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub dates: Vec<NaiveDate>,
    pub sma5: Vec<Option<f64>>,
    pub sma20: Vec<Option<f64>>,
    pub sma60: Vec<Option<f64>>,
    pub rsi14: Vec<Option<f64>>,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Headline statistics for a series, expressed as ratios (not percentages).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiSet {
    pub total_return: f64,
    pub cagr: f64,
    /// Undefined when there are fewer than two daily returns.
    pub volatility: Option<f64>,
    /// Undefined when volatility is undefined or zero.
    pub sharpe_ratio: Option<f64>,
    /// Always `<= 0`.
    pub max_drawdown: f64,
}

/// A stateless calculator for indicators and risk/return metrics of a price series.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes SMA 5/20/60 and RSI 14 over the closing prices.
    pub fn compute_indicators(&self, series: &PriceSeries) -> IndicatorSet {
        let closes = series.closes();
        let [fast, medium, slow] = SMA_WINDOWS;

        IndicatorSet {
            dates: series.dates(),
            sma5: sma(&closes, fast),
            sma20: sma(&closes, medium),
            sma60: sma(&closes, slow),
            rsi14: rsi(&closes, RSI_WINDOW),
        }
    }

    /// Computes the KPI set.
    ///
    /// # Errors
    ///
    /// * `NoData` for an empty series.
    /// * `InsufficientHistory` when fewer than two closes exist.
    /// * `Computation` when a result comes out non-finite (for example a CAGR
    ///   that overflows over a very short horizon).
    pub fn compute_kpis(
        &self,
        series: &PriceSeries,
        risk_free_rate: f64,
    ) -> Result<KpiSet, AnalyticsError> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(AnalyticsError::NoData),
        };
        if series.len() < 2 {
            return Err(AnalyticsError::InsufficientHistory {
                required: 2,
                actual: series.len(),
            });
        }

        let closes = series.closes();
        let growth = last.close / first.close;
        let total_return = ensure_finite("total return", growth - 1.0)?;

        let horizon_years = (last.date - first.date).num_days() as f64 / DAYS_PER_YEAR;
        let cagr = if horizon_years <= 0.0 {
            0.0
        } else {
            ensure_finite("CAGR", growth.powf(1.0 / horizon_years) - 1.0)?
        };

        let returns = daily_returns(&closes);
        let volatility = sample_std_dev(&returns)
            .map(|sd| ensure_finite("volatility", sd * TRADING_DAYS_PER_YEAR.sqrt()))
            .transpose()?;

        let sharpe_ratio = match volatility {
            Some(vol) if vol != 0.0 => {
                Some(ensure_finite("Sharpe ratio", (cagr - risk_free_rate) / vol)?)
            }
            _ => None,
        };

        let max_drawdown = max_drawdown(&closes);

        tracing::debug!(
            points = series.len(),
            horizon_years,
            total_return,
            cagr,
            ?volatility,
            ?sharpe_ratio,
            max_drawdown,
            "Computed KPIs."
        );

        Ok(KpiSet {
            total_return,
            cagr,
            volatility,
            sharpe_ratio,
            max_drawdown,
        })
    }
}

/// Trailing simple moving average. The first `window - 1` values are undefined.
pub fn sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    (0..closes.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = closes[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}

/// Relative Strength Index using plain trailing means of gains and losses.
///
/// The first `window` values are undefined because `window` price changes are
/// needed. A window with no losses scores 100, a window with no movement at
/// all scores a neutral 50.
pub fn rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; closes.len()];
    if window == 0 || closes.len() <= window {
        return values;
    }

    // Entry `k` holds the change from close `k` to close `k + 1`.
    let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    for t in window..closes.len() {
        let avg_gain = gains[t - window..t].iter().sum::<f64>() / window as f64;
        let avg_loss = losses[t - window..t].iter().sum::<f64>() / window as f64;
        values[t] = Some(rsi_from_averages(avg_gain, avg_loss));
    }

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain > 0.0 { 100.0 } else { 50.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Simple day-over-day returns. The result is one element shorter than the input.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// The deepest decline from a running peak, as a ratio `<= 0`.
pub fn max_drawdown(closes: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;

    for &close in closes {
        if close > peak {
            peak = close;
        }
        let drawdown = (close - peak) / peak;
        if drawdown < worst {
            worst = drawdown;
        }
    }

    worst
}

fn ensure_finite(metric: &str, value: f64) -> Result<f64, AnalyticsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalyticsError::Computation(format!(
            "{} evaluated to a non-finite value ({})",
            metric, value
        )))
    }
}
