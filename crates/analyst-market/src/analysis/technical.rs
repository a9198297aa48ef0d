//! Technical indicators and their signals
//!
//! Every function here is a pure function of the price series. Indicators
//! that need more observations than the series holds produce a neutral
//! "insufficient data" signal instead of an error.

use analyst_core::{PriceSeries, Signal, Verdict};
use ta::Next;
use ta::indicators::ExponentialMovingAverage;

use crate::config::IndicatorSettings;
use crate::error::{MarketError, Result};

/// Exponential moving average seeded with the first value
///
/// `ema[0] = values[0]`, `ema[i] = a * values[i] + (1 - a) * ema[i - 1]` with
/// `a = 2 / (span + 1)`.
pub fn ema(values: &[f64], span: usize) -> Result<Vec<f64>> {
    let mut indicator =
        ExponentialMovingAverage::new(span).map_err(|e| MarketError::Indicator(e.to_string()))?;
    Ok(values.iter().map(|&value| indicator.next(value)).collect())
}

/// MACD line and its signal line
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Result<Macd> {
    let fast_ema = ema(closes, fast)?;
    let slow_ema = ema(closes, slow)?;
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema(&macd, signal)?;
    Ok(Macd { macd, signal })
}

/// RSI over the last `period` price changes, using simple averages
///
/// Returns `None` with fewer than `period + 1` closes. With no movement at
/// all the RSI is 50; with gains and no losses it is 100.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - period - 1..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), delta| {
            if delta > 0.0 {
                (gains + delta, losses)
            } else {
                (gains, losses - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    Some(if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    })
}

/// Bollinger bands at the end of the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
}

/// Moving average of the last `window` closes plus/minus `std_devs`
/// sample standard deviations
pub fn bollinger_bands(closes: &[f64], window: usize, std_devs: f64) -> Option<Bands> {
    if window < 2 || closes.len() < window {
        return None;
    }

    let recent = &closes[closes.len() - window..];
    let n = window as f64;
    let middle = recent.iter().sum::<f64>() / n;
    let variance = recent.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / (n - 1.0);
    let width = std_devs * variance.sqrt();

    Some(Bands {
        middle,
        upper: middle + width,
        lower: middle - width,
    })
}

/// Running on-balance volume, starting at 0
pub fn obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    let mut running = 0.0;
    let mut values = Vec::with_capacity(closes.len());
    for (i, close) in closes.iter().enumerate() {
        if i > 0 {
            let volume = volumes.get(i).copied().unwrap_or(0.0);
            if *close > closes[i - 1] {
                running += volume;
            } else if *close < closes[i - 1] {
                running -= volume;
            }
        }
        values.push(running);
    }
    values
}

/// MACD crossing between the last two observations
pub fn macd_signal(closes: &[f64], settings: &IndicatorSettings) -> Result<Signal> {
    let needed = settings.macd_slow.max(2);
    if closes.len() < needed {
        return Ok(Signal::insufficient_data("MACD", needed, closes.len()));
    }

    let Macd { macd, signal } = macd(
        closes,
        settings.macd_fast,
        settings.macd_slow,
        settings.macd_signal,
    )?;
    let n = macd.len();
    let (prev_macd, prev_signal) = (macd[n - 2], signal[n - 2]);
    let (last_macd, last_signal) = (macd[n - 1], signal[n - 1]);

    let (verdict, crossing) = if prev_macd <= prev_signal && last_macd > last_signal {
        (Verdict::Bullish, "crossed above")
    } else if prev_macd >= prev_signal && last_macd < last_signal {
        (Verdict::Bearish, "crossed below")
    } else {
        (Verdict::Neutral, "did not cross")
    };

    let close = closes[n - 1];
    let mut result = Signal::new(
        "MACD",
        verdict,
        format!("MACD line {last_macd:.2} {crossing} signal line {last_signal:.2}"),
    );
    if close > 0.0 {
        result = result.with_confidence(((last_macd - last_signal).abs() / close).min(1.0));
    }
    Ok(result)
}

/// Oversold/overbought reading of the RSI
pub fn rsi_signal(closes: &[f64], settings: &IndicatorSettings) -> Signal {
    let Some(value) = rsi(closes, settings.rsi_period) else {
        return Signal::insufficient_data("RSI", settings.rsi_period + 1, closes.len());
    };

    let (verdict, zone) = if value < settings.rsi_oversold {
        (Verdict::Bullish, "oversold")
    } else if value > settings.rsi_overbought {
        (Verdict::Bearish, "overbought")
    } else {
        (Verdict::Neutral, "neutral")
    };

    Signal::new("RSI", verdict, format!("RSI is {value:.2} ({zone})"))
        .with_confidence((value - 50.0).abs() / 50.0)
}

/// Last close relative to the Bollinger bands
pub fn bollinger_signal(closes: &[f64], settings: &IndicatorSettings) -> Signal {
    let Some(bands) = bollinger_bands(closes, settings.bollinger_window, settings.bollinger_std_devs)
    else {
        return Signal::insufficient_data("Bollinger", settings.bollinger_window, closes.len());
    };
    let close = closes[closes.len() - 1];

    let (verdict, position) = if close < bands.lower {
        (Verdict::Bullish, "below the lower band")
    } else if close > bands.upper {
        (Verdict::Bearish, "above the upper band")
    } else {
        (Verdict::Neutral, "within the bands")
    };

    Signal::new(
        "Bollinger",
        verdict,
        format!(
            "Close {close:.2} is {position} (lower {:.2}, middle {:.2}, upper {:.2})",
            bands.lower, bands.middle, bands.upper
        ),
    )
}

/// Direction of the recent OBV slope
pub fn obv_signal(closes: &[f64], volumes: &[f64], settings: &IndicatorSettings) -> Signal {
    let lookback = settings.obv_lookback;
    let needed = lookback + 1;
    if lookback == 0 || closes.len() < needed {
        return Signal::insufficient_data("OBV", needed, closes.len());
    }

    let values = obv(closes, volumes);
    let recent = &values[values.len() - needed..];
    let slope = recent.windows(2).map(|pair| pair[1] - pair[0]).sum::<f64>() / lookback as f64;

    let verdict = if slope > 0.0 {
        Verdict::Bullish
    } else if slope < 0.0 {
        Verdict::Bearish
    } else {
        Verdict::Neutral
    };

    Signal::new(
        "OBV",
        verdict,
        format!("OBV slope is {slope:.2} over the last {lookback} sessions ({verdict})"),
    )
}

/// The four technical signals in fixed order: MACD, RSI, Bollinger, OBV
pub fn technical_signals(series: &PriceSeries, settings: &IndicatorSettings) -> Result<Vec<Signal>> {
    let closes = series.closes();
    let volumes = series.volumes();
    Ok(vec![
        macd_signal(&closes, settings)?,
        rsi_signal(&closes, settings),
        bollinger_signal(&closes, settings),
        obv_signal(&closes, &volumes, settings),
    ])
}
