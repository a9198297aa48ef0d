//! Price-action sentiment: momentum and volume pressure

use analyst_core::{PriceSeries, Signal, Verdict};

use crate::config::SentimentSettings;

/// Total adjusted-close return over the window
pub fn momentum_signal(series: &PriceSeries, settings: &SentimentSettings) -> Signal {
    let [first, .., last] = series.bars() else {
        return Signal::insufficient_data("Momentum", 2, series.len());
    };
    if first.adj_close <= 0.0 {
        return Signal::new(
            "Momentum",
            Verdict::Neutral,
            format!("insufficient data: non-positive starting price {:.2}", first.adj_close),
        )
        .with_confidence(0.0);
    }

    let total_return = last.adj_close / first.adj_close - 1.0;
    let verdict = if total_return > settings.momentum_threshold {
        Verdict::Bullish
    } else if total_return < -settings.momentum_threshold {
        Verdict::Bearish
    } else {
        Verdict::Neutral
    };

    Signal::new(
        "Momentum",
        verdict,
        format!(
            "Return of {:.1}% from {} to {}",
            total_return * 100.0,
            first.date,
            last.date
        ),
    )
}

/// Recent volume against the window average, signed by recent price direction
pub fn volume_pressure_signal(series: &PriceSeries, settings: &SentimentSettings) -> Signal {
    let recent = settings.volume_window;
    let needed = recent + 1;
    if recent == 0 || series.len() < needed {
        return Signal::insufficient_data("Volume Pressure", needed, series.len());
    }

    let volumes = series.volumes();
    let closes = series.adj_closes();
    let overall = volumes.iter().sum::<f64>() / volumes.len() as f64;
    if overall <= 0.0 {
        return Signal::new(
            "Volume Pressure",
            Verdict::Neutral,
            "No volume traded in the window",
        );
    }

    let recent_volume = volumes[volumes.len() - recent..].iter().sum::<f64>() / recent as f64;
    let ratio = recent_volume / overall;
    let price_change = closes[closes.len() - 1] - closes[closes.len() - 1 - recent];
    let elevated = ratio >= settings.volume_ratio;

    let verdict = match (elevated, price_change) {
        (true, change) if change > 0.0 => Verdict::Bullish,
        (true, change) if change < 0.0 => Verdict::Bearish,
        _ => Verdict::Neutral,
    };
    let direction = if price_change > 0.0 {
        "rising"
    } else if price_change < 0.0 {
        "falling"
    } else {
        "flat"
    };

    Signal::new(
        "Volume Pressure",
        verdict,
        format!(
            "Last {recent} sessions traded {ratio:.2}x the average volume on a {direction} price"
        ),
    )
}

/// The two sentiment signals: momentum, volume pressure
pub fn sentiment_signals(series: &PriceSeries, settings: &SentimentSettings) -> Vec<Signal> {
    vec![
        momentum_signal(series, settings),
        volume_pressure_signal(series, settings),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyst_core::PriceBar;
    use chrono::{Days, NaiveDate};

    fn series(points: &[(f64, f64)]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let bars = points
            .iter()
            .enumerate()
            .map(|(i, (close, volume))| PriceBar {
                date: start + Days::new(i as u64),
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                adj_close: *close,
                volume: *volume,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_momentum_thresholds() {
        let settings = SentimentSettings::default();
        let up = series(&[(100.0, 1.0), (103.0, 1.0), (110.0, 1.0)]);
        assert_eq!(momentum_signal(&up, &settings).verdict(), Verdict::Bullish);

        let down = series(&[(100.0, 1.0), (90.0, 1.0)]);
        assert_eq!(momentum_signal(&down, &settings).verdict(), Verdict::Bearish);

        let flat = series(&[(100.0, 1.0), (104.0, 1.0)]);
        let signal = momentum_signal(&flat, &settings);
        assert_eq!(signal.verdict(), Verdict::Neutral);
        assert!(signal.rationale().contains("4.0%"));
    }

    #[test]
    fn test_momentum_needs_two_bars() {
        let single = series(&[(100.0, 1.0)]);
        let signal = momentum_signal(&single, &SentimentSettings::default());
        assert!(signal.rationale().contains("insufficient data"));
    }

    #[test]
    fn test_volume_pressure_on_rising_price() {
        let mut points = vec![(100.0, 1_000.0); 10];
        points.extend((1..=5).map(|i| (100.0 + f64::from(i), 3_000.0)));
        let signal = volume_pressure_signal(&series(&points), &SentimentSettings::default());
        assert_eq!(signal.verdict(), Verdict::Bullish);
        assert!(signal.rationale().contains("rising"));
    }

    #[test]
    fn test_volume_pressure_on_falling_price() {
        let mut points = vec![(100.0, 1_000.0); 10];
        points.extend((1..=5).map(|i| (100.0 - f64::from(i), 3_000.0)));
        let signal = volume_pressure_signal(&series(&points), &SentimentSettings::default());
        assert_eq!(signal.verdict(), Verdict::Bearish);
    }

    #[test]
    fn test_quiet_volume_is_neutral() {
        let points: Vec<(f64, f64)> = (0..15).map(|i| (100.0 + f64::from(i), 1_000.0)).collect();
        let signal = volume_pressure_signal(&series(&points), &SentimentSettings::default());
        assert_eq!(signal.verdict(), Verdict::Neutral);
    }

    #[test]
    fn test_volume_pressure_needs_history() {
        let points = vec![(100.0, 1_000.0); 5];
        let signal = volume_pressure_signal(&series(&points), &SentimentSettings::default());
        assert_eq!(signal.confidence(), Some(0.0));
    }
}
