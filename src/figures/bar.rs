use serde::Serialize;

use super::color::{SUNSET_NAME, normalize, sunset};
use crate::pollutant::Pollutant;
use crate::ranking::{Band, RankingOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub city: String,
    pub value: f64,
    pub color: String,
    pub band: Band,
    /// Set when the city's mean is non-positive.
    pub flagged: bool,
}

/// Bar chart of a top-N ranking, one bar per city in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub pollutant: Pollutant,
    pub x_label: String,
    pub y_label: String,
    pub color_scale: &'static str,
    pub bars: Vec<Bar>,
}

pub fn bar_title(pollutant: Pollutant, count: usize) -> String {
    format!(
        "Top {count} cities with the highest {} concentration",
        pollutant.label()
    )
}

pub fn bar_chart(outcome: &RankingOutcome) -> BarChart {
    let pollutant = outcome.pollutant;
    let entries = &outcome.ranking.entries;

    let (min, max) = entries
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
            (lo.min(e.mean), hi.max(e.mean))
        });

    let bars = entries
        .iter()
        .map(|e| Bar {
            city: e.city.clone(),
            value: e.mean,
            color: sunset(normalize(e.mean, min, max)),
            band: e.band,
            flagged: outcome.anomalies.iter().any(|a| a.city == e.city),
        })
        .collect();

    BarChart {
        title: bar_title(pollutant, entries.len()),
        pollutant,
        x_label: "city".to_string(),
        y_label: format!("average {} concentration", pollutant.label()),
        color_scale: SUNSET_NAME,
        bars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::dataset::{Dataset, MeasurementRecord, Schema};
    use crate::ranking::rank_top_n;

    fn outcome() -> RankingOutcome {
        let records = vec![
            MeasurementRecord::new("Kabul").with(Pollutant::No2, 48.0),
            MeasurementRecord::new("Lima").with(Pollutant::No2, 24.0),
            MeasurementRecord::new("Broken").with(Pollutant::No2, -1.0),
        ];
        let dataset = Dataset::new(Schema::full(), records);
        rank_top_n(&dataset, Pollutant::No2, &RankingConfig::default()).unwrap()
    }

    #[test]
    fn test_bars_follow_ranking() {
        let chart = bar_chart(&outcome());
        let cities: Vec<_> = chart.bars.iter().map(|b| b.city.as_str()).collect();
        assert_eq!(cities, vec!["Kabul", "Lima", "Broken"]);
        assert_eq!(chart.title, "Top 3 cities with the highest NO2 concentration");
        assert_eq!(chart.y_label, "average NO2 concentration");
    }

    #[test]
    fn test_bar_colors_and_flags() {
        let chart = bar_chart(&outcome());
        assert_eq!(chart.bars[0].color, sunset(1.0));
        assert_eq!(chart.bars[2].color, sunset(0.0));
        assert!(chart.bars[2].flagged);
        assert!(!chart.bars[0].flagged);
        assert_eq!(chart.bars[0].band, Band::AboveInterimTarget1);
    }
}
