use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use tracing::debug;

use super::color::{SUNSET_NAME, normalize, sunset};
use crate::dataset::MeasurementRecord;
use crate::pollutant::Pollutant;

/// Largest marker diameter, in pixels, given to the most polluted point.
pub const SIZE_MAX: f64 = 20.0;
const SIZE_MIN: f64 = 1.0;

pub fn map_title(pollutant: Pollutant) -> String {
    format!("Air Quality Snapshot - {} Levels Across Cities", pollutant.label())
}

/// Builds the scatter-map figure for one pollutant as a GeoJSON
/// FeatureCollection.
///
/// One point per record with a value, a city and valid coordinates. Each
/// point carries hover fields (`city`, country, year, the concentration) and
/// its marker `color`/`size`, both scaled by concentration. Figure settings
/// (title, colour scale, value range, base style) are foreign members of the
/// collection.
pub fn scatter_map(records: &[MeasurementRecord], pollutant: Pollutant) -> FeatureCollection {
    let points: Vec<(&MeasurementRecord, &str, f64, (f64, f64))> = records
        .iter()
        .filter_map(|r| Some((r, r.city_key()?, r.concentration(pollutant)?, r.coordinates()?)))
        .collect();
    debug!(
        pollutant = %pollutant,
        plotted = points.len(),
        skipped = records.len() - points.len(),
        "Scatter map points selected"
    );

    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.2), hi.max(p.2))
        });

    let features = points
        .iter()
        .map(|&(record, city, value, (lat, lon))| {
            let size = if max > 0.0 && value > 0.0 {
                (SIZE_MAX * value / max).max(SIZE_MIN)
            } else {
                SIZE_MIN
            };

            let mut properties = JsonObject::new();
            properties.insert("city".into(), json!(city));
            properties.insert("country_name".into(), json!(record.country_name));
            properties.insert("year".into(), json!(record.year));
            properties.insert(pollutant.column().into(), json!(value));
            properties.insert("color".into(), json!(sunset(normalize(value, min, max))));
            properties.insert("size".into(), json!(size));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut figure = JsonObject::new();
    figure.insert("title".into(), json!(map_title(pollutant)));
    figure.insert("pollutant".into(), json!(pollutant));
    figure.insert("value_column".into(), json!(pollutant.column()));
    figure.insert("hover_name".into(), json!("city"));
    figure.insert("color_scale".into(), json!(SUNSET_NAME));
    if min.is_finite() && max.is_finite() {
        figure.insert("range".into(), json!([min, max]));
    }
    figure.insert("map_style".into(), json!("carto-positron"));
    figure.insert("zoom".into(), json!(1));

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(figure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<MeasurementRecord> {
        vec![
            MeasurementRecord::new("Dhaka")
                .at(23.8, 90.4)
                .with(Pollutant::Pm25, 80.0),
            MeasurementRecord::new("Reykjavik")
                .at(64.1, -21.9)
                .with(Pollutant::Pm25, 4.0),
            MeasurementRecord::new("Nowhere").with(Pollutant::Pm25, 50.0),
            MeasurementRecord::new("Kathmandu").at(27.7, 85.3),
        ]
    }

    #[test]
    fn test_only_plottable_records_become_points() {
        let map = scatter_map(&records(), Pollutant::Pm25);
        assert_eq!(map.features.len(), 2);
    }

    #[test]
    fn test_point_geometry_is_lon_lat() {
        let map = scatter_map(&records(), Pollutant::Pm25);
        let geometry = map.features[0].geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![90.4, 23.8]));
    }

    #[test]
    fn test_marker_scaling() {
        let map = scatter_map(&records(), Pollutant::Pm25);
        let top = map.features[0].properties.as_ref().unwrap();
        let low = map.features[1].properties.as_ref().unwrap();

        assert_eq!(top["size"], json!(SIZE_MAX));
        assert_eq!(top["color"], json!(sunset(1.0)));
        assert_eq!(low["color"], json!(sunset(0.0)));
        assert_eq!(top["pm25_concentration"], json!(80.0));
    }

    #[test]
    fn test_figure_metadata() {
        let map = scatter_map(&records(), Pollutant::Pm25);
        let figure = map.foreign_members.as_ref().unwrap();
        assert_eq!(figure["title"], json!("Air Quality Snapshot - PM2.5 Levels Across Cities"));
        assert_eq!(figure["range"], json!([4.0, 80.0]));
        assert_eq!(figure["color_scale"], json!("sunset"));
    }

    #[test]
    fn test_empty_map_has_no_range() {
        let map = scatter_map(&[], Pollutant::No2);
        assert!(map.features.is_empty());
        assert!(!map.foreign_members.unwrap().contains_key("range"));
    }
}
