use chrono::NaiveDate;
use log::info;

use crate::algorithms::color_scale::rate_to_color;
use crate::api::{
    DeploymentPoint, DetectionMapData, FeatureCollection, FeatureProperties, LegendEntry,
    MapFeature, PointGeometry, RateDomain,
};
use crate::services::legend::build_legend;

/// Compute the rate domain used to calibrate the color scale.
///
/// Only strictly-positive rates participate; zero means "no detections" and
/// is styled separately, never statistically binned with positive values.
/// Breakpoints are nearest-rank (`floor(0.33 n)` / `floor(0.66 n)`) rather
/// than interpolated: sparse ecological samples do not support the implied
/// precision of a smoothed percentile.
pub fn compute_rate_domain(rates: &[f64]) -> RateDomain {
    let mut positive: Vec<f64> = rates.iter().copied().filter(|r| *r > 0.0).collect();
    if positive.is_empty() {
        return RateDomain::ZERO;
    }
    positive.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = positive.len();
    RateDomain {
        min: positive[0],
        max: positive[n - 1],
        p33: positive[(0.33 * n as f64).floor() as usize],
        p66: positive[(0.66 * n as f64).floor() as usize],
    }
}

/// Compute detection map data with colors, band labels and legend.
/// This function takes the raw deployment points and computes everything
/// needed for visualization.
pub fn compute_detection_map_data(
    points: Vec<DeploymentPoint>,
) -> Result<DetectionMapData, String> {
    if points.is_empty() {
        return Ok(DetectionMapData {
            points: vec![],
            legend: build_legend(&RateDomain::ZERO),
            domain: RateDomain::ZERO,
            rate_min: 0.0,
            rate_max: 0.0,
            lon_min: -180.0,
            lon_max: 180.0,
            lat_min: -90.0,
            lat_max: 90.0,
            total_count: 0,
            active_count: 0,
            survey_start: None,
            survey_end: None,
        });
    }

    // Compute statistics
    let mut rate_min = f64::MAX;
    let mut rate_max = f64::MIN;
    let mut lon_min = f64::MAX;
    let mut lon_max = f64::MIN;
    let mut lat_min = f64::MAX;
    let mut lat_max = f64::MIN;
    let mut active_count = 0;
    let mut survey_start: Option<NaiveDate> = None;
    let mut survey_end: Option<NaiveDate> = None;

    for point in &points {
        rate_min = rate_min.min(point.detection_rate);
        rate_max = rate_max.max(point.detection_rate);
        lon_min = lon_min.min(point.longitude);
        lon_max = lon_max.max(point.longitude);
        lat_min = lat_min.min(point.latitude);
        lat_max = lat_max.max(point.latitude);

        if point.detection_rate > 0.0 {
            active_count += 1;
        }

        if let Some(period) = &point.period {
            survey_start = Some(survey_start.map_or(period.start, |d| d.min(period.start)));
            survey_end = Some(survey_end.map_or(period.end, |d| d.max(period.end)));
        }
    }

    let rates: Vec<f64> = points.iter().map(|p| p.detection_rate).collect();
    let domain = compute_rate_domain(&rates);
    let legend = build_legend(&domain);
    let domain_max = domain.is_informative().then_some(domain.max);

    // Assign colors and band labels to points
    let total_count = points.len();
    let mut styled_points = points;
    for point in &mut styled_points {
        point.color = rate_to_color(point.detection_rate, domain_max);
        point.rate_band = band_label(&legend, &domain, point.detection_rate);
    }

    info!(
        "computed detection map: {} deployments, {} with detections, domain max {:.2}",
        total_count, active_count, domain.max
    );

    Ok(DetectionMapData {
        points: styled_points,
        legend,
        domain,
        rate_min,
        rate_max,
        lon_min,
        lon_max,
        lat_min,
        lat_max,
        total_count,
        active_count,
        survey_start,
        survey_end,
    })
}

/// Label of the legend band containing `rate`.
fn band_label(legend: &[LegendEntry], domain: &RateDomain, rate: f64) -> String {
    if !(rate > 0.0) || legend.len() < 4 {
        return legend[0].label.clone();
    }
    if rate <= domain.p33 {
        legend[1].label.clone()
    } else if rate <= domain.p66 {
        legend[2].label.clone()
    } else {
        legend[3].label.clone()
    }
}

/// Convert assembled map data into the GeoJSON shape the map widget consumes.
pub fn to_feature_collection(data: &DetectionMapData) -> FeatureCollection {
    let features = data
        .points
        .iter()
        .map(|point| MapFeature {
            feature_type: "Feature".to_string(),
            geometry: PointGeometry {
                geometry_type: "Point".to_string(),
                coordinates: [point.longitude, point.latitude],
            },
            properties: FeatureProperties {
                deployment_id: point.deployment_id.clone(),
                site_name: point.site_name.clone(),
                detection_rate: point.detection_rate,
                detections: point.detections,
                rate_band: point.rate_band.clone(),
                color: point.color.clone(),
            },
        })
        .collect();

    FeatureCollection {
        collection_type: "FeatureCollection".to_string(),
        features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DeploymentPeriod;
    use chrono::NaiveDate;

    fn create_test_point(id: &str, rate: f64, lon: f64, lat: f64) -> DeploymentPoint {
        DeploymentPoint {
            deployment_id: id.to_string(),
            site_name: format!("site {}", id),
            longitude: lon,
            latitude: lat,
            detection_rate: rate,
            detections: (rate * 3.0).max(0.0) as u64,
            rate_band: String::new(),
            color: String::new(),
            period: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compute_rate_domain_empty() {
        assert_eq!(compute_rate_domain(&[]), RateDomain::ZERO);
    }

    #[test]
    fn test_compute_rate_domain_all_zero() {
        assert_eq!(compute_rate_domain(&[0.0, 0.0, 0.0]), RateDomain::ZERO);
    }

    #[test]
    fn test_compute_rate_domain_single_value() {
        let domain = compute_rate_domain(&[5.0]);
        assert_eq!(domain.min, 5.0);
        assert_eq!(domain.max, 5.0);
        assert_eq!(domain.p33, 5.0);
        assert_eq!(domain.p66, 5.0);
    }

    #[test]
    fn test_compute_rate_domain_ignores_zeros() {
        // Zeros never shift the percentile ranks of the positive subset.
        let with_zeros = compute_rate_domain(&[0.0, 2.0, 0.0, 8.0, 5.0, 0.0]);
        let without = compute_rate_domain(&[2.0, 8.0, 5.0]);
        assert_eq!(with_zeros, without);
    }

    #[test]
    fn test_compute_rate_domain_nearest_rank_indices() {
        // n = 3: indices floor(0.99) = 0 and floor(1.98) = 1.
        let domain = compute_rate_domain(&[3.0, 1.0, 2.0]);
        assert_eq!(domain.p33, 1.0);
        assert_eq!(domain.p66, 2.0);

        // n = 10: indices floor(3.3) = 3 and floor(6.6) = 6.
        let rates: Vec<f64> = (1..=10).map(f64::from).collect();
        let domain = compute_rate_domain(&rates);
        assert_eq!(domain.min, 1.0);
        assert_eq!(domain.p33, 4.0);
        assert_eq!(domain.p66, 7.0);
        assert_eq!(domain.max, 10.0);
    }

    #[test]
    fn test_compute_rate_domain_ordering() {
        let rates = vec![9.7, 0.3, 4.1, 12.5, 0.0, 2.2, 7.8];
        let domain = compute_rate_domain(&rates);
        assert!(domain.min <= domain.p33);
        assert!(domain.p33 <= domain.p66);
        assert!(domain.p66 <= domain.max);
    }

    #[test]
    fn test_compute_detection_map_data_empty() {
        let result = compute_detection_map_data(vec![]);

        assert!(result.is_ok());
        let data = result.unwrap();

        assert_eq!(data.points.len(), 0);
        assert_eq!(data.legend.len(), 1);
        assert_eq!(data.legend[0].label, "0");
        assert_eq!(data.domain, RateDomain::ZERO);
        assert_eq!(data.lon_min, -180.0);
        assert_eq!(data.lon_max, 180.0);
        assert_eq!(data.lat_min, -90.0);
        assert_eq!(data.lat_max, 90.0);
        assert_eq!(data.total_count, 0);
        assert_eq!(data.active_count, 0);
        assert!(data.survey_start.is_none());
        assert!(data.survey_end.is_none());
    }

    #[test]
    fn test_compute_detection_map_data_counts_and_bounds() {
        let points = vec![
            create_test_point("d1", 0.0, -71.5, 44.2),
            create_test_point("d2", 3.5, -71.9, 44.8),
            create_test_point("d3", 8.0, -70.8, 43.9),
        ];
        let data = compute_detection_map_data(points).unwrap();

        assert_eq!(data.total_count, 3);
        assert_eq!(data.active_count, 2);
        assert_eq!(data.rate_min, 0.0);
        assert_eq!(data.rate_max, 8.0);
        assert_eq!(data.lon_min, -71.9);
        assert_eq!(data.lon_max, -70.8);
        assert_eq!(data.lat_min, 43.9);
        assert_eq!(data.lat_max, 44.8);
    }

    #[test]
    fn test_compute_detection_map_data_survey_range() {
        let mut early = create_test_point("d1", 1.0, 0.0, 0.0);
        early.period = DeploymentPeriod::new(date(2024, 2, 1), date(2024, 3, 15));
        let mut late = create_test_point("d2", 2.0, 1.0, 1.0);
        late.period = DeploymentPeriod::new(date(2024, 3, 1), date(2024, 5, 10));
        let unperioded = create_test_point("d3", 3.0, 2.0, 2.0);

        let data = compute_detection_map_data(vec![early, late, unperioded]).unwrap();
        assert_eq!(data.survey_start, Some(date(2024, 2, 1)));
        assert_eq!(data.survey_end, Some(date(2024, 5, 10)));
    }

    #[test]
    fn test_compute_detection_map_data_zero_rate_sentinel_color() {
        let points = vec![
            create_test_point("quiet", 0.0, 0.0, 0.0),
            create_test_point("busy", 10.0, 1.0, 1.0),
        ];
        let data = compute_detection_map_data(points).unwrap();

        let quiet = data.points.iter().find(|p| p.detection_rate == 0.0).unwrap();
        assert_eq!(quiet.color, "#ffffd9");
        assert_eq!(quiet.rate_band, "0");

        let busy = data.points.iter().find(|p| p.detection_rate == 10.0).unwrap();
        assert_eq!(busy.color, "#081d58");
    }

    #[test]
    fn test_compute_detection_map_data_band_assignment() {
        let points = vec![
            create_test_point("low", 1.0, 0.0, 0.0),
            create_test_point("mid", 5.0, 0.0, 0.0),
            create_test_point("high", 9.0, 0.0, 0.0),
        ];
        let data = compute_detection_map_data(points).unwrap();

        // n = 3 positives [1, 5, 9]: p33 = 1, p66 = 5.
        let low = data.points.iter().find(|p| p.deployment_id == "low").unwrap();
        let mid = data.points.iter().find(|p| p.deployment_id == "mid").unwrap();
        let high = data.points.iter().find(|p| p.deployment_id == "high").unwrap();
        assert_eq!(low.rate_band, data.legend[1].label);
        assert_eq!(mid.rate_band, data.legend[2].label);
        assert_eq!(high.rate_band, data.legend[3].label);
    }

    #[test]
    fn test_compute_detection_map_data_all_zero_rates() {
        let points = vec![
            create_test_point("d1", 0.0, 0.0, 0.0),
            create_test_point("d2", 0.0, 1.0, 1.0),
        ];
        let data = compute_detection_map_data(points).unwrap();

        assert_eq!(data.legend.len(), 1);
        assert_eq!(data.active_count, 0);
        assert!(!data.domain.is_informative());
        for point in &data.points {
            assert_eq!(point.color, "#ffffd9");
            assert_eq!(point.rate_band, "0");
        }
    }

    #[test]
    fn test_to_feature_collection() {
        let points = vec![
            create_test_point("d1", 0.0, -71.5, 44.2),
            create_test_point("d2", 4.0, -70.8, 43.9),
        ];
        let data = compute_detection_map_data(points).unwrap();
        let collection = to_feature_collection(&data);

        assert_eq!(collection.collection_type, "FeatureCollection");
        assert_eq!(collection.features.len(), 2);

        let feature = &collection.features[0];
        assert_eq!(feature.feature_type, "Feature");
        assert_eq!(feature.geometry.geometry_type, "Point");
        assert_eq!(feature.geometry.coordinates, [-71.5, 44.2]);
        assert_eq!(feature.properties.color, data.points[0].color);
        assert_eq!(feature.properties.rate_band, data.points[0].rate_band);
    }
}
