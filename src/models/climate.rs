use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Values below this marker mean "no data" in historical rainfall feeds.
pub const MISSING_DATA_MARKER: f64 = -900.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindUnit {
    #[default]
    MetersPerSecond,
    KilometersPerHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSpeed {
    pub value: f64,
    pub unit: WindUnit,
    /// Measurement height above ground
    pub height_m: f64,
}

impl WindSpeed {
    #[cfg(test)]
    pub fn meters_per_second(value: f64, height_m: f64) -> Self {
        Self {
            value,
            unit: WindUnit::MetersPerSecond,
            height_m,
        }
    }

    pub fn kilometers_per_hour(value: f64, height_m: f64) -> Self {
        Self {
            value,
            unit: WindUnit::KilometersPerHour,
            height_m,
        }
    }

    pub fn to_meters_per_second(&self) -> f64 {
        let ms = match self.unit {
            WindUnit::MetersPerSecond => self.value,
            WindUnit::KilometersPerHour => self.value / 3.6,
        };
        ms.max(0.0)
    }
}

/// One day of climate data, observed or forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateObservation {
    pub date: NaiveDate,
    pub temperature_max_c: f64,
    pub temperature_min_c: f64,
    pub temperature_mean_c: Option<f64>,
    pub relative_humidity_mean: Option<f64>,
    pub wind_speed: Option<WindSpeed>,
    /// MJ/m²/day
    pub solar_radiation: Option<f64>,
    pub precipitation_sum_mm: f64,
    pub precipitation_probability_max: Option<f64>,
    /// ET0 precomputed upstream, mm/day
    pub et0_provider: Option<f64>,
}

impl ClimateObservation {
    pub fn new(date: NaiveDate, temperature_max_c: f64, temperature_min_c: f64) -> Self {
        Self {
            date,
            temperature_max_c,
            temperature_min_c,
            temperature_mean_c: None,
            relative_humidity_mean: None,
            wind_speed: None,
            solar_radiation: None,
            precipitation_sum_mm: 0.0,
            precipitation_probability_max: None,
            et0_provider: None,
        }
    }

    pub fn with_humidity(mut self, rh: f64) -> Self {
        self.relative_humidity_mean = Some(rh);
        self
    }

    pub fn with_wind(mut self, wind: WindSpeed) -> Self {
        self.wind_speed = Some(wind);
        self
    }

    pub fn with_solar_radiation(mut self, rs: f64) -> Self {
        self.solar_radiation = Some(rs);
        self
    }

    pub fn with_precipitation(mut self, mm: f64) -> Self {
        self.precipitation_sum_mm = mm;
        self
    }

    pub fn with_provider_et0(mut self, et0: f64) -> Self {
        self.et0_provider = Some(et0);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub wind_speed: Option<WindSpeed>,
    pub precipitation_mm: Option<f64>,
}

/// Daily forecast, first entry is today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub current: Option<CurrentConditions>,
    pub daily: Vec<ClimateObservation>,
}

impl WeatherForecast {
    pub fn next_days(&self, days: usize) -> &[ClimateObservation] {
        &self.daily[..days.min(self.daily.len())]
    }

    /// Total forecast rain over the next N days
    pub fn rain_next_days(&self, days: usize) -> f64 {
        self.next_days(days)
            .iter()
            .map(|d| d.precipitation_sum_mm.max(0.0))
            .sum()
    }

    /// Largest single-day rain over the next N days
    pub fn max_daily_rain_next_days(&self, days: usize) -> Option<f64> {
        self.next_days(days)
            .iter()
            .map(|d| d.precipitation_sum_mm)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn max_temp_next_days(&self, days: usize) -> Option<f64> {
        self.next_days(days)
            .iter()
            .map(|d| d.temperature_max_c)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.current.as_ref().and_then(|c| c.temperature_c)
    }

    pub fn today(&self) -> Option<&ClimateObservation> {
        self.daily.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RainfallObservation {
    pub date: NaiveDate,
    pub precipitation_mm: f64,
}

impl RainfallObservation {
    pub fn is_missing(&self) -> bool {
        self.precipitation_mm < MISSING_DATA_MARKER
    }
}

/// Drop "no data" markers from a historical rainfall series.
pub fn filter_missing_rainfall(series: Vec<RainfallObservation>) -> Vec<RainfallObservation> {
    series.into_iter().filter(|r| !r.is_missing()).collect()
}

/// ET0 series computed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderEt0 {
    pub date: NaiveDate,
    pub et0: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64, rain: f64, tmax: f64) -> ClimateObservation {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap() + chrono::Duration::days(offset);
        ClimateObservation::new(date, tmax, 22.0).with_precipitation(rain)
    }

    #[test]
    fn wind_speed_normalizes_kmh() {
        let wind = WindSpeed::kilometers_per_hour(18.0, 10.0);
        assert!((wind.to_meters_per_second() - 5.0).abs() < 1e-9);
        let wind = WindSpeed::meters_per_second(2.0, 2.0);
        assert_eq!(wind.to_meters_per_second(), 2.0);
    }

    #[test]
    fn negative_wind_clamps_to_zero() {
        assert_eq!(WindSpeed::meters_per_second(-1.0, 2.0).to_meters_per_second(), 0.0);
    }

    #[test]
    fn forecast_window_helpers() {
        let forecast = WeatherForecast {
            latitude: None,
            longitude: None,
            current: None,
            daily: vec![day(0, 2.0, 30.0), day(1, 12.0, 34.0), day(2, 0.0, 31.0), day(3, 90.0, 36.0)],
        };
        assert!((forecast.rain_next_days(3) - 14.0).abs() < 1e-9);
        assert_eq!(forecast.max_daily_rain_next_days(3), Some(12.0));
        assert_eq!(forecast.max_temp_next_days(3), Some(34.0));
        assert_eq!(forecast.next_days(10).len(), 4);
    }

    #[test]
    fn empty_forecast_has_no_maxima() {
        let forecast = WeatherForecast {
            latitude: None,
            longitude: None,
            current: None,
            daily: vec![],
        };
        assert_eq!(forecast.rain_next_days(3), 0.0);
        assert!(forecast.max_temp_next_days(3).is_none());
        assert!(forecast.today().is_none());
    }

    #[test]
    fn missing_rainfall_markers_are_filtered() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let series = vec![
            RainfallObservation { date, precipitation_mm: 4.0 },
            RainfallObservation { date, precipitation_mm: -999.0 },
            RainfallObservation { date, precipitation_mm: 0.0 },
        ];
        let kept = filter_missing_rainfall(series);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.precipitation_mm >= 0.0));
    }
}
