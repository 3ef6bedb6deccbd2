use std::f64::consts::PI;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::{ClimateObservation, Et0Estimate, Et0Method, FieldProfile, WindSpeed};

/// MJ m⁻² min⁻¹
const SOLAR_CONSTANT: f64 = 0.0820;
/// MJ K⁻⁴ m⁻² day⁻¹
const STEFAN_BOLTZMANN: f64 = 4.903e-9;
/// MJ m⁻² day⁻¹ to mm day⁻¹ of evaporated water
const RADIATION_TO_EVAPORATION: f64 = 0.408;
const KELVIN: f64 = 273.16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Et0Config {
    /// Estimate solar radiation from the temperature range instead of
    /// falling back to Hargreaves when it is not measured.
    #[serde(default = "default_true")]
    pub estimate_missing_solar: bool,
    /// Hargreaves radiation adjustment coefficient (k_Rs)
    #[serde(default = "default_krs")]
    pub radiation_coefficient: f64,
    #[serde(default = "default_albedo")]
    pub albedo: f64,
}

fn default_true() -> bool {
    true
}

fn default_krs() -> f64 {
    0.17
}

fn default_albedo() -> f64 {
    0.23
}

impl Default for Et0Config {
    fn default() -> Self {
        Self {
            estimate_missing_solar: default_true(),
            radiation_coefficient: default_krs(),
            albedo: default_albedo(),
        }
    }
}

/// Location terms the radiation balance needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub latitude: Option<f64>,
    pub elevation_m: f64,
}

impl Site {
    pub fn new(latitude: f64, elevation_m: f64) -> Self {
        Self {
            latitude: Some(latitude),
            elevation_m,
        }
    }

    /// Elevation falls back to the surveyed topography, then sea level.
    pub fn for_field(profile: &FieldProfile, surveyed_elevation_m: Option<f64>) -> Self {
        Self {
            latitude: profile.latitude,
            elevation_m: profile
                .elevation_m
                .or(surveyed_elevation_m)
                .unwrap_or(0.0),
        }
    }
}

/// Saturation vapour pressure at temperature `t` (°C), kPa
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    0.6108 * ((17.27 * t) / (t + 237.3)).exp()
}

/// Slope of the saturation vapour pressure curve, kPa/°C
pub fn vapor_pressure_slope(t_mean: f64) -> f64 {
    let denom = (t_mean + 237.3).powi(2);
    if denom <= f64::EPSILON {
        return 0.0;
    }
    4098.0 * saturation_vapor_pressure(t_mean) / denom
}

/// Atmospheric pressure from altitude, kPa
pub fn atmospheric_pressure(altitude_m: f64) -> f64 {
    let ratio = ((293.0 - 0.0065 * altitude_m) / 293.0).max(0.0);
    101.3 * ratio.powf(5.26)
}

pub fn psychrometric_constant(pressure_kpa: f64) -> f64 {
    0.665e-3 * pressure_kpa
}

/// Extraterrestrial radiation for a daily period, MJ/m²/day
pub fn extraterrestrial_radiation(latitude_deg: f64, day_of_year: u32) -> f64 {
    let angle = 2.0 * PI * day_of_year as f64 / 365.0;
    let inverse_distance = 1.0 + 0.033 * angle.cos();
    let declination = 0.409 * (angle - 1.39).sin();
    let phi = latitude_deg.to_radians();

    // Polar day and night push the argument outside [-1, 1]
    let sunset_angle = (-phi.tan() * declination.tan()).clamp(-1.0, 1.0).acos();

    let ra = (24.0 * 60.0 / PI)
        * SOLAR_CONSTANT
        * inverse_distance
        * (sunset_angle * phi.sin() * declination.sin()
            + phi.cos() * declination.cos() * sunset_angle.sin());

    ra.max(0.0)
}

/// Clear-sky solar radiation, MJ/m²/day
pub fn clear_sky_radiation(ra: f64, altitude_m: f64) -> f64 {
    (0.75 + 2e-5 * altitude_m) * ra
}

/// Wind speed at 2 m from a measurement at any height, m/s
pub fn wind_at_two_meters(wind: &WindSpeed) -> f64 {
    let speed = wind.to_meters_per_second();
    let z = wind.height_m;
    if (z - 2.0).abs() < 1e-6 {
        return speed;
    }

    let log_arg = 67.8 * z - 5.42;
    if log_arg <= 1.0 + 1e-6 {
        tracing::debug!(height_m = z, "Wind height outside log profile range, using raw speed");
        return speed;
    }
    speed * 4.87 / log_arg.ln()
}

/// Net radiation at the crop surface, MJ/m²/day. May be negative.
pub fn net_radiation(
    rs: f64,
    rso: f64,
    t_max: f64,
    t_min: f64,
    actual_vapor_pressure: f64,
    albedo: f64,
) -> f64 {
    let net_shortwave = (1.0 - albedo) * rs;

    let relative_shortwave = if rso > 0.0 {
        (rs / rso).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let mean_kelvin_4 = ((t_max + KELVIN).powi(4) + (t_min + KELVIN).powi(4)) / 2.0;
    let emissivity = 0.34 - 0.14 * actual_vapor_pressure.max(0.0).sqrt();
    let cloudiness = 1.35 * relative_shortwave - 0.35;
    let net_longwave = STEFAN_BOLTZMANN * mean_kelvin_4 * emissivity * cloudiness;

    net_shortwave - net_longwave
}

/// Daily inputs for the FAO-56 Penman-Monteith equation.
#[derive(Debug, Clone, Copy)]
pub struct PenmanMonteithInput {
    pub t_max: f64,
    pub t_min: f64,
    pub relative_humidity: f64,
    /// m/s at 2 m
    pub wind_2m: f64,
    /// Measured or estimated, MJ/m²/day
    pub solar_radiation: f64,
    /// MJ/m²/day
    pub extraterrestrial_radiation: f64,
    pub altitude_m: f64,
    pub albedo: f64,
}

/// FAO-56 Penman-Monteith reference evapotranspiration, mm/day. Soil heat flux is zero
/// for daily steps.
pub fn penman_monteith(input: &PenmanMonteithInput) -> f64 {
    let t_mean = (input.t_max + input.t_min) / 2.0;

    let gamma = psychrometric_constant(atmospheric_pressure(input.altitude_m));
    let delta = vapor_pressure_slope(t_mean);

    let es = (saturation_vapor_pressure(input.t_max) + saturation_vapor_pressure(input.t_min)) / 2.0;
    let ea = es * input.relative_humidity.clamp(0.0, 100.0) / 100.0;
    let vpd = (es - ea).max(0.0);

    let rso = clear_sky_radiation(input.extraterrestrial_radiation, input.altitude_m);
    let rn = net_radiation(
        input.solar_radiation.max(0.0),
        rso,
        input.t_max,
        input.t_min,
        ea,
        input.albedo,
    );

    let u2 = input.wind_2m.max(0.0);
    let denominator = delta + gamma * (1.0 + 0.34 * u2);
    let kelvin_mean = t_mean + 273.0;
    if denominator <= f64::EPSILON || kelvin_mean <= f64::EPSILON {
        return 0.0;
    }

    let radiation_term = RADIATION_TO_EVAPORATION * delta * rn;
    let aerodynamic_term = gamma * (900.0 / kelvin_mean) * u2 * vpd;

    ((radiation_term + aerodynamic_term) / denominator).max(0.0)
}

/// Hargreaves temperature-based estimate, mm/day.
pub fn hargreaves(t_max: f64, t_min: f64, ra: f64) -> f64 {
    let t_mean = (t_max + t_min) / 2.0;
    let range = (t_max - t_min).max(0.0);
    (0.0023 * (t_mean + 17.8) * range.sqrt() * RADIATION_TO_EVAPORATION * ra).max(0.0)
}

/// One decimal, for display
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub struct Et0Model {
    config: Et0Config,
}

impl Et0Model {
    pub fn new(config: Et0Config) -> Self {
        Self { config }
    }

    /// Estimates ET0 for one day and ETc when a crop coefficient is known.
    ///
    /// Penman-Monteith needs humidity and wind; solar radiation is estimated from the
    /// temperature range when allowed. Anything less drops to Hargreaves. Without a
    /// latitude there is no radiation term at all, so only an upstream ET0 can be used.
    pub fn estimate(
        &self,
        observation: &ClimateObservation,
        site: &Site,
        kc: Option<f64>,
    ) -> Option<Et0Estimate> {
        let (et0, method) = match site.latitude {
            Some(latitude) => self.compute(observation, latitude, site.elevation_m),
            None => {
                let provided = observation.et0_provider?;
                (provided.max(0.0), Et0Method::Provider)
            }
        };

        Some(Et0Estimate {
            date: observation.date,
            et0,
            method,
            kc,
            etc: kc.map(|kc| (et0 * kc).max(0.0)),
        })
    }

    fn compute(
        &self,
        observation: &ClimateObservation,
        latitude: f64,
        altitude_m: f64,
    ) -> (f64, Et0Method) {
        let t_max = observation.temperature_max_c;
        let t_min = observation.temperature_min_c;
        let ra = extraterrestrial_radiation(latitude, observation.date.ordinal());

        let solar = observation.solar_radiation.or_else(|| {
            self.config.estimate_missing_solar.then(|| {
                self.config.radiation_coefficient * (t_max - t_min).max(0.0).sqrt() * ra
            })
        });

        match (observation.relative_humidity_mean, observation.wind_speed, solar) {
            (Some(rh), Some(wind), Some(rs)) => {
                let input = PenmanMonteithInput {
                    t_max,
                    t_min,
                    relative_humidity: rh,
                    wind_2m: wind_at_two_meters(&wind),
                    solar_radiation: rs,
                    extraterrestrial_radiation: ra,
                    altitude_m,
                    albedo: self.config.albedo,
                };
                (penman_monteith(&input), Et0Method::PenmanMonteith)
            }
            _ => {
                tracing::debug!(
                    date = %observation.date,
                    "Incomplete climate inputs, using Hargreaves"
                );
                (hargreaves(t_max, t_min, ra), Et0Method::Hargreaves)
            }
        }
    }
}

impl Default for Et0Model {
    fn default() -> Self {
        Self::new(Et0Config::default())
    }
}
