use crate::error::{Result, SigirError};
use crate::logic::EngineConfig;
use crate::models::{FieldProfile, SoilType};
use chrono::NaiveDate;
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub field: FieldProfile,
    pub backend: BackendConfig,
    #[serde(default)]
    pub open_meteo: Option<OpenMeteoConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// SIGIR backend API (weather, rainfall, topography, NDVI, SMI, ETP).
#[derive(Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub url: String,
    #[serde(default)]
    pub token: String,
    /// Backend field id, when it differs from `field.id`
    #[serde(default)]
    pub field_id: Option<String>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("token", &"[REDACTED]")
            .field("field_id", &self.field_id)
            .finish()
    }
}

/// Direct Open-Meteo forecast, used instead of the backend's weather endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenMeteoConfig {
    #[serde(default = "default_open_meteo_url")]
    pub url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_open_meteo_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}

fn default_timezone() -> String {
    "Africa/Abidjan".into()
}

fn default_forecast_days() -> u32 {
    7
}

fn default_enabled() -> bool {
    true
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            url: default_open_meteo_url(),
            timezone: default_timezone(),
            forecast_days: default_forecast_days(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Per-source limit; satellite-backed endpoints can be slow
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_rainfall_days")]
    pub rainfall_days: u32,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_rainfall_days() -> u32 {
    30
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            rainfall_days: default_rainfall_days(),
        }
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(SigirError::Config(format!(
                "Config file not found at {:?}. Run `sigir init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SigirError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| SigirError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.field.id.trim().is_empty() {
            return Err(SigirError::Config("field.id must not be empty".into()));
        }
        if self.backend.url.trim().is_empty() {
            return Err(SigirError::Config("backend.url must not be empty".into()));
        }
        if self.field.cycle_length_days == 0 {
            return Err(SigirError::Config(
                "field.cycle_length_days must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Field id as the backend knows it
    pub fn backend_field_id(&self) -> &str {
        self.backend.field_id.as_deref().unwrap_or(&self.field.id)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// ~/.config/sigir/config.yaml
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SigirError::Config("Cannot determine config directory".into()))?
            .join("sigir");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive(target: Option<PathBuf>) -> Result<Self> {
        println!();
        println!("Configuration de SIGIR");
        println!();

        println!("Parcelle");
        let field_id: String = prompt_text("  Identifiant", "parcelle-1")?;
        let name: String = prompt_text("  Nom", "Parcelle principale")?;
        let variety: String = prompt_text("  Variété", "WITA 9")?;

        let cycle_length_days: u32 = Input::new()
            .with_prompt("  Durée du cycle (jours)")
            .default(crate::models::DEFAULT_CYCLE_LENGTH_DAYS)
            .interact_text()
            .map_err(input_error)?;

        let planting: String = Input::new()
            .with_prompt("  Date de semis (AAAA-MM-JJ, vide si inconnue)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;
        let planting_date = if planting.trim().is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(planting.trim(), "%Y-%m-%d")
                    .map_err(|e| SigirError::Config(format!("Invalid planting date: {}", e)))?,
            )
        };

        let soil: String = prompt_text("  Type de sol (argileux, limoneux, ...)", "argilo-limoneux")?;

        let latitude: f64 = Input::new()
            .with_prompt("  Latitude")
            .default(7.69)
            .interact_text()
            .map_err(input_error)?;

        let longitude: f64 = Input::new()
            .with_prompt("  Longitude")
            .default(-5.03)
            .interact_text()
            .map_err(input_error)?;

        let elevation: f64 = Input::new()
            .with_prompt("  Altitude (m)")
            .default(370.0)
            .interact_text()
            .map_err(input_error)?;

        println!();

        println!("Backend SIGIR");
        let url: String = prompt_text("  URL", "http://localhost:8000")?;
        let token: String = Password::new()
            .with_prompt("  Jeton (laisser vide si aucun)")
            .allow_empty_password(true)
            .interact()
            .map_err(input_error)?;

        println!();

        let use_open_meteo = dialoguer::Confirm::new()
            .with_prompt("Utiliser Open-Meteo pour les prévisions ?")
            .default(true)
            .interact()
            .map_err(input_error)?;

        let mut field = FieldProfile::new(field_id, name)
            .with_location(latitude, longitude)
            .with_elevation(elevation);
        field.variety = variety;
        field.cycle_length_days = cycle_length_days;
        field.planting_date = planting_date;
        field.soil_type = SoilType::from_str(&soil);

        let config = Config {
            field,
            backend: BackendConfig {
                url,
                token,
                field_id: None,
            },
            open_meteo: use_open_meteo.then(OpenMeteoConfig::default),
            sync: SyncConfig::default(),
            engine: EngineConfig::default(),
        };
        config.validate()?;

        let config_path = match target {
            Some(p) => p,
            None => Self::default_config_path()?,
        };
        config.save(&config_path)?;

        println!("Configuration enregistrée dans {}", config_path.display());
        println!();

        Ok(config)
    }

    /// Serializes to YAML under a short header, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| SigirError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# SIGIR Configuration\n# Generated by `sigir init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(path, content)?;
        Ok(())
    }

    fn substitute_env_vars(content: &str) -> String {
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return content.to_string();
        };

        re.replace_all(content, |caps: &regex_lite::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("SIGIR_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SigirError::Config("Cannot determine data directory".into()))?
            .join("sigir");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("sigir.db"))
    }
}

fn prompt_text(prompt: &str, default: &str) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()
        .map_err(input_error)
}

fn input_error(e: dialoguer::Error) -> SigirError {
    SigirError::Config(format!("Input error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
field:
  id: parcelle-7
  name: Bas-fond
  planting_date: 2025-05-01
  latitude: 7.69
  longitude: -5.03
backend:
  url: http://localhost:8000
"#;

    #[test]
    fn shipped_example_parses() {
        let config = Config::parse(include_str!("../config/config.yaml.example")).unwrap();
        assert_eq!(config.field.soil_type, Some(SoilType::ClayLoam));
        assert_eq!(config.open_meteo.map(|o| o.forecast_days), Some(7));
        assert_eq!(config.engine.balance_window_days, 30);
        assert_eq!(config.engine.alerts, crate::logic::alerts::AlertThresholds::default());
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::parse(MINIMAL).unwrap();
        assert_eq!(config.field.variety, "WITA 9");
        assert_eq!(config.field.cycle_length_days, 120);
        assert!(config.open_meteo.is_none());
        assert_eq!(config.sync.timeout_secs, 60);
        assert_eq!(config.sync.rainfall_days, 30);
        assert_eq!(config.engine.water_balance.irrigation_efficiency, 0.75);
        assert_eq!(config.engine.recommendation.critical_smi, 15.0);
        assert_eq!(config.backend_field_id(), "parcelle-7");
    }

    #[test]
    fn engine_overrides_are_partial() {
        let yaml = format!(
            "{}engine:\n  water_balance:\n    infiltration_rate_mm: 3.0\n  et0:\n    estimate_missing_solar: false\n  alerts:\n    deficit_smi: 25\n",
            MINIMAL
        );
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.engine.water_balance.infiltration_rate_mm, 3.0);
        assert_eq!(config.engine.water_balance.effective_rain_factor, 0.8);
        assert!(!config.engine.et0.estimate_missing_solar);
        assert_eq!(config.engine.et0.albedo, 0.23);
        assert_eq!(config.engine.alerts.deficit_smi, 25.0);
        assert_eq!(config.engine.alerts.severe_deficit_smi, 20.0);
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("SIGIR_TEST_BACKEND_TOKEN", "s3cret");
        let yaml = MINIMAL.replace(
            "url: http://localhost:8000",
            "url: http://localhost:8000\n  token: ${SIGIR_TEST_BACKEND_TOKEN}",
        );
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.backend.token, "s3cret");
        assert!(!format!("{:?}", config.backend).contains("s3cret"));
    }

    #[test]
    fn unknown_env_vars_are_left_in_place() {
        let out = Config::substitute_env_vars("token: ${SIGIR_TEST_SURELY_UNSET_VAR}");
        assert_eq!(out, "token: ${SIGIR_TEST_SURELY_UNSET_VAR}");
    }

    #[test]
    fn empty_field_id_is_rejected() {
        let yaml = MINIMAL.replace("id: parcelle-7", "id: \"\"");
        assert!(matches!(Config::parse(&yaml), Err(SigirError::Config(_))));
    }

    #[test]
    fn open_meteo_section_defaults() {
        let yaml = format!("{}open_meteo: {{}}\n", MINIMAL);
        let config = Config::parse(&yaml).unwrap();
        let om = config.open_meteo.unwrap();
        assert_eq!(om.timezone, "Africa/Abidjan");
        assert_eq!(om.forecast_days, 7);
        assert!(om.enabled);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = std::env::temp_dir().join(format!("sigir-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.yaml");

        let mut config = Config::parse(MINIMAL).unwrap();
        config.field.soil_type = Some(SoilType::Sandy);
        config.save(&path).unwrap();

        let loaded = Config::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.field.id, "parcelle-7");
        assert_eq!(loaded.field.soil_type, Some(SoilType::Sandy));
        assert_eq!(loaded.engine, config.engine);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with("# SIGIR Configuration"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn soil_type_accepts_french_spelling() {
        let yaml = MINIMAL.replace("name: Bas-fond", "name: Bas-fond\n  soil_type: argileux");
        let config = Config::parse(&yaml).unwrap();
        assert_eq!(config.field.soil_type, Some(SoilType::Clay));
    }
}
