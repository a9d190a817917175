// Configuration loading and parsing (config/hoopscope.toml).

use hoopscope_core::filter::{EventFilter, PlayerSelection};
use hoopscope_core::geometry::{CourtGeometry, Orientation};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the single config file under `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "hoopscope.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub cohort: CohortConfig,
    pub court: CourtGeometry,
    pub orientation: Orientation,
    pub view: EventFilter,
    pub export: ExportConfig,
}

// ---------------------------------------------------------------------------
// hoopscope.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire hoopscope.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    source: SourceConfig,
    cohort: CohortConfig,
    #[serde(default)]
    court: CourtSection,
    #[serde(default)]
    view: ViewSection,
    #[serde(default)]
    export: ExportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    Directory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Player payloads are fetched from `{base_url}/{id}`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Player payloads are read from `{directory}/{id}.json`.
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohortConfig {
    /// Fetch order. Each id is requested once.
    pub player_ids: Vec<i64>,
}

/// `[court]`: an orientation plus any `CourtGeometry` field overrides.
#[derive(Debug, Clone, Default, Deserialize)]
struct CourtSection {
    #[serde(default)]
    orientation: Orientation,
    #[serde(flatten)]
    geometry: CourtGeometry,
}

/// `player` is either the string "all" or a player id.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PlayerChoice {
    Id(i64),
    Named(String),
}

#[derive(Debug, Clone, Deserialize)]
struct ViewSection {
    #[serde(default)]
    player: Option<PlayerChoice>,
    #[serde(default = "default_true")]
    show_shots: bool,
    #[serde(default = "default_true")]
    show_passes: bool,
    #[serde(default = "default_true")]
    show_turnovers: bool,
}

impl Default for ViewSection {
    fn default() -> Self {
        Self {
            player: None,
            show_shots: true,
            show_passes: true,
            show_turnovers: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    /// Write ranked summaries here as CSV when set.
    #[serde(default)]
    pub summaries_csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/hoopscope.toml` relative to `base_dir`.
///
/// This does not copy defaults; prefer `load_config()` for normal startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let selection = match file.view.player {
        None => PlayerSelection::All,
        Some(PlayerChoice::Id(id)) => PlayerSelection::Player(id),
        Some(PlayerChoice::Named(s)) if s.eq_ignore_ascii_case("all") => PlayerSelection::All,
        Some(PlayerChoice::Named(s)) => {
            return Err(ConfigError::ValidationError {
                field: "view.player".into(),
                message: format!("expected \"all\" or a player id, got {s:?}"),
            });
        }
    };

    let config = Config {
        source: file.source,
        cohort: file.cohort,
        court: file.court.geometry,
        orientation: file.court.orientation,
        view: EventFilter {
            selection,
            show_shots: file.view.show_shots,
            show_passes: file.view.show_passes,
            show_turnovers: file.view.show_turnovers,
        },
        export: file.export,
    };

    validate(&config)?;

    Ok(config)
}

/// Seed `config/hoopscope.toml` from `defaults/` when it does not exist yet.
///
/// Returns the path written, or `None` when the user's file is already in
/// place. An existing file is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let default = base_dir.join("defaults").join(CONFIG_FILE);
    let copy_err = |what: &str, path: &Path, e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to {what} {}: {e}", path.display()),
    };

    let content = std::fs::read(&default).map_err(|e| copy_err("read", &default, e))?;
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| copy_err("create", dir, e))?;
    }

    // create_new so a file that appeared since the check above is left alone
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_err("create", &target, e)),
    };
    std::io::Write::write_all(&mut dest, &content).map_err(|e| copy_err("write", &target, e))?;

    info!("Created {} from defaults", target.display());
    Ok(Some(target))
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let source = &config.source;
    if source.timeout_secs == 0 {
        return Err(invalid("source.timeout_secs", "must be greater than 0"));
    }
    match source.kind {
        SourceKind::Http if is_blank(&source.base_url) => {
            return Err(invalid("source.base_url", "required when kind = \"http\""));
        }
        SourceKind::Directory if is_blank(&source.directory) => {
            return Err(invalid("source.directory", "required when kind = \"directory\""));
        }
        _ => {}
    }

    let ids = &config.cohort.player_ids;
    if ids.is_empty() {
        return Err(invalid("cohort.player_ids", "must list at least one player"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(invalid(
            "cohort.player_ids",
            format!("player id {dup} is listed more than once"),
        ));
    }

    // Court dimensions must be positive
    let c = &config.court;
    let dims: &[(&str, f64)] = &[
        ("court.px_per_ft", c.px_per_ft),
        ("court.court_width_ft", c.court_width_ft),
        ("court.court_length_ft", c.court_length_ft),
        ("court.lane_width_ft", c.lane_width_ft),
        ("court.ft_circle_radius_ft", c.ft_circle_radius_ft),
        ("court.ft_circle_center_y_ft", c.ft_circle_center_y_ft),
        ("court.corner_three_ft", c.corner_three_ft),
        ("court.arc_radius_ft", c.arc_radius_ft),
    ];
    for (name, val) in dims {
        if val.is_nan() || *val <= 0.0 {
            return Err(invalid(name, format!("must be > 0, got {val}")));
        }
    }
    if c.y_max_ft <= c.y_min_ft {
        return Err(invalid(
            "court.y_max_ft",
            format!("must be greater than y_min_ft ({})", c.y_min_ft),
        ));
    }
    let tolerances: &[(&str, f64)] = &[
        ("court.zone_epsilon_ft", c.zone_epsilon_ft),
        ("court.angle_epsilon_rad", c.angle_epsilon_rad),
    ];
    for (name, val) in tolerances {
        if !val.is_finite() || *val < 0.0 {
            return Err(invalid(name, format!("must be a finite value >= 0, got {val}")));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Path to the hoopscope-app crate root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        if cwd.join("defaults").exists() {
            cwd
        } else if cwd.join("crates/hoopscope-app/defaults").exists() {
            cwd.join("crates/hoopscope-app")
        } else {
            panic!("Cannot locate defaults/ directory from CWD {:?}", cwd);
        }
    }

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("inline.toml"))
    }

    fn validation_field(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    const MINIMAL: &str = r#"
[source]
kind = "directory"
directory = "data/players"

[cohort]
player_ids = [3, 1, 2]
"#;

    #[test]
    fn load_default_config_file() {
        let root = project_root();
        let text = fs::read_to_string(root.join("defaults").join(CONFIG_FILE)).unwrap();
        let config = parse(&text).expect("defaults should be valid");

        assert_eq!(config.source.kind, SourceKind::Http);
        assert!(config.source.base_url.is_some());
        assert_eq!(config.source.timeout_secs, 10);
        assert_eq!(config.cohort.player_ids, (0..10).collect::<Vec<i64>>());
        assert_eq!(config.court, CourtGeometry::default());
        assert_eq!(config.orientation, Orientation::AsDiagram);
        assert_eq!(config.view, EventFilter::default());
        assert!(config.export.summaries_csv.is_none());
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert_eq!(config.source.kind, SourceKind::Directory);
        assert_eq!(config.source.directory.as_deref(), Some("data/players"));
        assert_eq!(config.source.timeout_secs, 10);
        assert_eq!(config.cohort.player_ids, vec![3, 1, 2]);
        assert_eq!(config.court, CourtGeometry::default());
        assert_eq!(config.view.selection, PlayerSelection::All);
        assert!(config.view.show_turnovers);
    }

    #[test]
    fn court_overrides_and_orientation() {
        let text = format!(
            "{MINIMAL}\n[court]\norientation = \"negate_y\"\narc_radius_ft = 22.15\ncorner_three_ft = 21\n"
        );
        let config = parse(&text).unwrap();
        assert_eq!(config.orientation, Orientation::NegateY);
        assert!((config.court.arc_radius_ft - 22.15).abs() < f64::EPSILON);
        assert!((config.court.corner_three_ft - 21.0).abs() < f64::EPSILON);
        assert!((config.court.lane_width_ft - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn view_player_accepts_all_or_id() {
        let one = format!("{MINIMAL}\n[view]\nplayer = 2\nshow_passes = false\n");
        let config = parse(&one).unwrap();
        assert_eq!(config.view.selection, PlayerSelection::Player(2));
        assert!(!config.view.show_passes);
        assert!(config.view.show_shots);

        let all = format!("{MINIMAL}\n[view]\nplayer = \"ALL\"\n");
        assert_eq!(parse(&all).unwrap().view.selection, PlayerSelection::All);

        let bad = format!("{MINIMAL}\n[view]\nplayer = \"someone\"\n");
        assert_eq!(validation_field(parse(&bad).unwrap_err()), "view.player");
    }

    #[test]
    fn rejects_empty_cohort() {
        let text = MINIMAL.replace("[3, 1, 2]", "[]");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "cohort.player_ids");
    }

    #[test]
    fn rejects_duplicate_player_ids() {
        let text = MINIMAL.replace("[3, 1, 2]", "[3, 1, 3]");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "cohort.player_ids");
    }

    #[test]
    fn rejects_zero_timeout() {
        let text = MINIMAL.replace("kind = \"directory\"", "kind = \"directory\"\ntimeout_secs = 0");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "source.timeout_secs");
    }

    #[test]
    fn rejects_missing_source_location() {
        let http = MINIMAL.replace("kind = \"directory\"", "kind = \"http\"");
        assert_eq!(validation_field(parse(&http).unwrap_err()), "source.base_url");

        let dir = MINIMAL.replace("directory = \"data/players\"", "directory = \"  \"");
        assert_eq!(validation_field(parse(&dir).unwrap_err()), "source.directory");
    }

    #[test]
    fn rejects_non_positive_court_dimensions() {
        let text = format!("{MINIMAL}\n[court]\nlane_width_ft = 0\n");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "court.lane_width_ft");

        let text = format!("{MINIMAL}\n[court]\ny_max_ft = -10\n");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "court.y_max_ft");
    }

    #[test]
    fn rejects_negative_or_non_finite_tolerances() {
        let text = format!("{MINIMAL}\n[court]\nzone_epsilon_ft = -0.1\n");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "court.zone_epsilon_ft");

        let text = format!("{MINIMAL}\n[court]\nzone_epsilon_ft = nan\n");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "court.zone_epsilon_ft");

        let text = format!("{MINIMAL}\n[court]\nangle_epsilon_rad = inf\n");
        assert_eq!(validation_field(parse(&text).unwrap_err()), "court.angle_epsilon_rad");

        let text = format!("{MINIMAL}\n[court]\nzone_epsilon_ft = 0.0\n");
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn unknown_source_kind_is_parse_error() {
        let text = MINIMAL.replace("kind = \"directory\"", "kind = \"ftp\"");
        assert!(matches!(parse(&text), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn missing_config_file() {
        let tmp = std::env::temp_dir().join("hoopscope_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_copies_without_overwriting() {
        let tmp = std::env::temp_dir().join("hoopscope_config_test_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();

        let root = project_root();
        fs::copy(
            root.join("defaults").join(CONFIG_FILE),
            tmp.join("defaults").join(CONFIG_FILE),
        )
        .unwrap();

        let copied = ensure_config_file(&tmp).unwrap();
        assert_eq!(copied, Some(tmp.join("config").join(CONFIG_FILE)));
        load_config_from(&tmp).expect("copied defaults should load");

        // A user edit survives a second run.
        fs::write(tmp.join("config").join(CONFIG_FILE), MINIMAL).unwrap();
        assert_eq!(ensure_config_file(&tmp).unwrap(), None);
        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.cohort.player_ids, vec![3, 1, 2]);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_keeps_user_file_without_defaults() {
        let tmp = std::env::temp_dir().join("hoopscope_config_test_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), MINIMAL).unwrap();

        assert_eq!(ensure_config_file(&tmp).unwrap(), None);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_file_without_defaults_fails() {
        let tmp = std::env::temp_dir().join("hoopscope_config_test_empty");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_file(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultsCopyError { .. }));
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }
}
