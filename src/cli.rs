use std::{
    collections::BTreeMap,
    env,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use crate::patentdesk_core::{
    visible_records, Catalog, CatalogInsights, ControllerOptions, FilterSpec, PortfolioController,
};
use crate::patentdesk_tui::{Action, Tui, TuiConfig};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "patentdesk.json";
const LOG_FILE: &str = "patentdesk.log";
const DEFAULT_TUI_ENABLED: bool = true;
const DEFAULT_REQUIRE_LOGIN: bool = true;
const TUI_TICK_MS: u64 = 50;
const DEFAULT_MAX_INPUT_LEN: usize = 265;
const DEFAULT_RELEVANCE_STEP: u8 = 5;

pub type DynError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "patentdesk", version, about = "Patent portfolio desk")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON file with the reference catalog (defaults to the built-in set).
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_login: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    tui: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    no_tui: bool,
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    active_only: bool,
    #[arg(long, allow_hyphen_values = true)]
    min_relevance: Option<String>,
    /// Seed for generated relevance scores.
    #[arg(long)]
    seed: Option<u64>,
    /// Where logs go while the TUI owns the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct Config {
    catalog: Option<PathBuf>,
    require_login: bool,
    tui_enabled: bool,
    max_input_len: usize,
    score_seed: Option<u64>,
    relevance_step: u8,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Clone)]
struct PartialConfig {
    catalog: Option<PathBuf>,
    require_login: Option<bool>,
    tui_enabled: Option<bool>,
    max_input_len: Option<usize>,
    score_seed: Option<u64>,
    relevance_step: Option<u8>,
    log_file: Option<PathBuf>,
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        if other.catalog.is_some() {
            self.catalog = other.catalog;
        }
        if other.require_login.is_some() {
            self.require_login = other.require_login;
        }
        if other.tui_enabled.is_some() {
            self.tui_enabled = other.tui_enabled;
        }
        if other.max_input_len.is_some() {
            self.max_input_len = other.max_input_len;
        }
        if other.score_seed.is_some() {
            self.score_seed = other.score_seed;
        }
        if other.relevance_step.is_some() {
            self.relevance_step = other.relevance_step;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
    }
}

impl Config {
    fn from_partial(partial: PartialConfig) -> Self {
        Self {
            catalog: partial.catalog,
            require_login: partial.require_login.unwrap_or(DEFAULT_REQUIRE_LOGIN),
            tui_enabled: partial.tui_enabled.unwrap_or(DEFAULT_TUI_ENABLED),
            max_input_len: partial.max_input_len.unwrap_or(DEFAULT_MAX_INPUT_LEN),
            score_seed: partial.score_seed,
            relevance_step: partial.relevance_step.unwrap_or(DEFAULT_RELEVANCE_STEP),
            log_file: partial.log_file,
        }
    }

    /// Log destination while the TUI runs; `None` means stderr.
    fn log_path(&self) -> Option<PathBuf> {
        if !self.tui_enabled {
            return None;
        }
        Some(self.log_file.clone().unwrap_or_else(|| env::temp_dir().join(LOG_FILE)))
    }

    fn tui_config(&self) -> TuiConfig {
        TuiConfig { max_input_len: self.max_input_len, relevance_step: self.relevance_step }
    }

    fn controller_options(&self) -> ControllerOptions {
        ControllerOptions { require_login: self.require_login, score_seed: self.score_seed }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    catalog: Option<PathBuf>,
    #[serde(alias = "requireLogin")]
    require_login: Option<bool>,
    tui: Option<bool>,
    #[serde(alias = "noTui", alias = "no-tui")]
    no_tui: Option<bool>,
    #[serde(alias = "maxInputLen")]
    max_input_len: Option<usize>,
    #[serde(alias = "scoreSeed")]
    score_seed: Option<u64>,
    #[serde(alias = "relevanceStep")]
    relevance_step: Option<u8>,
    #[serde(alias = "logFile")]
    log_file: Option<PathBuf>,
}

impl FileConfig {
    fn into_partial(self) -> PartialConfig {
        let tui_enabled = match (self.tui, self.no_tui) {
            (_, Some(no_tui)) => Some(!no_tui),
            (Some(tui), None) => Some(tui),
            (None, None) => None,
        };

        PartialConfig {
            catalog: self.catalog,
            require_login: self.require_login,
            tui_enabled,
            max_input_len: self.max_input_len,
            score_seed: self.score_seed,
            relevance_step: self.relevance_step,
            log_file: self.log_file,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("config file not found: {path}")]
    MissingConfig { path: PathBuf },
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: String, value: String },
}

fn cli_overrides(cli: &Cli) -> PartialConfig {
    let tui_enabled = if cli.no_tui {
        Some(false)
    } else if cli.tui {
        Some(true)
    } else {
        None
    };

    PartialConfig {
        catalog: cli.catalog.clone(),
        require_login: cli.no_login.then_some(false),
        tui_enabled,
        max_input_len: None,
        score_seed: cli.seed,
        relevance_step: None,
        log_file: cli.log_file.clone(),
    }
}

fn env_overrides(env: &BTreeMap<String, String>) -> Result<PartialConfig, ConfigError> {
    let mut partial = PartialConfig::default();
    if let Some(path) = env.get("PATENTDESK_CATALOG") {
        if !path.trim().is_empty() {
            partial.catalog = Some(PathBuf::from(path));
        }
    }
    if let Some(path) = env.get("PATENTDESK_LOG_FILE") {
        if !path.trim().is_empty() {
            partial.log_file = Some(PathBuf::from(path));
        }
    }
    if let Some(value) = env.get("PATENTDESK_REQUIRE_LOGIN") {
        partial.require_login = Some(parse_bool("PATENTDESK_REQUIRE_LOGIN", value)?);
    }
    if let Some(value) = env.get("PATENTDESK_MAX_INPUT_LEN") {
        partial.max_input_len = Some(parse_usize("PATENTDESK_MAX_INPUT_LEN", value)?);
    }
    if let Some(value) = env.get("PATENTDESK_SCORE_SEED") {
        partial.score_seed = Some(parse_u64("PATENTDESK_SCORE_SEED", value)?);
    }
    if let Some(value) = env.get("PATENTDESK_RELEVANCE_STEP") {
        partial.relevance_step = Some(parse_u8("PATENTDESK_RELEVANCE_STEP", value)?);
    }
    if let Some(no_tui) = env.get("PATENTDESK_NO_TUI") {
        let disabled = parse_bool("PATENTDESK_NO_TUI", no_tui)?;
        partial.tui_enabled = Some(!disabled);
    }
    if partial.tui_enabled.is_none() {
        if let Some(tui) = env.get("PATENTDESK_TUI") {
            partial.tui_enabled = Some(parse_bool("PATENTDESK_TUI", tui)?);
        }
    }
    Ok(partial)
}

fn parse_u8(name: &str, value: &str) -> Result<u8, ConfigError> {
    value
        .parse::<u8>()
        .map_err(|_| ConfigError::InvalidEnv { name: name.to_string(), value: value.to_string() })
}

fn parse_usize(name: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidEnv { name: name.to_string(), value: value.to_string() })
}

fn parse_u64(name: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidEnv { name: name.to_string(), value: value.to_string() })
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv { name: name.to_string(), value: value.to_string() }),
    }
}

fn load_config_file(path: &Path) -> Result<PartialConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    let parsed: FileConfig = serde_json::from_str(&contents)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })?;
    Ok(parsed.into_partial())
}

fn find_config_path(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            break;
        }
    }
    None
}

fn resolve_config(
    cli: &Cli,
    cwd: &Path,
    env: &BTreeMap<String, String>,
) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let mut partial = PartialConfig::default();

    let config_path = if let Some(path) = &cli.config {
        if !path.is_file() {
            return Err(ConfigError::MissingConfig { path: path.clone() });
        }
        Some(path.clone())
    } else {
        find_config_path(cwd)
    };

    if let Some(path) = config_path.as_ref() {
        let mut file_partial = load_config_file(path)?;
        // Paths in the file are relative to the file itself.
        if let Some(dir) = path.parent() {
            for relative in [file_partial.catalog.as_mut(), file_partial.log_file.as_mut()]
                .into_iter()
                .flatten()
            {
                if relative.is_relative() {
                    *relative = dir.join(&*relative);
                }
            }
        }
        partial.merge(file_partial);
    }

    let env_partial = env_overrides(env)?;
    partial.merge(env_partial);

    let cli_partial = cli_overrides(cli);
    partial.merge(cli_partial);

    Ok((Config::from_partial(partial), config_path))
}

/// Filter state requested on the command line.
fn initial_filters(cli: &Cli) -> FilterSpec {
    let mut filters = FilterSpec::default();
    if let Some(query) = &cli.query {
        filters.set_query(query.clone());
    }
    if let Some(company) = &cli.company {
        filters.set_company_filter(company.clone());
    }
    filters.set_active_only(cli.active_only);
    if let Some(raw) = &cli.min_relevance {
        filters.set_min_relevance_input(raw.clone());
    }
    filters
}

fn load_catalog(config: &Config) -> Result<Catalog, DynError> {
    match &config.catalog {
        Some(path) => {
            let catalog = Catalog::load_json_file(path)?;
            info!(path = %path.display(), records = catalog.len(), "loaded catalog");
            Ok(catalog)
        }
        None => Ok(Catalog::builtin()),
    }
}

fn print_catalog(
    out: &mut impl Write,
    catalog: &Catalog,
    filters: &FilterSpec,
) -> Result<(), io::Error> {
    let visible = visible_records(catalog.records(), filters);
    writeln!(
        out,
        "{:<9}  {:<44}  {:<26}  {:<11}  {:<8}  {:>9}",
        "Patent ID", "Title", "Company", "Filing Date", "Status", "Relevance"
    )?;
    for record in &visible {
        writeln!(
            out,
            "{:<9}  {:<44}  {:<26}  {:<11}  {:<8}  {:>8}%",
            record.id,
            record.title,
            record.company,
            record.filing_date,
            record.status.as_str(),
            record.relevance_score
        )?;
    }

    let insights = CatalogInsights::from_records(&visible);
    writeln!(out)?;
    write!(out, "{} of {} patents", visible.len(), catalog.len())?;
    if let Some(mean) = insights.mean_relevance {
        write!(out, ", mean relevance {mean:.1}%")?;
    }
    writeln!(out)?;
    if !filters.min_relevance.is_numeric() {
        writeln!(out, "min relevance `{}` is not a number; treated as 0", filters.min_relevance.raw())?;
    }
    Ok(())
}

/// Events go to `log_path` when set, otherwise to stderr.
fn init_tracing(log_path: Option<&Path>) -> Result<(), DynError> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn run_tui_loop(config: TuiConfig, controller: PortfolioController) -> Result<(), DynError> {
    let _guard = TerminalGuard::enter()?;
    let stdout = io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let mut tui = Tui::new(config, controller);

    loop {
        terminal.draw(|frame| {
            tui.render(frame);
        })?;

        if event::poll(Duration::from_millis(TUI_TICK_MS))? {
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => tui.handle_key(key),
                Event::Mouse(mouse) => tui.handle_mouse(mouse),
                _ => Action::None,
            };
            if action == Action::Quit {
                break;
            }
        }
    }

    info!(logged = tui.controller().log().len(), "session ended");
    terminal.show_cursor()?;
    Ok(())
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, DynError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

pub fn run() -> Result<(), DynError> {
    let cli = Cli::parse();
    let cwd = env::current_dir()?;
    let env_map: BTreeMap<String, String> = env::vars().collect();
    let (config, config_path) = resolve_config(&cli, &cwd, &env_map)?;

    let log_path = config.log_path();
    init_tracing(log_path.as_deref())?;

    if let Some(path) = &config_path {
        info!(path = %path.display(), "loaded config file");
    } else {
        warn!("no {CONFIG_FILE} found, using defaults and env/cli overrides");
    }

    info!(
        catalog = ?config.catalog,
        require_login = config.require_login,
        tui_enabled = config.tui_enabled,
        max_input_len = config.max_input_len,
        score_seed = ?config.score_seed,
        relevance_step = config.relevance_step,
        log_path = ?log_path,
        "resolved config"
    );

    let catalog = load_catalog(&config)?;
    let filters = initial_filters(&cli);

    if !config.tui_enabled {
        print_catalog(&mut io::stdout().lock(), &catalog, &filters)?;
        return Ok(());
    }

    let controller =
        PortfolioController::new(catalog, config.controller_options()).with_filters(filters);
    run_tui_loop(config.tui_config(), controller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn bare_cli() -> Cli {
        Cli::parse_from(["patentdesk"])
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from([
            "patentdesk",
            "--config",
            "config.json",
            "--catalog",
            "patents.json",
            "--no-login",
            "--no-tui",
            "--query",
            "vape",
            "--company",
            "Tech",
            "--active-only",
            "--min-relevance",
            "70",
            "--seed",
            "42",
            "--log-file",
            "desk.log",
        ]);

        assert_eq!(cli.config.as_deref(), Some(Path::new("config.json")));
        assert_eq!(cli.catalog.as_deref(), Some(Path::new("patents.json")));
        assert!(cli.no_login);
        assert!(cli.no_tui);
        assert!(!cli.tui);
        assert_eq!(cli.query.as_deref(), Some("vape"));
        assert_eq!(cli.company.as_deref(), Some("Tech"));
        assert!(cli.active_only);
        assert_eq!(cli.min_relevance.as_deref(), Some("70"));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.log_file.as_deref(), Some(Path::new("desk.log")));
    }

    #[test]
    fn defaults_without_any_layer() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (config, path) = resolve_config(&bare_cli(), temp.path(), &BTreeMap::new()).unwrap();
        assert!(path.is_none());
        assert!(config.catalog.is_none());
        assert!(config.require_login);
        assert!(config.tui_enabled);
        assert_eq!(config.max_input_len, DEFAULT_MAX_INPUT_LEN);
        assert_eq!(config.relevance_step, DEFAULT_RELEVANCE_STEP);
        assert_eq!(config.score_seed, None);
    }

    #[test]
    fn resolves_config_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        let child = root.join("nested");
        fs::create_dir_all(&child).expect("create nested dir");

        let config_path = root.join(CONFIG_FILE);
        fs::write(
            &config_path,
            r#"{
  "catalog": "data/patents.json",
  "requireLogin": true,
  "tui": true,
  "max_input_len": 80,
  "score_seed": 1,
  "relevance_step": 10
}"#,
        )
        .expect("write config");

        let mut env_map = BTreeMap::new();
        env_map.insert("PATENTDESK_SCORE_SEED".to_string(), "2".to_string());
        env_map.insert("PATENTDESK_RELEVANCE_STEP".to_string(), "20".to_string());
        env_map.insert("PATENTDESK_NO_TUI".to_string(), "1".to_string());

        let cli = Cli::parse_from(["patentdesk", "--no-login", "--seed", "3"]);

        let (config, resolved_path) = resolve_config(&cli, &child, &env_map).unwrap();

        assert_eq!(resolved_path.as_deref(), Some(config_path.as_path()));
        assert_eq!(config.catalog, Some(root.join("data/patents.json")));
        assert!(!config.require_login);
        assert!(!config.tui_enabled);
        assert_eq!(config.max_input_len, 80);
        assert_eq!(config.score_seed, Some(3));
        assert_eq!(config.relevance_step, 20);
    }

    #[test]
    fn logs_leave_the_terminal_while_tui_runs() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (config, _) = resolve_config(&bare_cli(), temp.path(), &BTreeMap::new()).unwrap();
        assert!(config.tui_enabled);
        assert_eq!(config.log_path(), Some(env::temp_dir().join(LOG_FILE)));

        let cli = Cli::parse_from(["patentdesk", "--no-tui"]);
        let (config, _) = resolve_config(&cli, temp.path(), &BTreeMap::new()).unwrap();
        assert_eq!(config.log_path(), None);
    }

    #[test]
    fn log_file_follows_layers() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::write(root.join(CONFIG_FILE), r#"{ "logFile": "logs/desk.log" }"#).expect("write config");

        let (config, _) = resolve_config(&bare_cli(), root, &BTreeMap::new()).unwrap();
        assert_eq!(config.log_path(), Some(root.join("logs/desk.log")));

        let mut env_map = BTreeMap::new();
        env_map.insert("PATENTDESK_LOG_FILE".to_string(), "/tmp/env.log".to_string());
        let (config, _) = resolve_config(&bare_cli(), root, &env_map).unwrap();
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/env.log")));

        let cli = Cli::parse_from(["patentdesk", "--log-file", "cli.log"]);
        let (config, _) = resolve_config(&cli, root, &env_map).unwrap();
        assert_eq!(config.log_path(), Some(PathBuf::from("cli.log")));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let cli = Cli::parse_from(["patentdesk", "--config", "/definitely/not/here.json"]);
        let err = resolve_config(&cli, Path::new("/"), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig { .. }));
    }

    #[test]
    fn invalid_env_value_is_reported() {
        let mut env_map = BTreeMap::new();
        env_map.insert("PATENTDESK_RELEVANCE_STEP".to_string(), "300".to_string());
        let err = env_overrides(&env_map).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref name, .. } if name == "PATENTDESK_RELEVANCE_STEP"));
    }

    #[test]
    fn tui_env_applies_only_without_no_tui() {
        let mut env_map = BTreeMap::new();
        env_map.insert("PATENTDESK_TUI".to_string(), "off".to_string());
        assert_eq!(env_overrides(&env_map).unwrap().tui_enabled, Some(false));

        env_map.insert("PATENTDESK_NO_TUI".to_string(), "0".to_string());
        assert_eq!(env_overrides(&env_map).unwrap().tui_enabled, Some(true));
    }

    #[test]
    fn parse_bool_accepts_and_rejects_values() {
        assert!(parse_bool("FLAG", "true").unwrap());
        assert!(parse_bool("FLAG", "1").unwrap());
        assert!(!parse_bool("FLAG", "0").unwrap());
        assert!(!parse_bool("FLAG", "off").unwrap());

        let err = parse_bool("FLAG", "maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn find_config_path_none_when_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(find_config_path(temp.path()).is_none());
    }

    #[test]
    fn load_config_file_invalid_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "{not valid json").expect("write");
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseFile { .. }));
    }

    #[test]
    fn initial_filters_follow_flags() {
        let cli = Cli::parse_from([
            "patentdesk",
            "--query",
            "device",
            "--active-only",
            "--min-relevance",
            "abc",
        ]);
        let filters = initial_filters(&cli);
        assert_eq!(filters.query, "device");
        assert!(filters.active_only);
        assert_eq!(filters.min_relevance.raw(), "abc");
        assert_eq!(filters.min_relevance.threshold(), 0.0);
        assert!(initial_filters(&bare_cli()).is_default());
    }

    #[test]
    fn print_catalog_lists_visible_rows() {
        let catalog = Catalog::builtin();
        let mut filters = FilterSpec::default();
        filters.set_active_only(true);

        let mut out = Vec::new();
        print_catalog(&mut out, &catalog, &filters).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("P001"));
        assert!(text.contains("P003"));
        assert!(!text.contains("P002"));
        assert!(text.contains("2 of 3 patents, mean relevance 75.0%"));
    }

    #[test]
    fn print_catalog_notes_non_numeric_threshold() {
        let mut filters = FilterSpec::default();
        filters.set_min_relevance_input("lots");
        let mut out = Vec::new();
        print_catalog(&mut out, &Catalog::builtin(), &filters).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("3 of 3 patents"));
        assert!(text.contains("`lots` is not a number"));
    }

    #[test]
    fn load_catalog_reads_file_from_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("patents.json");
        fs::write(
            &path,
            r#"[{"id":"A001","title":"Solar Film","company":"SunCo","filingDate":"2022-01-01","status":"Active","relevanceScore":90}]"#,
        )
        .expect("write catalog");

        let mut config = Config::from_partial(PartialConfig::default());
        assert_eq!(load_catalog(&config).unwrap().len(), 3);

        config.catalog = Some(path);
        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].company, "SunCo");
    }
}
