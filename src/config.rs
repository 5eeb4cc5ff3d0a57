use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::palette::{Theme, THEME_IDS};

const DEFAULT_SOCKET_IP: &str = "10.42.0.1";
const DEFAULT_SOCKET_PORT: u16 = 3030;
const DEFAULT_POLLING_INTERVAL_MS: u64 = 60;
const DEFAULT_SOURCE_WIDTH: u32 = 640;
const DEFAULT_SOURCE_HEIGHT: u32 = 480;
const DEFAULT_FIELD_DIMENSION_M: f64 = 3.6576;
const DEFAULT_FIELD_OOV: f64 = 0.1;
const DEFAULT_ROBOT_LENGTH_M: f64 = 0.4191;
const DEFAULT_ROBOT_WIDTH_M: f64 = 0.3175;
const DEFAULT_ROBOT_SCALE: f64 = 1.5;
const DEFAULT_ROBOT_FOV_DEG: f64 = 50.0;
const DEFAULT_ASSET_DIR: &str = "assets";
const DEFAULT_EXPORT_DIR: &str = ".";
const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Deserialize, Default)]
struct DashboardConfigFile {
    socket: Option<SocketConfigFile>,
    polling_interval_ms: Option<u64>,
    source: Option<SourceConfigFile>,
    log_data_response: Option<bool>,
    detect_out_of_bounds_elements: Option<bool>,
    field: Option<FieldConfigFile>,
    asset_dir: Option<PathBuf>,
    font_path: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    theme: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct SocketConfigFile {
    ip: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct SourceConfigFile {
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct FieldConfigFile {
    dimension: Option<f64>,
    oov: Option<f64>,
    robot: Option<RobotConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct RobotConfigFile {
    length: Option<f64>,
    width: Option<f64>,
    scale: Option<f64>,
    fov: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address of the data service. Owned by the ingestion collaborator.
    pub socket_ip: String,
    pub socket_port: u16,
    pub polling_interval: Duration,
    /// Source camera resolution assumed by upstream box coordinates.
    pub source: SourceSettings,
    pub log_data_response: bool,
    pub detect_out_of_bounds_elements: bool,
    pub field: FieldSettings,
    pub asset_dir: PathBuf,
    pub font_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub theme: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceSettings {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSettings {
    /// Side length of the square field, meters.
    pub dimension: f64,
    /// Out-of-view margin past each canvas edge, as a fraction of half the
    /// canvas extent on that axis.
    pub oov: f64,
    pub robot: RobotSettings,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobotSettings {
    pub length: f64,
    pub width: f64,
    pub scale: f64,
    /// Horizontal camera field of view, degrees. The field map fogs
    /// everything outside it.
    pub fov: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        // Defaults cannot fail to build from an empty file.
        Self::from_file(DashboardConfigFile::default())
    }
}

impl DashboardConfig {
    /// Load from the file named by `VEXAI_CONFIG` (if set), then apply env overrides.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("VEXAI_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        log::debug!("dashboard config: {:?}", cfg);
        Ok(cfg)
    }

    fn from_file(file: DashboardConfigFile) -> Self {
        let socket_ip = file
            .socket
            .as_ref()
            .and_then(|socket| socket.ip.clone())
            .unwrap_or_else(|| DEFAULT_SOCKET_IP.to_string());
        let socket_port = file
            .socket
            .as_ref()
            .and_then(|socket| socket.port)
            .unwrap_or(DEFAULT_SOCKET_PORT);
        let source = SourceSettings {
            width: file
                .source
                .as_ref()
                .and_then(|source| source.width)
                .unwrap_or(DEFAULT_SOURCE_WIDTH),
            height: file
                .source
                .as_ref()
                .and_then(|source| source.height)
                .unwrap_or(DEFAULT_SOURCE_HEIGHT),
        };
        let field_file = file.field.unwrap_or_default();
        let robot_file = field_file.robot.unwrap_or_default();
        let field = FieldSettings {
            dimension: field_file.dimension.unwrap_or(DEFAULT_FIELD_DIMENSION_M),
            oov: field_file.oov.unwrap_or(DEFAULT_FIELD_OOV),
            robot: RobotSettings {
                length: robot_file.length.unwrap_or(DEFAULT_ROBOT_LENGTH_M),
                width: robot_file.width.unwrap_or(DEFAULT_ROBOT_WIDTH_M),
                scale: robot_file.scale.unwrap_or(DEFAULT_ROBOT_SCALE),
                fov: robot_file.fov.unwrap_or(DEFAULT_ROBOT_FOV_DEG),
            },
        };
        Self {
            socket_ip,
            socket_port,
            polling_interval: Duration::from_millis(
                file.polling_interval_ms
                    .unwrap_or(DEFAULT_POLLING_INTERVAL_MS),
            ),
            source,
            log_data_response: file.log_data_response.unwrap_or(false),
            detect_out_of_bounds_elements: file.detect_out_of_bounds_elements.unwrap_or(true),
            field,
            asset_dir: file
                .asset_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR)),
            font_path: file.font_path,
            export_dir: file
                .export_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
            theme: file.theme.unwrap_or_else(|| DEFAULT_THEME.to_string()),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(ip) = non_blank_env("VEXAI_SOCKET_IP") {
            self.socket_ip = ip;
        }
        if let Some(port) = non_blank_env("VEXAI_SOCKET_PORT") {
            self.socket_port = port
                .parse()
                .map_err(|_| anyhow!("VEXAI_SOCKET_PORT must be a port number"))?;
        }
        if let Some(interval) = non_blank_env("VEXAI_POLLING_INTERVAL_MS") {
            let millis: u64 = interval.parse().map_err(|_| {
                anyhow!("VEXAI_POLLING_INTERVAL_MS must be an integer number of milliseconds")
            })?;
            self.polling_interval = Duration::from_millis(millis);
        }
        if let Some(dir) = non_blank_env("VEXAI_ASSET_DIR") {
            self.asset_dir = PathBuf::from(dir);
        }
        if let Some(path) = non_blank_env("VEXAI_FONT_PATH") {
            self.font_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = non_blank_env("VEXAI_EXPORT_DIR") {
            self.export_dir = PathBuf::from(dir);
        }
        if let Some(theme) = non_blank_env("VEXAI_THEME") {
            self.theme = theme;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.socket_addr()?;
        if self.polling_interval.is_zero() {
            return Err(anyhow!("polling interval must be greater than zero"));
        }
        if self.source.width == 0 || self.source.height == 0 {
            return Err(anyhow!(
                "source resolution must be non-zero, got {}x{}",
                self.source.width,
                self.source.height
            ));
        }
        if !(self.field.dimension > 0.0) {
            return Err(anyhow!("field dimension must be positive"));
        }
        if self.field.oov < 0.0 {
            return Err(anyhow!("field out-of-view margin must not be negative"));
        }
        let robot = self.field.robot;
        if !(robot.length > 0.0 && robot.width > 0.0 && robot.scale > 0.0) {
            return Err(anyhow!("robot length, width and scale must be positive"));
        }
        if !(robot.fov > 0.0 && robot.fov <= 360.0) {
            return Err(anyhow!(
                "robot field of view must be in (0, 360] degrees, got {}",
                robot.fov
            ));
        }
        self.theme = self.theme.trim().to_ascii_lowercase();
        if Theme::builtin(&self.theme).is_none() {
            return Err(anyhow!(
                "unknown theme '{}'; expected one of {:?}",
                self.theme,
                THEME_IDS
            ));
        }
        crate::element::validate_element_table()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.socket_ip, self.socket_port)
            .parse()
            .map_err(|_| {
                anyhow!(
                    "invalid data service address {}:{}",
                    self.socket_ip,
                    self.socket_port
                )
            })
    }

    pub fn theme(&self) -> Theme {
        Theme::builtin(&self.theme).unwrap_or_else(Theme::dark)
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

fn read_config_file(path: &Path) -> Result<DashboardConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);
    let cfg = if is_toml {
        toml::from_str(&raw).map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?
    };
    Ok(cfg)
}
