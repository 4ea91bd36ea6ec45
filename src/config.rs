use crate::gesture::{DEFAULT_DRAG_SENSITIVITY, DEFAULT_DRAG_THRESHOLD_PX};
use crate::transition::Ease;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/carousel.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemberConfig {
    pub name: String,
    #[serde(default)]
    pub texture: Option<String>,
}

impl MemberConfig {
    fn new(name: &str, texture: &str) -> Self {
        Self { name: name.to_string(), texture: Some(texture.to_string()) }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CarouselLayoutConfig {
    #[serde(default = "CarouselLayoutConfig::default_member_radius")]
    pub member_radius: f32,
    #[serde(default = "CarouselLayoutConfig::default_orbit_radius")]
    pub orbit_radius: f32,
    #[serde(default = "CarouselLayoutConfig::default_tilt_radians")]
    pub tilt_radians: f32,
    #[serde(default = "CarouselLayoutConfig::default_vertical_offset")]
    pub vertical_offset: f32,
    #[serde(default = "CarouselLayoutConfig::default_members")]
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GestureConfig {
    #[serde(default = "GestureConfig::default_drag_threshold_px")]
    pub drag_threshold_px: f32,
    #[serde(default = "GestureConfig::default_drag_sensitivity")]
    pub drag_sensitivity: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "ThrottleConfig::default_window_ms")]
    pub window_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransitionConfig {
    #[serde(default = "TransitionConfig::default_duration_secs")]
    pub duration_secs: f32,
    #[serde(default)]
    pub ease: Ease,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpinConfig {
    #[serde(default = "SpinConfig::default_rate")]
    pub rate: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_fov_y_degrees")]
    pub fov_y_degrees: f32,
    #[serde(default = "CameraConfig::default_distance")]
    pub distance: f32,
    #[serde(default = "CameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "CameraConfig::default_far")]
    pub far: f32,
    #[serde(default = "CameraConfig::default_zoom_min_distance")]
    pub zoom_min_distance: f32,
    #[serde(default = "CameraConfig::default_zoom_max_distance")]
    pub zoom_max_distance: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackdropConfig {
    #[serde(default = "BackdropConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "BackdropConfig::default_radius")]
    pub radius: f32,
    #[serde(default = "BackdropConfig::default_texture")]
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct CarouselConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub carousel: CarouselLayoutConfig,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub transition: TransitionConfig,
    #[serde(default)]
    pub spin: SpinConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub backdrop: BackdropConfig,
}

#[derive(Debug, Clone, Default)]
pub struct CarouselConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub throttle_ms: Option<u64>,
}

impl WindowConfig {
    fn default_title() -> String {
        "Planet Carousel".to_string()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        720
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: Self::default_title(), width: Self::default_width(), height: Self::default_height() }
    }
}

impl CarouselLayoutConfig {
    const fn default_member_radius() -> f32 {
        1.3
    }

    const fn default_orbit_radius() -> f32 {
        4.5
    }

    const fn default_tilt_radians() -> f32 {
        0.1
    }

    const fn default_vertical_offset() -> f32 {
        -0.8
    }

    fn default_members() -> Vec<MemberConfig> {
        vec![
            MemberConfig::new("Csilla", "assets/csilla/color.png"),
            MemberConfig::new("Earth", "assets/earth/map.jpg"),
            MemberConfig::new("Venus", "assets/venus/map.jpg"),
            MemberConfig::new("Volcanic", "assets/volcanic/color.png"),
        ]
    }
}

impl Default for CarouselLayoutConfig {
    fn default() -> Self {
        Self {
            member_radius: Self::default_member_radius(),
            orbit_radius: Self::default_orbit_radius(),
            tilt_radians: Self::default_tilt_radians(),
            vertical_offset: Self::default_vertical_offset(),
            members: Self::default_members(),
        }
    }
}

impl GestureConfig {
    const fn default_drag_threshold_px() -> f32 {
        DEFAULT_DRAG_THRESHOLD_PX
    }

    const fn default_drag_sensitivity() -> f32 {
        DEFAULT_DRAG_SENSITIVITY
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: Self::default_drag_threshold_px(),
            drag_sensitivity: Self::default_drag_sensitivity(),
        }
    }
}

impl ThrottleConfig {
    const fn default_window_ms() -> u64 {
        2000
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { window_ms: Self::default_window_ms() }
    }
}

impl TransitionConfig {
    const fn default_duration_secs() -> f32 {
        1.0
    }

    /// Falls back to the default length when `duration_secs` does not fit a `Duration`;
    /// `validate` rejects such values before a session is built.
    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f32(self.duration_secs)
            .unwrap_or_else(|_| Duration::from_secs_f32(Self::default_duration_secs()))
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self { duration_secs: Self::default_duration_secs(), ease: Ease::default() }
    }
}

impl SpinConfig {
    const fn default_rate() -> f32 {
        0.02
    }
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self { rate: Self::default_rate() }
    }
}

impl CameraConfig {
    const fn default_fov_y_degrees() -> f32 {
        25.0
    }

    const fn default_distance() -> f32 {
        9.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        1000.0
    }

    const fn default_zoom_min_distance() -> f32 {
        3.0
    }

    const fn default_zoom_max_distance() -> f32 {
        30.0
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: Self::default_fov_y_degrees(),
            distance: Self::default_distance(),
            near: Self::default_near(),
            far: Self::default_far(),
            zoom_min_distance: Self::default_zoom_min_distance(),
            zoom_max_distance: Self::default_zoom_max_distance(),
        }
    }
}

impl BackdropConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_radius() -> f32 {
        50.0
    }

    fn default_texture() -> Option<String> {
        Some("assets/stars.jpg".to_string())
    }
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self { enabled: Self::default_enabled(), radius: Self::default_radius(), texture: Self::default_texture() }
    }
}

impl CarouselConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        cfg.validate().with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.carousel.members.is_empty() {
            bail!("carousel.members must list at least one planet");
        }
        if !(self.carousel.orbit_radius > 0.0) || !(self.carousel.member_radius > 0.0) {
            bail!("carousel radii must be positive");
        }
        if !(self.transition.duration_secs > 0.0)
            || Duration::try_from_secs_f32(self.transition.duration_secs).is_err()
        {
            bail!(
                "transition.duration_secs must be a positive, representable length (got {})",
                self.transition.duration_secs
            );
        }
        if !(self.gestures.drag_threshold_px >= 0.0) {
            bail!("gestures.drag_threshold_px must not be negative");
        }
        if !(self.camera.zoom_min_distance > 0.0) || self.camera.zoom_min_distance > self.camera.zoom_max_distance {
            bail!(
                "camera zoom range [{}, {}] is invalid",
                self.camera.zoom_min_distance,
                self.camera.zoom_max_distance
            );
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &CarouselConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(throttle_ms) = overrides.throttle_ms {
            self.throttle.window_ms = throttle_ms;
        }
    }
}

impl CarouselConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.config_path.is_none() && self.width.is_none() && self.height.is_none() && self.throttle_ms.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.throttle_ms.is_some() {
            fields.push("throttle_ms");
        }
        fields
    }
}
