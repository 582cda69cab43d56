//! Demo configuration.

use std::path::PathBuf;

use glam::Vec3;
use winit::dpi::LogicalSize;

use halton_engine::window::RuntimeConfig;

use crate::settings::TaaSettings;

/// Environment variable that replaces the asset directory.
pub const ASSET_DIR_ENV: &str = "HALTON_ASSET_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.0, 4.5, -10.5),
            target: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Clear colours, AARRGGBB.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClearColors {
    pub scene: u32,
    pub backbuffer: u32,
}

impl Default for ClearColors {
    fn default() -> Self {
        Self { scene: 0xff08_0808, backbuffer: 0x0010_1010 }
    }
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub asset_dir: PathBuf,
    /// Relative to `asset_dir`.
    pub scene_mesh: PathBuf,
    /// Relative to `asset_dir`.
    pub pole_mesh: PathBuf,
    pub settings: TaaSettings,
    pub camera: CameraConfig,
    pub clears: ClearColors,
    /// Draw the tessellated Möbius strip after the static meshes.
    pub draw_patch: bool,
    pub tess_factor: f32,
    /// Scene meshes in line mode; solid where the adapter has no line rasterization.
    pub wireframe: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Halton TAA".to_string(),
            width: 640,
            height: 480,
            asset_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets"),
            scene_mesh: PathBuf::from("column_scene/scene.gltf"),
            pole_mesh: PathBuf::from("column_scene/poles.gltf"),
            settings: TaaSettings::default(),
            camera: CameraConfig::default(),
            clears: ClearColors::default(),
            draw_patch: false,
            tess_factor: 8.0,
            wireframe: false,
        }
    }
}

impl DemoConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = std::env::var_os(ASSET_DIR_ENV) {
            config.asset_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn scene_path(&self) -> PathBuf {
        self.asset_dir.join(&self.scene_mesh)
    }

    pub fn pole_path(&self) -> PathBuf {
        self.asset_dir.join(&self.pole_mesh)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.width as f64, self.height as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Mode;

    #[test]
    fn defaults() {
        let c = DemoConfig::default();
        assert_eq!((c.width, c.height), (640, 480));
        assert_eq!(c.settings.mode, Mode::TemporalAa);
        assert_eq!(c.clears.scene, 0xff080808);
        assert_eq!(c.clears.backbuffer, 0x00101010);
        assert!(!c.draw_patch);
        assert!(!c.wireframe);
        assert_eq!(c.tess_factor, 8.0);
    }

    #[test]
    fn mesh_paths_resolve_under_asset_dir() {
        let mut c = DemoConfig::default();
        c.asset_dir = PathBuf::from("/data");
        assert_eq!(c.scene_path(), PathBuf::from("/data/column_scene/scene.gltf"));
        assert_eq!(c.pole_path(), PathBuf::from("/data/column_scene/poles.gltf"));
    }

    #[test]
    fn runtime_config_carries_title_and_size() {
        let rc = DemoConfig::default().runtime_config();
        assert_eq!(rc.title, "Halton TAA");
        assert_eq!(rc.initial_size, LogicalSize::new(640.0, 480.0));
    }
}
