//! Orbit camera: left-drag rotates around the target, the wheel zooms.

use glam::{Mat4, Vec2, Vec3};

use halton_engine::input::InputEvent;

use crate::config::CameraConfig;

const ROTATE_SPEED: f32 = 0.01;
const ZOOM_SPEED: f32 = 0.1;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 50.0;
const MAX_ELEVATION: f32 = std::f32::consts::FRAC_PI_2 - 0.1;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Vec3,
    distance: f32,
    azimuth: f32,
    elevation: f32,
    fov_y: f32,
    aspect: f32,
    near: f32,
    far: f32,

    dragging: bool,
    last_pointer: Option<Vec2>,
    pending_rotate: Vec2,
    pending_zoom: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let offset = config.eye - config.target;
        let distance = offset.length().max(f32::EPSILON);
        Self {
            target: config.target,
            distance,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / distance).clamp(-1.0, 1.0).asin(),
            fov_y: config.fov_y,
            aspect,
            near: config.near,
            far: config.far,
            dragging: false,
            last_pointer: None,
            pending_rotate: Vec2::ZERO,
            pending_zoom: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Feeds an input event. Returns `true` when the camera used it.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerButton { .. } => {
                let Some((x, y, pressed)) = event.left_button() else { return false };
                self.dragging = pressed;
                self.last_pointer = Some(Vec2::new(x, y));
                true
            }
            InputEvent::PointerMoved { x, y } => {
                let pos = Vec2::new(*x, *y);
                let last = self.last_pointer.replace(pos);
                match last {
                    Some(last) if self.dragging => {
                        self.pending_rotate += pos - last;
                        true
                    }
                    _ => false,
                }
            }
            InputEvent::Wheel { notches } => {
                self.pending_zoom += notches;
                true
            }
            InputEvent::PointerLeft | InputEvent::Focused(false) => {
                self.dragging = false;
                self.last_pointer = None;
                false
            }
            _ => false,
        }
    }

    /// Applies input accumulated since the last call.
    pub fn frame_move(&mut self, _dt: f32) {
        let rotate = std::mem::take(&mut self.pending_rotate);
        self.azimuth += rotate.x * ROTATE_SPEED;
        self.elevation = (self.elevation + rotate.y * ROTATE_SPEED).clamp(-MAX_ELEVATION, MAX_ELEVATION);

        let zoom = std::mem::take(&mut self.pending_zoom);
        if zoom != 0.0 {
            self.distance = (self.distance * (1.0 - zoom * ZOOM_SPEED)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }
}
