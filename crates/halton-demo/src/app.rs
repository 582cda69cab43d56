//! Lifecycle callbacks tying the renderer, compositor, camera and HUD together.

use anyhow::{Context as _, Result};

use halton_engine::coords::Vec2;
use halton_engine::core::{App, AppControl, DeviceCtx, FrameCtx, InputResponse};
use halton_engine::gfx::Renderer;
use halton_engine::input::{InputEvent, InputState, Key};
use halton_engine::time::FrameTime;
use halton_engine::window::RuntimeCtx;
use halton_hud::HudLayer;

use crate::camera::OrbitCamera;
use crate::compositor::Compositor;
use crate::config::DemoConfig;
use crate::hud::{DemoHud, FrameStats, HudCommand};
use crate::scene::{SceneContent, SceneView};
use crate::settings::TaaSettings;
use crate::temporal::TemporalState;

/// Resources that live exactly as long as the device.
struct GpuState {
    renderer: Renderer,
    compositor: Compositor,
    scene: SceneContent,
    info: DeviceInfo,
}

#[derive(Debug, Clone)]
struct DeviceInfo {
    adapter: String,
    backend: wgpu::Backend,
    reference: bool,
}

pub struct DemoApp {
    config: DemoConfig,
    settings: TaaSettings,
    temporal: TemporalState,
    camera: OrbitCamera,
    hud: DemoHud,
    layer: HudLayer,
    gpu: Option<GpuState>,
}

impl DemoApp {
    pub fn new(config: DemoConfig) -> Self {
        let settings = config.settings;
        let aspect = config.width as f32 / config.height.max(1) as f32;
        Self {
            camera: OrbitCamera::new(&config.camera, aspect),
            hud: DemoHud::new(&settings, config.width, config.height),
            layer: HudLayer::new(),
            settings,
            temporal: TemporalState::new(),
            gpu: None,
            config,
        }
    }
}

impl App for DemoApp {
    fn on_device_created(&mut self, ctx: &DeviceCtx<'_>) -> Result<()> {
        log::info!(
            "device created: {} ({:?}){}",
            ctx.adapter.name,
            ctx.adapter.backend,
            if ctx.fallback { " [fallback]" } else { "" }
        );

        let mut renderer =
            Renderer::new(ctx.device, ctx.queue, ctx.backbuffer).context("creating renderer")?;
        let compositor = Compositor::new(&mut renderer, ctx.device, ctx.backbuffer)
            .context("creating compositor targets")?;
        let scene = SceneContent::load(ctx.device, &self.config).context("loading scene content")?;

        let info = DeviceInfo {
            adapter: ctx.adapter.name.clone(),
            backend: ctx.adapter.backend,
            reference: ctx.fallback,
        };
        self.gpu = Some(GpuState { renderer, compositor, scene, info });
        Ok(())
    }

    fn on_swapchain_resized(&mut self, ctx: &DeviceCtx<'_>) -> Result<()> {
        let bb = ctx.backbuffer;
        log::info!("swapchain resized: {}x{} {:?}", bb.width, bb.height, bb.format);

        if let Some(gpu) = self.gpu.as_mut() {
            gpu.renderer
                .resized_swapchain(ctx.device, bb)
                .context("resizing render targets")?;
        }
        self.camera.set_aspect(bb.width, bb.height);
        self.hud.resize(bb.width, bb.height);
        self.hud.sync_present_mode(ctx.present_mode);
        Ok(())
    }

    fn on_swapchain_releasing(&mut self) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.renderer.releasing_swapchain();
        }
    }

    fn on_device_destroyed(&mut self) {
        if let Some(mut gpu) = self.gpu.take() {
            gpu.compositor.destroy();
            gpu.scene.destroy();
        }
        log::info!("device destroyed");
    }

    fn on_input(
        &mut self,
        event: &InputEvent,
        input: &InputState,
        runtime: &mut RuntimeCtx,
    ) -> InputResponse {
        let routed = self.hud.route(event, &mut self.settings);
        for command in routed.commands {
            match command {
                HudCommand::ToggleFullscreen => runtime.toggle_fullscreen(),
                HudCommand::ToggleReference => runtime.toggle_fallback_adapter(),
                HudCommand::SetPresentMode(mode) => runtime.set_present_mode(mode),
            }
        }
        if routed.consumed {
            return InputResponse::Handled;
        }

        match event.key_pressed() {
            Some(Key::Escape) => {
                runtime.exit();
                return InputResponse::Handled;
            }
            Some(Key::Enter) if input.modifiers.alt => {
                runtime.toggle_fullscreen();
                return InputResponse::Handled;
            }
            _ => {}
        }

        if self.camera.handle_input(event) {
            InputResponse::Handled
        } else {
            InputResponse::Ignored
        }
    }

    fn on_frame_move(&mut self, time: &FrameTime) {
        self.camera.frame_move(time.dt);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Self { config, settings, temporal, camera, hud, layer, gpu } = self;
        let Some(gpu) = gpu.as_mut() else {
            return AppControl::Continue;
        };

        let bb = ctx.backbuffer();
        let stats = FrameStats {
            fps: ctx.time.fps,
            present_mode: ctx.gpu.present_mode(),
            width: bb.width,
            height: bb.height,
            adapter: gpu.info.adapter.clone(),
            backend: gpu.info.backend,
            reference: gpu.info.reference,
        };
        let pointer = ctx.input.pointer.map(|(x, y)| Vec2::new(x, y));

        // The device dialog owns the frame; the temporal state stays put.
        let plan = (!hud.is_device_dialog_active())
            .then(|| temporal.plan(settings, bb.width, bb.height));
        let view = SceneView { view_proj: camera.view_proj(), eye: camera.position() };
        let clears = config.clears;
        let mut composited = false;

        let control = ctx.render(|rctx, target| {
            {
                let mut rc = gpu.renderer.begin(
                    rctx.device,
                    rctx.queue,
                    &mut *target.encoder,
                    target.color_view,
                );
                match &plan {
                    Some(plan) => {
                        match gpu.compositor.render(&mut rc, &mut gpu.scene, &view, plan, clears) {
                            Ok(()) => composited = true,
                            Err(e) => log::error!("composite failed: {e}"),
                        }
                    }
                    None => rc.clear(clears.backbuffer),
                }
            }

            {
                let mut painter = layer.painter(pointer);
                hud.paint(&mut painter, &stats);
            }
            layer.render(rctx, target);
        });

        // Lost or failed frames leave jitter, parity and priming untouched.
        if let Some(plan) = plan.filter(|_| composited) {
            temporal.commit(&plan);
        }
        control
    }
}
