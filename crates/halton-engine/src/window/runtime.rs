use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::core::{App, AppControl, DeviceCtx, FrameCtx, InputResponse};
use crate::device::{Gpu, GpuInit};
use crate::input::{InputEvent, InputState, Key, Modifiers, MouseButton};
use crate::time::FrameClock;

/// Window title and initial client size.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { title: "halton".to_owned(), initial_size: LogicalSize::new(640.0, 480.0) }
    }
}

/// Requests an app makes from inside a callback.
///
/// They run once the callback has returned, in the order they were made.
#[derive(Default)]
pub struct RuntimeCtx {
    requests: Vec<Request>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Request {
    ToggleFullscreen,
    ToggleReferenceDevice,
    PresentMode(wgpu::PresentMode),
    Exit,
}

impl RuntimeCtx {
    /// Windowed <-> borderless fullscreen.
    pub fn toggle_fullscreen(&mut self) {
        self.requests.push(Request::ToggleFullscreen);
    }

    /// Tears the device down and recreates it on the other adapter kind
    /// (hardware or software reference).
    pub fn toggle_fallback_adapter(&mut self) {
        self.requests.push(Request::ToggleReferenceDevice);
    }

    pub fn set_present_mode(&mut self, mode: wgpu::PresentMode) {
        self.requests.push(Request::PresentMode(mode));
    }

    pub fn exit(&mut self) {
        self.requests.push(Request::Exit);
    }
}

/// Runs the event loop until the window closes or the app exits.
pub struct Runtime;

impl Runtime {
    pub fn run<A: App + 'static>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut host = Host {
            config,
            gpu_init,
            app,
            entry: None,
            swapchain_live: false,
            exiting: false,
            error: None,
        };
        event_loop.run_app(&mut host).context("event loop failed")?;
        host.error.map_or(Ok(()), Err)
    }
}

/// The window and the GPU objects borrowing it.
#[self_referencing]
struct WindowEntry {
    input: InputState,
    clock: FrameClock,
    window: Window,
    /// `None` only while the device is being recreated.
    #[borrows(window)]
    #[covariant]
    gpu: Option<Gpu<'this>>,
}

impl WindowEntry {
    fn is_fallback(&self) -> Option<bool> {
        self.with_gpu(|gpu| gpu.as_ref().map(Gpu::is_fallback))
    }

    fn request_redraw(&self) {
        self.with_window(Window::request_redraw);
    }
}

/// Drives an [`App`] through the device and swapchain lifecycle.
struct Host<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    entry: Option<WindowEntry>,
    /// An `on_swapchain_resized` is outstanding without its `on_swapchain_releasing`.
    swapchain_live: bool,
    exiting: bool,
    error: Option<anyhow::Error>,
}

impl<A: App> Host<A> {
    fn fail(&mut self, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        self.exiting = true;
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = event_loop.create_window(attributes).context("failed to create window")?;

        let init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input: InputState::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, init)).map(Some),
        }
        .try_build()
        .context("GPU initialization failed")?;
        entry.request_redraw();
        self.entry = Some(entry);
        self.device_created()
    }

    fn device_created(&mut self) -> Result<()> {
        let Some(entry) = &self.entry else { return Ok(()) };
        let app = &mut self.app;
        entry.with_gpu(|gpu| match gpu {
            Some(gpu) => app.on_device_created(&DeviceCtx::from_gpu(gpu)).context("on_device_created failed"),
            None => Ok(()),
        })?;
        self.swapchain_resized()
    }

    /// Skipped while the back buffer is empty (minimized window).
    fn swapchain_resized(&mut self) -> Result<()> {
        let Some(entry) = &self.entry else { return Ok(()) };
        let app = &mut self.app;
        self.swapchain_live = entry.with_gpu(|gpu| -> Result<bool> {
            let Some(gpu) = gpu else { return Ok(false) };
            let ctx = DeviceCtx::from_gpu(gpu);
            if ctx.backbuffer.is_empty() {
                log::debug!("back buffer is empty, swapchain stays released");
                return Ok(false);
            }
            app.on_swapchain_resized(&ctx).context("on_swapchain_resized failed")?;
            Ok(true)
        })?;
        Ok(())
    }

    fn release_swapchain(&mut self) {
        if std::mem::take(&mut self.swapchain_live) {
            self.app.on_swapchain_releasing();
        }
    }

    /// Releases the swapchain, applies `change` to the GPU, then re-announces it.
    fn reconfigure(&mut self, change: impl FnOnce(&mut Gpu<'_>)) {
        self.release_swapchain();
        if let Some(entry) = self.entry.as_mut() {
            entry.with_gpu_mut(|gpu| {
                if let Some(gpu) = gpu {
                    change(gpu);
                }
            });
            entry.request_redraw();
        }
        if let Err(e) = self.swapchain_resized() {
            self.fail(e);
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.reconfigure(|gpu| gpu.resize(size));
    }

    fn toggle_reference_device(&mut self) {
        let Some(fallback) = self.entry.as_ref().and_then(WindowEntry::is_fallback) else { return };
        self.release_swapchain();
        self.app.on_device_destroyed();

        let next = self.gpu_init.with_fallback(!fallback);
        let previous = self.gpu_init.with_fallback(fallback);
        let Some(entry) = self.entry.as_mut() else { return };
        let rebuilt = entry.with_mut(|fields| -> Result<()> {
            *fields.gpu = None;
            let gpu = match pollster::block_on(Gpu::new(fields.window, next)) {
                Ok(gpu) => gpu,
                Err(e) => {
                    log::warn!("could not switch adapters ({e:#}); restoring the previous one");
                    pollster::block_on(Gpu::new(fields.window, previous))?
                }
            };
            *fields.gpu = Some(gpu);
            fields.clock.reset();
            Ok(())
        });
        if let Err(e) = rebuilt {
            self.fail(e.context("failed to recreate device"));
            return;
        }

        if let Some(now_fallback) = self.entry.as_ref().and_then(WindowEntry::is_fallback) {
            self.gpu_init.force_fallback_adapter = now_fallback;
        }
        if let Err(e) = self.device_created() {
            self.fail(e);
        }
    }

    fn toggle_fullscreen(&self) {
        let Some(entry) = &self.entry else { return };
        entry.with_window(|w| {
            let next = match w.fullscreen() {
                Some(_) => None,
                None => Some(Fullscreen::Borderless(None)),
            };
            w.set_fullscreen(next);
        });
    }

    fn shutdown(&mut self) {
        if self.entry.is_some() {
            self.release_swapchain();
            self.app.on_device_destroyed();
            self.entry = None;
        }
    }

    fn handle_requests(&mut self, event_loop: &ActiveEventLoop, ctx: RuntimeCtx) {
        for request in ctx.requests {
            match request {
                Request::ToggleFullscreen => self.toggle_fullscreen(),
                Request::ToggleReferenceDevice => self.toggle_reference_device(),
                Request::PresentMode(mode) => self.reconfigure(|gpu| gpu.set_present_mode(mode)),
                Request::Exit => self.exiting = true,
            }
        }
        if self.exiting {
            self.shutdown();
            event_loop.exit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.swapchain_live {
            return;
        }
        let mut runtime = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        let (app, entry) = (&mut self.app, &mut self.entry);
        if let Some(entry) = entry {
            entry.with_mut(|fields| {
                let Some(gpu) = fields.gpu.as_mut() else { return };
                let time = fields.clock.tick();
                app.on_frame_move(&time);
                control = app.on_frame(&mut FrameCtx {
                    window: fields.window,
                    gpu,
                    input: fields.input,
                    time,
                    runtime: &mut runtime,
                });
            });
        }

        if control == AppControl::Exit {
            runtime.exit();
        }
        self.handle_requests(event_loop, runtime);
    }
}

impl<A: App> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        if let Err(e) = self.open_window(event_loop) {
            self.fail(e.context("failed to start"));
            self.shutdown();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exiting {
            self.shutdown();
            event_loop.exit();
            return;
        }
        // The demo animates every frame.
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(entry) = &self.entry {
            entry.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exiting {
            self.shutdown();
            event_loop.exit();
            return;
        }

        let mut runtime = RuntimeCtx::default();
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry else { return };
        entry.with_mut(|fields| {
            if let Some(ev) = translate_input_event(fields.input, &event) {
                fields.input.apply(&ev);
                if app.on_input(&ev, fields.input, &mut runtime) == InputResponse::Handled {
                    log::trace!("input consumed: {ev:?}");
                }
            }
        });

        match event {
            WindowEvent::CloseRequested => self.exiting = true,
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.entry.as_ref().map(|e| e.with_window(Window::inner_size)) {
                    self.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
        self.handle_requests(event_loop, runtime);
    }
}

/// Pixel scroll deltas are scaled to notches at 40 px each.
const PIXELS_PER_NOTCH: f32 = 40.0;

const FUNCTION_KEYS: [KeyCode; 12] = [
    KeyCode::F1,
    KeyCode::F2,
    KeyCode::F3,
    KeyCode::F4,
    KeyCode::F5,
    KeyCode::F6,
    KeyCode::F7,
    KeyCode::F8,
    KeyCode::F9,
    KeyCode::F10,
    KeyCode::F11,
    KeyCode::F12,
];

fn translate_input_event(input: &InputState, event: &WindowEvent) -> Option<InputEvent> {
    let ev = match event {
        WindowEvent::ModifiersChanged(m) => {
            let m = m.state();
            InputEvent::ModifiersChanged(Modifiers {
                shift: m.shift_key(),
                ctrl: m.control_key(),
                alt: m.alt_key(),
            })
        }
        WindowEvent::Focused(f) => InputEvent::Focused(*f),
        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,
        // Physical pixels, the same space as the back buffer.
        WindowEvent::CursorMoved { position, .. } => InputEvent::PointerMoved {
            x: position.x as f32,
            y: position.y as f32,
        },
        WindowEvent::MouseInput { state, button, .. } => {
            let (x, y) = input.pointer_or_origin();
            InputEvent::PointerButton {
                button: map_mouse_button(*button),
                pressed: *state == ElementState::Pressed,
                x,
                y,
            }
        }
        WindowEvent::MouseWheel { delta, .. } => InputEvent::Wheel {
            notches: match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_NOTCH,
            },
        },
        WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
            key: map_key(event.physical_key),
            pressed: event.state == ElementState::Pressed,
            repeat: event.repeat,
        },
        _ => return None,
    };
    Some(ev)
}

fn map_mouse_button(b: WinitMouseButton) -> MouseButton {
    match b {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Other,
    }
}

fn map_key(key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = key else {
        return Key::Other;
    };
    if let Some(i) = FUNCTION_KEYS.iter().position(|f| *f == code) {
        return Key::F(i as u8 + 1);
    }
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        _ => Key::Other,
    }
}
