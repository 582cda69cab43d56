//! Frame compositor: scene pass, history blend, present and debug overlay.

use glam::{Mat4, Vec3};

use halton_engine::device::BackbufferDesc;
use halton_engine::gfx::{
    Context, DecalConstants, DecalVertex, DepthState, GfxError, Mesh, MeshOps, PsId, Renderer,
    SamplerState, TaaConstants, TargetHandle, TargetKind, TriangleListMesh, VsId,
};

use crate::config::ClearColors;
use crate::scene::{SceneContent, SceneView};
use crate::temporal::FramePlan;

/// Edge length of the debug overlay quad, in pixels.
pub const OVERLAY_SIZE: f32 = 100.0;

/// Unit quad; scaled to pixels by the per-pass matrix.
const QUAD_VERTICES: [DecalVertex; 4] = [
    DecalVertex { position: [0.0, 0.0, 0.0], uv: [0.0, 0.0] },
    DecalVertex { position: [1.0, 0.0, 0.0], uv: [1.0, 0.0] },
    DecalVertex { position: [0.0, 1.0, 0.0], uv: [0.0, 1.0] },
    DecalVertex { position: [1.0, 1.0, 0.0], uv: [1.0, 1.0] },
];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

/// What the present pass samples.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PresentSource {
    SceneColor,
    History(usize),
}

impl PresentSource {
    pub fn for_plan(plan: &FramePlan) -> Self {
        match plan.taa {
            Some(pass) => PresentSource::History(pass.write),
            None => PresentSource::SceneColor,
        }
    }
}

/// Maps the unit quad onto the whole back buffer.
pub fn fullscreen_matrix(screen_proj: Mat4, backbuffer: BackbufferDesc) -> Mat4 {
    screen_proj * Mat4::from_scale(Vec3::new(backbuffer.width as f32, backbuffer.height as f32, 1.0))
}

/// Maps the unit quad onto the overlay square in the bottom-left corner.
pub fn overlay_matrix(screen_proj: Mat4, backbuffer: BackbufferDesc) -> Mat4 {
    screen_proj
        * Mat4::from_translation(Vec3::new(0.0, backbuffer.height as f32 - OVERLAY_SIZE, 0.0))
        * Mat4::from_scale(Vec3::new(OVERLAY_SIZE, OVERLAY_SIZE, 1.0))
}

/// Owns the scene color target, both history targets and the screen quad.
pub struct Compositor {
    color: TargetHandle,
    history: [TargetHandle; 2],
    quad: Mesh,
}

impl Compositor {
    pub fn new(
        renderer: &mut Renderer,
        device: &wgpu::Device,
        backbuffer: BackbufferDesc,
    ) -> Result<Self, GfxError> {
        let (w, h) = (backbuffer.width.max(1), backbuffer.height.max(1));
        let color = renderer.create_target(device, TargetKind::HdrColor, w, h)?;
        let history = [
            renderer.create_target(device, TargetKind::HdrColor, w, h)?,
            renderer.create_target(device, TargetKind::HdrColor, w, h)?,
        ];
        let quad = Mesh::from(TriangleListMesh::new(VsId::Decal, &QUAD_VERTICES, &QUAD_INDICES)?)
            .initialized(device)?;
        Ok(Self { color, history, quad })
    }

    /// Records one composited frame into `ctx`.
    pub fn render(
        &mut self,
        ctx: &mut Context<'_>,
        scene: &mut SceneContent,
        view: &SceneView,
        plan: &FramePlan,
        clears: ClearColors,
    ) -> Result<(), GfxError> {
        let backbuffer = ctx.backbuffer();
        let screen_proj = ctx.screen_proj_matrix();
        let fullscreen = fullscreen_matrix(screen_proj, backbuffer);

        // Scene pass.
        ctx.push_render_target();
        ctx.set_render_target(self.color)?;
        ctx.clear(clears.scene);
        ctx.clear_depth(1.0);
        let jittered = SceneView { view_proj: plan.jittered(view.view_proj), eye: view.eye };
        scene.draw(ctx, &jittered)?;

        // History blend.
        if let Some(pass) = plan.taa {
            ctx.set_render_target(self.history[pass.write])?;
            ctx.unbind_depth()?;
            ctx.set_depth_state(DepthState::Disable);

            self.quad.bind_texture(0, Some(self.history[pass.read]));
            self.quad.bind_texture(1, Some(self.color));
            ctx.set_vs(VsId::Taa);
            ctx.set_ps(PsId::Taa);
            ctx.set_sampler_state(SamplerState::Linear);
            {
                let mut c = ctx.map_constants::<TaaConstants>()?;
                c.view_proj = fullscreen;
                c.inv_screen_size = pass.inv_screen_size;
                c.rate = pass.rate;
                c.blur_size = pass.blur_size;
            }
            ctx.draw(&mut self.quad)?;
        }

        // Present.
        ctx.pop_render_target()?;
        ctx.clear(clears.backbuffer);
        ctx.clear_depth(1.0);
        ctx.set_depth_state(DepthState::Disable);
        let source = match PresentSource::for_plan(plan) {
            PresentSource::SceneColor => self.color,
            PresentSource::History(i) => self.history[i],
        };
        self.draw_decal(ctx, source, fullscreen)?;

        // Pre-blend scene color, every mode.
        self.draw_decal(ctx, self.color, overlay_matrix(screen_proj, backbuffer))?;

        ctx.set_depth_state(DepthState::Unused);
        ctx.disable_vs();
        ctx.disable_ps();
        Ok(())
    }

    fn draw_decal(
        &mut self,
        ctx: &mut Context<'_>,
        texture: TargetHandle,
        view_proj: Mat4,
    ) -> Result<(), GfxError> {
        self.quad.bind_texture(0, Some(texture));
        ctx.set_vs(VsId::Decal);
        ctx.set_ps(PsId::Decal);
        ctx.set_sampler_state(SamplerState::Linear);
        ctx.map_constants::<DecalConstants>()?.view_proj = view_proj;
        ctx.draw(&mut self.quad)
    }

    pub fn destroy(&mut self) {
        self.quad.destroy();
    }
}
