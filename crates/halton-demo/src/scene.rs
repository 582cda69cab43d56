//! Scene content: the two imported meshes and the procedural Möbius strip.

use glam::{Mat4, Vec3};

use halton_engine::gfx::bezier::mobius_strip;
use halton_engine::gfx::{
    BezierConstants, Context, DsId, GfxError, HsId, ImportedMesh, Mesh, MeshOps, PatchMesh, PsId,
    RasterState, SamplerState, SceneConstants, VsId,
};

use crate::config::DemoConfig;

/// Camera data the scene pass needs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneView {
    pub view_proj: Mat4,
    pub eye: Vec3,
}

pub struct SceneContent {
    scene: Mesh,
    poles: Mesh,
    patch: Mesh,
    tess_factor: f32,
    draw_patch: bool,
    raster: RasterState,
}

impl SceneContent {
    /// Loads both meshes and builds the patch mesh. Any failure is fatal.
    pub fn load(device: &wgpu::Device, config: &DemoConfig) -> Result<Self, GfxError> {
        let scene = Mesh::from(ImportedMesh::new(config.scene_path())).initialized(device)?;
        let poles = Mesh::from(ImportedMesh::new(config.pole_path())).initialized(device)?;

        let mut strip = PatchMesh::new(mobius_strip());
        strip.set_tess_factor(config.tess_factor);
        let tess_factor = strip.tess_factor();
        log::debug!("patch mesh: {} control points", strip.control_point_count());
        let patch = Mesh::from(strip).initialized(device)?;

        Ok(Self {
            scene,
            poles,
            patch,
            tess_factor,
            draw_patch: config.draw_patch,
            raster: if config.wireframe { RasterState::Wireframe } else { RasterState::Solid },
        })
    }

    /// Draws into whatever outputs are bound. `view.view_proj` already
    /// carries any jitter.
    pub fn draw(&mut self, ctx: &mut Context<'_>, view: &SceneView) -> Result<(), GfxError> {
        ctx.set_vs(VsId::Scene);
        ctx.set_ps(PsId::Scene);
        ctx.set_sampler_state(SamplerState::Linear);
        ctx.set_raster_state(self.raster);
        ctx.map_constants::<SceneConstants>()?.view_proj = view.view_proj;

        ctx.draw(&mut self.scene)?;
        ctx.draw(&mut self.poles)?;

        if self.draw_patch {
            self.draw_patch(ctx, view)?;
        }
        ctx.set_raster_state(RasterState::Solid);
        Ok(())
    }

    fn draw_patch(&mut self, ctx: &mut Context<'_>, view: &SceneView) -> Result<(), GfxError> {
        ctx.set_vs(VsId::Bezier);
        ctx.set_hs(HsId::Integer);
        ctx.set_ds(DsId::Bezier);
        ctx.set_ps(PsId::Bezier);
        {
            let mut c = ctx.map_constants::<BezierConstants>()?;
            c.view_proj = view.view_proj;
            c.camera_pos = view.eye;
            c.tess_factor = self.tess_factor;
        }
        let result = ctx.draw(&mut self.patch);
        ctx.disable_hs();
        ctx.disable_ds();
        result
    }

    pub fn destroy(&mut self) {
        self.scene.destroy();
        self.poles.destroy();
        self.patch.destroy();
    }
}
