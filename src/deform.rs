//! Per-frame mesh deformation with audio-reactive modulation.

use glam::{Vec2, Vec3};
use tracing::info;

use crate::camera::CameraSystem;
use crate::noise::NoiseField;
use crate::params::{ColorDynamics, DeformParams, RenderConfig, StyleParameters};
use crate::scene::{hsl_to_rgb, Material, Scene, Vertex};
use crate::schedule::ShapeCycleScheduler;
use crate::shape::{compute_normals, ShapeKind};

/// Signals for one frame, read from the audio adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub time: f64,
    /// Loudness in [0, 1]
    pub level: f32,
    /// Beat pulse in [0, 1]
    pub beat_pulse: f32,
    /// Let the scheduler change the shape this frame
    pub auto_shape: bool,
}

/// What an update did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub pulse: f32,
    pub smoothed_level: f32,
    /// Set when the scheduler swapped the shape this frame
    pub shape_changed: Option<ShapeKind>,
}

/// Base and live geometry of the current shape
///
/// `base` is never modified after construction; displacement always starts
/// from it so repeated updates do not accumulate.
#[derive(Debug, Clone)]
pub struct MeshState {
    pub shape: ShapeKind,
    pub base: Vec<Vec3>,
    pub live: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshState {
    pub fn new(shape: ShapeKind) -> Self {
        let mesh = shape.build();
        let mut normals = Vec::with_capacity(mesh.positions.len());
        compute_normals(&mesh.positions, &mesh.indices, &mut normals);
        Self {
            shape,
            live: mesh.positions.clone(),
            base: mesh.positions,
            normals,
            indices: mesh.indices,
        }
    }
}

/// Displaces the current shape, drives color, camera and rotation
pub struct MeshDeformer {
    params: DeformParams,
    colors: ColorDynamics,
    camera: CameraSystem,
    render: RenderConfig,
    style: StyleParameters,
    mesh: MeshState,
    smoothed_level: Option<f32>,
    rotation: Vec2,
    scene: Scene,
}

impl Default for MeshDeformer {
    fn default() -> Self {
        Self::new(
            DeformParams::default(),
            ColorDynamics::default(),
            CameraSystem::default(),
            RenderConfig::default(),
            ShapeKind::default(),
        )
    }
}

impl MeshDeformer {
    pub fn new(
        params: DeformParams,
        colors: ColorDynamics,
        camera: CameraSystem,
        render: RenderConfig,
        shape: ShapeKind,
    ) -> Self {
        let mut deformer = Self {
            params,
            colors,
            camera,
            render,
            style: StyleParameters::default(),
            mesh: MeshState::new(shape),
            smoothed_level: None,
            rotation: Vec2::ZERO,
            scene: Scene::default(),
        };
        deformer.write_geometry();
        deformer
    }

    pub fn mesh(&self) -> &MeshState {
        &self.mesh
    }

    pub fn shape(&self) -> ShapeKind {
        self.mesh.shape
    }

    pub fn style(&self) -> &StyleParameters {
        &self.style
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Replace the style; rotation, camera and geometry are untouched
    pub fn set_style(&mut self, style: StyleParameters) {
        self.style = style;
        self.scene.material.wireframe = self.style.wireframe;
        self.scene.material.toon = self.style.toon;
        self.scene.material.kaleido = self.style.kaleido;
    }

    /// Swap to a freshly built shape; live positions equal base until the next update
    ///
    /// Loudness smoothing carries over.
    pub fn set_shape(&mut self, shape: ShapeKind) {
        self.mesh = MeshState::new(shape);
        info!(
            shape = %shape,
            vertices = self.mesh.base.len(),
            triangles = self.mesh.indices.len() / 3,
            "shape changed"
        );
        self.write_geometry();
    }

    /// Advance one frame
    ///
    /// # Arguments
    /// * `input` - Time, loudness and beat pulse for this frame
    /// * `noise` - Field shared with the camera
    /// * `scheduler` - Consulted after displacement when `input.auto_shape` is set
    pub fn update(
        &mut self,
        input: FrameInput,
        noise: &NoiseField,
        scheduler: &mut ShapeCycleScheduler,
    ) -> FrameReport {
        let time = if input.time.is_finite() { input.time } else { 0.0 };
        let level = unit(input.level);

        let k = self.params.level_smoothing;
        let smoothed = match self.smoothed_level {
            None => level,
            Some(prev) => prev * k + level * (1.0 - k),
        };
        self.smoothed_level = Some(smoothed);

        let pulse =
            unit(input.beat_pulse).max(unit(smoothed).powf(self.params.level_pulse_exponent));

        self.update_colors(time as f32, pulse);

        let pose = self
            .camera
            .pose(noise, time, self.style.drift, self.style.kaleido);
        self.scene.view_proj = CameraSystem::view_proj(&pose, &self.render);
        self.scene.camera = Some(pose);

        self.displace(noise, time, pulse);

        let step = (self.style.rotate_base + self.params.pulse_rotation * pulse)
            * self.params.frame_time_step;
        self.rotation += Vec2::splat(step);
        self.scene.rotation = self.rotation;

        self.scene.time = time as f32;
        self.scene.pulse = pulse;
        self.scene.level = smoothed;

        let shape_changed = if input.auto_shape {
            scheduler.tick(time)
        } else {
            None
        };
        if let Some(shape) = shape_changed {
            self.set_shape(shape);
        }

        FrameReport {
            pulse,
            smoothed_level: smoothed,
            shape_changed,
        }
    }

    fn update_colors(&mut self, time: f32, pulse: f32) {
        let c = &self.colors;
        let style = &self.style;

        let hue = (style.hue + c.hue_drift * (time * c.hue_drift_rate).sin() + c.pulse_hue * pulse)
            .rem_euclid(1.0);
        let saturation = (style.saturation + c.pulse_saturation * pulse).clamp(0.0, 1.0);
        let lightness = (style.lightness + c.pulse_lightness * pulse).clamp(0.0, 1.0);

        self.scene.material = Material {
            color: hsl_to_rgb(hue, saturation, lightness),
            emissive: style.emissive * (c.emissive_floor + (1.0 - c.emissive_floor) * pulse),
            wireframe: style.wireframe,
            toon: style.toon,
            kaleido: style.kaleido,
        };

        // Complementary hue, slower independent drift
        let bg_hue = (style.hue
            + 0.5
            + c.background_drift * (time * c.background_drift_rate).cos())
        .rem_euclid(1.0);
        let bg_lightness =
            (c.background_lightness + c.background_pulse * pulse).clamp(0.0, 1.0);
        self.scene.background = hsl_to_rgb(bg_hue, style.saturation * 0.5, bg_lightness);
    }

    fn displace(&mut self, noise: &NoiseField, time: f64, pulse: f32) {
        let p = &self.params;
        let amp = self.style.displace_amp * (p.base_reactivity + self.style.audio_react * pulse);
        let scale = self.style.noise_scale as f64;
        let drift = time * p.noise_time_scale;
        let [oy, oz] = p.noise_offset;

        for (live, base) in self.mesh.live.iter_mut().zip(&self.mesh.base) {
            let n = noise.fbm3(
                base.x as f64 * scale + drift,
                base.y as f64 * scale + oy,
                base.z as f64 * scale + oz,
                p.octaves,
                p.lacunarity,
                p.gain,
            ) as f32;
            *live = *base * (1.0 + amp * n);
        }

        compute_normals(&self.mesh.live, &self.mesh.indices, &mut self.mesh.normals);
        self.write_vertices();
    }

    fn write_geometry(&mut self) {
        self.scene.shape = self.mesh.shape;
        self.scene.indices.clone_from(&self.mesh.indices);
        self.write_vertices();
    }

    fn write_vertices(&mut self) {
        self.scene.vertices.clear();
        self.scene
            .vertices
            .extend(self.mesh.live.iter().zip(&self.mesh.normals).map(|(p, n)| Vertex {
                position: p.to_array(),
                normal: n.to_array(),
            }));
    }
}

/// Clamp to [0, 1]; non-finite reads as 0
fn unit(x: f32) -> f32 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
