//! One running visualization: signal source, shape cycling and the deformed form.

use std::sync::Arc;

use tracing::info;

use crate::analysis::AnalysisResult;
use crate::audio::{AudioSignalAdapter, LevelTap, PlaybackClock, SourceMode, Transport};
use crate::camera::CameraSystem;
use crate::deform::{FrameInput, FrameReport, MeshDeformer};
use crate::noise::{NoiseField, Seed, DEFAULT_SEED};
use crate::params::{
    CameraDrift, ColorDynamics, DeformParams, RenderConfig, ScheduleConfig, SignalConfig,
    StyleParameters,
};
use crate::scene::Scene;
use crate::schedule::ShapeCycleScheduler;
use crate::shape::ShapeKind;

/// Tunables for every component of a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub noise_seed: u32,
    pub initial_shape: ShapeKind,
    pub signal: SignalConfig,
    pub schedule: ScheduleConfig,
    pub deform: DeformParams,
    pub colors: ColorDynamics,
    pub camera: CameraDrift,
    pub render: RenderConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            noise_seed: DEFAULT_SEED,
            initial_shape: ShapeKind::default(),
            signal: SignalConfig::default(),
            schedule: ScheduleConfig::default(),
            deform: DeformParams::default(),
            colors: ColorDynamics::default(),
            camera: CameraDrift::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Owns all mutable state of one visualization
///
/// Independent sessions share nothing, so several can run side by side.
pub struct Session {
    adapter: AudioSignalAdapter,
    scheduler: ShapeCycleScheduler,
    deformer: MeshDeformer,
    noise: NoiseField,
    last_report: Option<FrameReport>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let deformer = MeshDeformer::new(
            config.deform,
            config.colors,
            CameraSystem::new(config.camera),
            config.render,
            config.initial_shape,
        );
        Self {
            adapter: AudioSignalAdapter::new(config.signal),
            scheduler: ShapeCycleScheduler::new(config.schedule),
            deformer,
            noise: NoiseField::new(Seed::Int(config.noise_seed)),
            last_report: None,
        }
    }

    /// Play an analyzed track; cycling is armed unless a shape is pinned
    pub fn start_uploaded(
        &mut self,
        analysis: Arc<AnalysisResult>,
        clock: Box<dyn PlaybackClock>,
        offset: f64,
        tap: Box<dyn LevelTap>,
    ) {
        self.adapter.start_uploaded(analysis, clock, offset, tap);
        self.arm();
    }

    /// Follow the procedural transport; cycling is armed unless a shape is pinned
    pub fn start_procedural(&mut self, transport: Box<dyn Transport>, tap: Box<dyn LevelTap>) {
        self.adapter.start_procedural(transport, tap);
        self.arm();
    }

    /// Tear down the source; time and level read 0 afterwards
    pub fn stop(&mut self) {
        self.adapter.stop();
        self.scheduler.disarm();
    }

    /// Run one frame and return the scene to draw
    pub fn advance(&mut self) -> &Scene {
        let time = self.adapter.current_time();
        let input = FrameInput {
            time,
            level: self.adapter.level(),
            beat_pulse: self.adapter.beat_pulse(time),
            auto_shape: self.scheduler.is_cycling(),
        };
        let report = self
            .deformer
            .update(input, &self.noise, &mut self.scheduler);
        self.last_report = Some(report);
        self.deformer.scene()
    }

    /// Replace the style wholesale
    ///
    /// Unusable numeric fields keep their previous values. A shape bias switches
    /// the form unless a shape is pinned.
    pub fn apply_style(&mut self, style: StyleParameters) {
        let style = style.sanitized(self.deformer.style());
        if let Some(bias) = style.shape_bias {
            if self.scheduler.pinned().is_none() && bias != self.deformer.shape() {
                self.deformer.set_shape(bias);
            }
        }
        self.deformer.set_style(style);
    }

    /// Fix the form to `shape` and stop automatic cycling
    pub fn pin_shape(&mut self, shape: ShapeKind) {
        info!(shape = %shape, "shape pinned");
        self.scheduler.pin(shape);
        if self.deformer.shape() != shape {
            self.deformer.set_shape(shape);
        }
    }

    /// Resume automatic cycling from the current time
    pub fn enable_cycling(&mut self) {
        info!("shape cycling enabled");
        let time = self.adapter.current_time();
        let bar = self.bar_seconds();
        self.scheduler.enable_cycling(time, bar);
    }

    /// Reseed the noise field shared by displacement and camera
    pub fn set_seed(&mut self, seed: Seed<'_>) {
        self.noise.set_seed(seed);
    }

    pub fn mode(&self) -> SourceMode {
        self.adapter.mode()
    }

    pub fn current_time(&self) -> f64 {
        self.adapter.current_time()
    }

    pub fn shape(&self) -> ShapeKind {
        self.deformer.shape()
    }

    pub fn style(&self) -> &StyleParameters {
        self.deformer.style()
    }

    pub fn scene(&self) -> &Scene {
        self.deformer.scene()
    }

    pub fn last_report(&self) -> Option<FrameReport> {
        self.last_report
    }

    pub fn adapter(&self) -> &AudioSignalAdapter {
        &self.adapter
    }

    pub fn scheduler(&self) -> &ShapeCycleScheduler {
        &self.scheduler
    }

    pub fn deformer(&self) -> &MeshDeformer {
        &self.deformer
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    fn bar_seconds(&self) -> Option<f64> {
        self.adapter
            .is_active()
            .then(|| self.adapter.bar_seconds())
    }

    fn arm(&mut self) {
        let time = self.adapter.current_time();
        let bar = self.bar_seconds();
        self.scheduler.arm(time, bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ManualClock, SampleTransport, SharedBlockTap, SilentTap};
    use crate::schedule::ScheduleState;

    fn analysis() -> Arc<AnalysisResult> {
        Arc::new(AnalysisResult {
            sample_rate: 44100,
            duration: 60.0,
            hop: 512,
            rms: vec![0.0],
            flux: vec![0.0],
            bpm: 120,
            beat_lag: 43,
            beats: (0..120).map(|i| i as f64 * 0.5).collect(),
        })
    }

    #[test]
    fn test_idle_session_renders_quiescent_frame() {
        let mut session = Session::default();
        let scene = session.advance();
        assert_eq!(scene.shape, ShapeKind::Sphere);
        assert!(!scene.vertices.is_empty());
        assert_eq!(scene.pulse, 0.0);
        assert_eq!(session.scheduler().state(), ScheduleState::Idle);
    }

    #[test]
    fn test_uploaded_arms_sixteen_bars() {
        let mut session = Session::default();
        let clock = ManualClock::new();
        session.start_uploaded(analysis(), Box::new(clock.clone()), 0.0, Box::new(SilentTap));

        assert_eq!(session.mode(), SourceMode::Uploaded);
        assert_eq!(session.scheduler().next_change_at(), Some(32.0));

        clock.set(1.0);
        session.advance();
        let report = session.last_report().unwrap();
        assert_eq!(report.pulse, 1.0);
        assert_eq!(report.shape_changed, None);

        clock.set(32.0);
        session.advance();
        assert!(session.last_report().unwrap().shape_changed.is_some());
        assert_eq!(session.scheduler().next_change_at(), Some(64.0));
    }

    #[test]
    fn test_procedural_uses_transport_bar() {
        let mut session = Session::default();
        let transport = SampleTransport::new(1000, 120.0);
        let tap = SharedBlockTap::new(512);
        session.start_procedural(Box::new(transport.clone()), Box::new(tap.clone()));
        assert_eq!(session.scheduler().next_change_at(), Some(32.0));

        transport.advance(250);
        tap.push(&[0.2; 512]);
        session.advance();
        let report = session.last_report().unwrap();
        assert!((report.smoothed_level - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_stop_returns_to_idle() {
        let mut session = Session::default();
        let clock = ManualClock::new();
        session.start_uploaded(analysis(), Box::new(clock.clone()), 0.0, Box::new(SilentTap));
        clock.set(5.0);
        assert_eq!(session.current_time(), 5.0);

        session.stop();
        assert_eq!(session.mode(), SourceMode::Idle);
        assert_eq!(session.current_time(), 0.0);
        assert_eq!(session.scheduler().state(), ScheduleState::Idle);
        session.advance();
        assert_eq!(session.last_report().unwrap().pulse, 0.0);
    }

    #[test]
    fn test_pin_blocks_cycling_and_bias() {
        let mut session = Session::default();
        session.pin_shape(ShapeKind::TorusKnot);
        assert_eq!(session.shape(), ShapeKind::TorusKnot);

        let clock = ManualClock::new();
        session.start_uploaded(analysis(), Box::new(clock.clone()), 0.0, Box::new(SilentTap));
        assert_eq!(session.scheduler().state(), ScheduleState::Idle);

        session.apply_style(StyleParameters {
            shape_bias: Some(ShapeKind::Box),
            ..StyleParameters::default()
        });
        assert_eq!(session.shape(), ShapeKind::TorusKnot);

        clock.set(100.0);
        session.advance();
        assert_eq!(session.shape(), ShapeKind::TorusKnot);

        session.enable_cycling();
        assert_eq!(session.scheduler().next_change_at(), Some(60.0 + 32.0));
    }

    #[test]
    fn test_apply_style_bias_and_sanitizing() {
        let mut session = Session::default();
        session.advance();
        let rotation = session.scene().rotation;

        session.apply_style(StyleParameters {
            saturation: -3.0,
            kaleido: true,
            shape_bias: Some(ShapeKind::Plane),
            ..StyleParameters::default()
        });

        assert_eq!(session.shape(), ShapeKind::Plane);
        assert_eq!(session.style().saturation, StyleParameters::default().saturation);
        assert!(session.scene().material.kaleido);
        assert_eq!(session.scene().rotation, rotation);
    }
}
