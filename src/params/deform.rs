//! Per-frame deformation, color and rotation constants.

/// Parameters of the per-vertex fBm displacement and its audio coupling
#[derive(Debug, Clone)]
pub struct DeformParams {
    /// One-pole smoothing coefficient for loudness (weight of the previous value)
    pub level_smoothing: f32,

    /// Exponent shaping the loudness-derived fallback pulse
    pub level_pulse_exponent: f32,

    /// Displacement floor before audio reactivity is added
    /// Formula: amp = displace_amp * (base_reactivity + audio_react * pulse)
    pub base_reactivity: f32,

    /// fBm octaves for vertex displacement
    pub octaves: u32,

    /// fBm frequency multiplier per octave
    pub lacunarity: f64,

    /// fBm amplitude multiplier per octave
    pub gain: f64,

    /// Noise-space drift speed along x (units per second)
    pub noise_time_scale: f64,

    /// Fixed noise-space offsets for the y and z axes
    pub noise_offset: [f64; 2],

    /// Extra rotation speed at full pulse (radians per nominal frame step)
    pub pulse_rotation: f32,

    /// Nominal frame step the rotation is expressed in (seconds)
    pub frame_time_step: f32,
}

impl Default for DeformParams {
    fn default() -> Self {
        Self {
            level_smoothing: 0.85,
            level_pulse_exponent: 0.9,
            base_reactivity: 0.6,
            octaves: 5,
            lacunarity: 2.0,
            gain: 0.5,
            noise_time_scale: 0.15,
            noise_offset: [10.0, 20.0],
            pulse_rotation: 0.2,
            frame_time_step: 1.0 / 60.0,
        }
    }
}

/// Slow color drift and pulse coupling for material and background
#[derive(Debug, Clone)]
pub struct ColorDynamics {
    /// Hue drift amplitude (turns)
    pub hue_drift: f32,

    /// Hue drift angular rate (radians per second)
    pub hue_drift_rate: f32,

    /// Hue shift at full pulse (turns)
    pub pulse_hue: f32,

    /// Saturation boost at full pulse
    pub pulse_saturation: f32,

    /// Lightness boost at full pulse
    pub pulse_lightness: f32,

    /// Emissive floor as a fraction of the style's emissive intensity
    pub emissive_floor: f32,

    /// Background hue drift amplitude (turns)
    pub background_drift: f32,

    /// Background hue drift angular rate (radians per second)
    pub background_drift_rate: f32,

    /// Background lightness at rest
    pub background_lightness: f32,

    /// Background lightness boost at full pulse
    pub background_pulse: f32,
}

impl Default for ColorDynamics {
    fn default() -> Self {
        Self {
            hue_drift: 0.02,
            hue_drift_rate: 0.07,
            pulse_hue: 0.04,
            pulse_saturation: 0.1,
            pulse_lightness: 0.15,
            emissive_floor: 0.35,
            background_drift: 0.03,
            background_drift_rate: 0.05,
            background_lightness: 0.05,
            background_pulse: 0.04,
        }
    }
}
