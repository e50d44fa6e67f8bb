//! Visual style supplied by the external style interpreter.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::shape::ShapeKind;

/// Fully populated style record
///
/// Replaced wholesale, never edited field by field, so a frame always sees a
/// consistent style. Colors are HSL in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleParameters {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,

    /// Emissive strength at full pulse
    pub emissive: f32,

    /// Spatial frequency of the displacement noise (cycles per world unit)
    pub noise_scale: f32,

    /// Displacement amplitude (fraction of the base radius)
    pub displace_amp: f32,

    /// Base rotation speed (radians per second)
    pub rotate_base: f32,

    /// Camera drift multiplier
    pub drift: f32,

    /// Audio reactivity multiplier
    pub audio_react: f32,

    pub wireframe: bool,
    pub toon: bool,
    pub kaleido: bool,

    /// Shape to switch to when this style is applied
    pub shape_bias: Option<ShapeKind>,
}

impl Default for StyleParameters {
    fn default() -> Self {
        Self {
            hue: 0.62,
            saturation: 0.7,
            lightness: 0.5,
            emissive: 0.6,
            noise_scale: 0.9,
            displace_amp: 0.35,
            rotate_base: 0.15,
            drift: 1.0,
            audio_react: 1.0,
            wireframe: false,
            toon: false,
            kaleido: false,
            shape_bias: None,
        }
    }
}

impl StyleParameters {
    /// Parse a style record from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Replace unusable numeric fields with the value from `prior`
    ///
    /// Hue is cyclic and wraps into [0, 1) when finite.
    pub fn sanitized(mut self, prior: &StyleParameters) -> Self {
        self.hue = if self.hue.is_finite() {
            self.hue.rem_euclid(1.0)
        } else {
            warn!(value = self.hue, "style hue is not finite, keeping prior");
            prior.hue
        };

        self.saturation = checked("saturation", self.saturation, 0.0, 1.0, prior.saturation);
        self.lightness = checked("lightness", self.lightness, 0.0, 1.0, prior.lightness);
        self.emissive = checked("emissive", self.emissive, 0.0, 10.0, prior.emissive);
        self.noise_scale = checked("noise_scale", self.noise_scale, 1e-3, 20.0, prior.noise_scale);
        self.displace_amp = checked("displace_amp", self.displace_amp, 0.0, 5.0, prior.displace_amp);
        self.rotate_base = checked("rotate_base", self.rotate_base, -10.0, 10.0, prior.rotate_base);
        self.drift = checked("drift", self.drift, 0.0, 10.0, prior.drift);
        self.audio_react = checked("audio_react", self.audio_react, 0.0, 10.0, prior.audio_react);
        self
    }
}

fn checked(name: &str, value: f32, min: f32, max: f32, prior: f32) -> f32 {
    if value.is_finite() && (min..=max).contains(&value) {
        value
    } else {
        warn!(field = name, value, min, max, "style value out of range, keeping prior");
        prior
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let style = StyleParameters::from_json(r#"{"hue": 0.1, "shape_bias": "torus_knot"}"#)
            .unwrap();
        assert_eq!(style.hue, 0.1);
        assert_eq!(style.shape_bias, Some(ShapeKind::TorusKnot));
        assert_eq!(style.drift, StyleParameters::default().drift);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(StyleParameters::from_json("{ hue: ").is_err());
    }

    #[test]
    fn test_sanitized_falls_back_to_prior() {
        let prior = StyleParameters {
            saturation: 0.3,
            displace_amp: 0.5,
            ..StyleParameters::default()
        };
        let incoming = StyleParameters {
            hue: 1.25,
            saturation: f32::NAN,
            displace_amp: 99.0,
            drift: 2.0,
            ..StyleParameters::default()
        };

        let style = incoming.sanitized(&prior);
        assert!((style.hue - 0.25).abs() < 1e-6);
        assert_eq!(style.saturation, 0.3);
        assert_eq!(style.displace_amp, 0.5);
        assert_eq!(style.drift, 2.0);
    }
}
