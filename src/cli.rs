//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use morphwave::noise::Seed;
use morphwave::params::StyleParameters;
use morphwave::shape::ShapeKind;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "morphwave")]
#[command(about = "Audio-reactive morphing form", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate tempo and beat grid of a WAV file
    Analyze {
        /// Input WAV file
        input: PathBuf,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the frame loop headless and report what the form does
    Render(RenderArgs),

    /// Play the procedural track and drive the form in real time
    Live {
        /// How long to run (seconds)
        #[arg(long, value_name = "SECONDS", default_value_t = 30.0)]
        seconds: f32,

        /// Noise seed: integer, or any text to hash
        #[arg(long, default_value = "1337")]
        seed: String,
    },

    /// Write an fBm heightmap of the noise field to PNG
    NoisePreview {
        /// Noise seed: integer, or any text to hash
        #[arg(long, default_value = "1337")]
        seed: String,

        /// Noise frequency (spatial scale)
        #[arg(long, default_value_t = 0.02)]
        scale: f64,

        /// Output image size (width = height)
        #[arg(long, default_value_t = 256)]
        size: u32,

        /// Output file path
        #[arg(long, default_value = "noise_preview.png")]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Uploaded-track mode: analyze and follow this WAV file
    #[arg(long, value_name = "WAV", conflicts_with = "procedural")]
    pub input: Option<PathBuf>,

    /// Procedural mode: synthesize the built-in track offline
    #[arg(long)]
    pub procedural: bool,

    /// Number of frames to run
    #[arg(long, default_value_t = 1800)]
    pub frames: u32,

    /// Frames per second
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Noise and shape-cycle seed: integer, or any text to hash
    #[arg(long, default_value = "1337")]
    pub seed: String,

    /// Style file (JSON, missing fields take defaults)
    #[arg(long, value_name = "FILE")]
    pub style: Option<PathBuf>,

    /// Pin the form to one shape: sphere, icosahedron, torus_knot, plane, box
    #[arg(long, value_name = "SHAPE")]
    pub shape: Option<String>,
}

impl RenderArgs {
    /// Load the style file if one was given
    pub fn load_style(&self) -> Result<Option<StyleParameters>> {
        let Some(path) = &self.style else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read style file {}", path.display()))?;
        let style = StyleParameters::from_json(&text)
            .with_context(|| format!("invalid style file {}", path.display()))?;
        Ok(Some(style))
    }

    /// Parse the pinned shape; unknown names are an error
    pub fn parse_shape(&self) -> Result<Option<ShapeKind>> {
        self.shape
            .as_deref()
            .map(|name| {
                ShapeKind::parse(name).ok_or_else(|| anyhow!("unknown shape '{}'", name))
            })
            .transpose()
    }

    pub fn validate(&self) -> Result<()> {
        if self.input.is_none() && !self.procedural {
            return Err(anyhow!("choose a source: --input <WAV> or --procedural"));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(anyhow!("--fps must be positive"));
        }
        Ok(())
    }
}

/// Integer seeds are used as-is; anything else is hashed
pub fn parse_seed(text: &str) -> u32 {
    match text.trim().parse::<u32>() {
        Ok(value) => Seed::Int(value).hash(),
        Err(_) => Seed::Text(text).hash(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphwave::noise::fnv1a;

    fn render(args: &[&str]) -> RenderArgs {
        let mut argv = vec!["morphwave", "render"];
        argv.extend_from_slice(args);
        match Args::parse_from(argv).command {
            Command::Render(render) => render,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed("42"), 42);
        assert_eq!(parse_seed("ocean"), fnv1a("ocean"));
    }

    #[test]
    fn test_render_requires_source() {
        assert!(render(&[]).validate().is_err());
        assert!(render(&["--procedural"]).validate().is_ok());
        assert!(render(&["--procedural", "--fps", "0"]).validate().is_err());
    }

    #[test]
    fn test_input_conflicts_with_procedural() {
        let result = Args::try_parse_from(["morphwave", "render", "--input", "a.wav", "--procedural"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!(
            render(&["--procedural", "--shape", "knot"]).parse_shape().unwrap(),
            Some(ShapeKind::TorusKnot)
        );
        assert!(render(&["--procedural", "--shape", "blob"]).parse_shape().is_err());
    }
}
