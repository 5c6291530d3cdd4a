//! Command-line interface for replaying and checking recorded signatures.

use crate::recording::{Recording, RecordingError};
use clap::{Parser, Subcommand};
use signpad_core::{ConfigError, ExportError, PadConfig, Verdict};
use signpad_render::{RenderError, decode_data_url};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

/// Replay recorded signatures through the signature pad.
#[derive(Parser, Debug)]
#[command(name = "signpad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Pad configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a recording and print the verdict
    Check {
        /// Recording file (JSON)
        recording: PathBuf,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a recording and write the signature image
    Export {
        /// Recording file (JSON)
        recording: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write the PNG data URL as text instead of raw PNG bytes
        #[arg(long)]
        data_url: bool,
    },
}

/// CLI errors. Rejections are not errors; they set the exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Recording(#[from] RecordingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Export(ExportError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Exit code for a rejected signature.
pub const EXIT_REJECTED: u8 = 2;

impl Cli {
    /// Run the parsed command, writing human-readable output to `out`.
    pub fn run(&self, out: &mut impl Write) -> Result<ExitCode, CliError> {
        let config = match &self.config {
            Some(path) => PadConfig::load(path)?,
            None => PadConfig::default(),
        };

        match &self.command {
            Commands::Check { recording, json } => check(recording, config, *json, out),
            Commands::Export {
                recording,
                output,
                data_url,
            } => export(recording, config, output, *data_url, out),
        }
    }
}

fn check(
    path: &Path,
    config: PadConfig,
    json: bool,
    out: &mut impl Write,
) -> Result<ExitCode, CliError> {
    let pad = Recording::load(path)?.replay(config)?;
    let verdict = pad.verdict();

    let line = if json {
        serde_json::to_string(&verdict).unwrap_or_default()
    } else {
        describe(&verdict)
    };
    write_line(out, &line);

    Ok(exit_code(&verdict))
}

fn export(
    path: &Path,
    config: PadConfig,
    output: &Path,
    as_data_url: bool,
    out: &mut impl Write,
) -> Result<ExitCode, CliError> {
    let pad = Recording::load(path)?.replay(config)?;

    let url = match pad.export_image() {
        Ok(url) => url,
        Err(ExportError::Rejected(rejection)) => {
            write_line(out, &format!("rejected: {rejection}"));
            return Ok(ExitCode::from(EXIT_REJECTED));
        }
        Err(e) => return Err(CliError::Export(e)),
    };

    let bytes = if as_data_url {
        url.into_bytes()
    } else {
        decode_data_url(&url)?
    };
    std::fs::write(output, &bytes).map_err(|source| CliError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    log::info!("Wrote {} bytes to {}", bytes.len(), output.display());
    write_line(out, &format!("exported: {}", output.display()));
    Ok(ExitCode::SUCCESS)
}

fn describe(verdict: &Verdict) -> String {
    match &verdict.reason {
        None => "valid".to_string(),
        Some(reason) => format!("rejected: {reason}"),
    }
}

fn exit_code(verdict: &Verdict) -> ExitCode {
    if verdict.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_REJECTED)
    }
}

fn write_line(out: &mut impl Write, line: &str) {
    if let Err(e) = writeln!(out, "{line}") {
        log::warn!("Failed to write output: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signpad_core::{SamplePoint, Stroke, SurfaceSize};
    use signpad_render::PNG_DATA_URL_PREFIX;
    use tempfile::TempDir;

    fn zigzag(x0: f64, start: u64) -> Stroke {
        Stroke::from_points(
            (0..16)
                .map(|i| {
                    let y = if i % 2 == 0 { 80.0 } else { 130.0 };
                    SamplePoint::new(x0 + i as f64 * 14.0, y, start + i * 12)
                })
                .collect(),
        )
    }

    fn write_recording(dir: &TempDir, name: &str, strokes: Vec<Stroke>) -> PathBuf {
        let path = dir.path().join(name);
        let recording = Recording::new(SurfaceSize::new(400.0, 256.0), strokes);
        std::fs::write(&path, recording.to_json().unwrap()).unwrap();
        path
    }

    fn run(args: &[&str]) -> (Result<ExitCode, CliError>, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        let result = cli.run(&mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_export_command() {
        let cli = Cli::try_parse_from([
            "signpad", "export", "rec.json", "-o", "sig.png", "--data-url",
        ])
        .unwrap();

        match cli.command {
            Commands::Export {
                recording,
                output,
                data_url,
            } => {
                assert_eq!(recording, PathBuf::from("rec.json"));
                assert_eq!(output, PathBuf::from("sig.png"));
                assert!(data_url);
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_export_requires_output() {
        assert!(Cli::try_parse_from(["signpad", "export", "rec.json"]).is_err());
    }

    #[test]
    fn test_check_valid_signature() {
        let dir = TempDir::new().unwrap();
        let path = write_recording(&dir, "ok.json", vec![zigzag(30.0, 0), zigzag(70.0, 500)]);

        let (result, out) = run(&["signpad", "check", path.to_str().unwrap()]);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert_eq!(out.trim(), "valid");
    }

    #[test]
    fn test_check_empty_recording_json() {
        let dir = TempDir::new().unwrap();
        let path = write_recording(&dir, "empty.json", Vec::new());

        let (result, out) = run(&["signpad", "check", "--json", path.to_str().unwrap()]);
        assert_eq!(result.unwrap(), ExitCode::from(EXIT_REJECTED));

        let verdict: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(verdict["valid"], false);
        assert_eq!(verdict["reason"], "No signature detected.");
    }

    #[test]
    fn test_export_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = write_recording(&dir, "ok.json", vec![zigzag(30.0, 0), zigzag(70.0, 500)]);
        let output = dir.path().join("sig.png");

        let (result, out) = run(&[
            "signpad",
            "export",
            path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert!(out.starts_with("exported:"));

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_export_data_url() {
        let dir = TempDir::new().unwrap();
        let path = write_recording(&dir, "ok.json", vec![zigzag(30.0, 0), zigzag(70.0, 500)]);
        let output = dir.path().join("sig.txt");

        let (result, _) = run(&[
            "signpad",
            "export",
            path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--data-url",
        ]);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert!(
            std::fs::read_to_string(&output)
                .unwrap()
                .starts_with(PNG_DATA_URL_PREFIX)
        );
    }

    #[test]
    fn test_export_rejected_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let dot = Stroke::from_points(
            (0..25).map(|i| SamplePoint::new(100.0 + (i % 2) as f64, 100.0, i)).collect(),
        );
        let path = write_recording(&dir, "dot.json", vec![dot]);
        let output = dir.path().join("sig.png");

        let (result, out) = run(&[
            "signpad",
            "export",
            path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ]);
        assert_eq!(result.unwrap(), ExitCode::from(EXIT_REJECTED));
        assert!(out.starts_with("rejected:"));
        assert!(!output.exists());
    }

    #[test]
    fn test_config_override_relaxes_rules() {
        let dir = TempDir::new().unwrap();
        // A single short zigzag: too few points for the default rules.
        let stroke = Stroke::from_points(zigzag(30.0, 0).points()[..10].to_vec());
        let path = write_recording(&dir, "short.json", vec![stroke]);

        let (result, out) = run(&["signpad", "check", path.to_str().unwrap()]);
        assert_eq!(result.unwrap(), ExitCode::from(EXIT_REJECTED));
        assert!(out.starts_with("rejected:"));

        let config = dir.path().join("pad.json");
        std::fs::write(&config, r#"{"rules": {"min_points": 5}}"#).unwrap();
        let (result, out) = run(&[
            "signpad",
            "--config",
            config.to_str().unwrap(),
            "check",
            path.to_str().unwrap(),
        ]);
        assert_eq!(result.unwrap(), ExitCode::SUCCESS);
        assert_eq!(out.trim(), "valid");
    }

    #[test]
    fn test_check_oversized_recording_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.json");
        std::fs::write(
            &path,
            r#"{"width": 4000000000, "height": 4000000000, "strokes": []}"#,
        )
        .unwrap();

        let (result, out) = run(&["signpad", "check", path.to_str().unwrap()]);
        assert!(matches!(
            result,
            Err(CliError::Recording(RecordingError::SurfaceTooLarge(..)))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_recording_is_error() {
        let (result, _) = run(&["signpad", "check", "/nonexistent/rec.json"]);
        assert!(matches!(
            result,
            Err(CliError::Recording(RecordingError::Io(_)))
        ));
    }
}
