//! Netlist export via the external `kicad-cli` tool.
//!
//! The host application's document API is out of scope here; this module
//! only wraps the exporter subprocess:
//! `kicad-cli sch export netlist -o <out> <schematic>`.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("kicad-cli binary not found")]
    CliNotFound,
    #[error("schematic file not found: {0}")]
    SchematicNotFound(PathBuf),
    #[error("netlist export failed: {0}")]
    ExportFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wrapper around the `kicad-cli` netlist exporter.
pub struct NetlistExporter {
    kicad_cli: PathBuf,
}

impl NetlistExporter {
    /// Use an explicit `kicad-cli` path.
    pub fn with_binary(kicad_cli: PathBuf) -> Self {
        Self { kicad_cli }
    }

    /// Probe `PATH` and common install locations for `kicad-cli`.
    pub fn locate() -> Result<Self, ExportError> {
        let candidates = [
            PathBuf::from("kicad-cli"),
            PathBuf::from("/usr/bin/kicad-cli"),
            PathBuf::from("/usr/local/bin/kicad-cli"),
            PathBuf::from("/Applications/KiCad/KiCad.app/Contents/MacOS/kicad-cli"),
        ];
        for candidate in candidates {
            if Command::new(&candidate)
                .arg("--version")
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false)
            {
                return Ok(Self::with_binary(candidate));
            }
        }
        Err(ExportError::CliNotFound)
    }

    /// Export the netlist for a schematic and return its text. The netlist
    /// file is written next to the schematic with a `.net` extension.
    pub fn export_netlist(&self, schematic: &Path) -> Result<String, ExportError> {
        if !schematic.is_file() {
            return Err(ExportError::SchematicNotFound(schematic.to_path_buf()));
        }
        let output_file = schematic.with_extension("net");

        let output = Command::new(&self.kicad_cli)
            .arg("sch")
            .arg("export")
            .arg("netlist")
            .arg("-o")
            .arg(&output_file)
            .arg(schematic)
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExportError::CliNotFound,
                _ => ExportError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::ExportFailed(stderr.trim().to_string()));
        }

        tracing::debug!("exported netlist to {}", output_file.display());
        Ok(std::fs::read_to_string(&output_file)?)
    }
}
