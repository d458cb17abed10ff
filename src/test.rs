//! Shared test utilities for building sheets, workbooks and home directories.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{NamedSheet, RawSheet};
use crate::Config;
use image::{ImageBuffer, ImageFormat, Rgb};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a sheet in the per-school layout: the school name in the first cell, a header row and
/// one row per `(grade, category)` student.
pub(crate) fn school_sheet(name: &str, school: &str, students: &[(&str, &str)]) -> NamedSheet {
    let mut rows = vec![
        vec![school.to_string()],
        vec![
            "Nome do aluno".to_string(),
            "Ano escolar".to_string(),
            "Deficiência/Transtorno".to_string(),
        ],
    ];
    for (i, (grade, category)) in students.iter().enumerate() {
        rows.push(vec![
            format!("Aluno {}", i + 1),
            grade.to_string(),
            category.to_string(),
        ]);
    }
    NamedSheet::new(name, RawSheet::new(rows))
}

/// Builds a flat table with a header row.
pub(crate) fn flat_sheet(headers: &[&str], rows: &[&[&str]]) -> RawSheet {
    let mut all: Vec<Vec<String>> = vec![headers.iter().map(|s| s.to_string()).collect()];
    all.extend(
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect()),
    );
    RawSheet::new(all)
}

/// Encodes a small solid-color PNG, good enough to stand in for a logo.
pub(crate) fn png_logo(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([200u8, 30, 30]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Test environment with an initialized home directory. Holds the `TempDir` to keep the directory
/// alive for the duration of the test.
pub(crate) struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    pub(crate) async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::create(temp_dir.path().join("roster")).await.unwrap();
        Self { temp_dir, config }
    }

    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// A scratch directory outside the home directory for inputs and outputs.
    pub(crate) fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the scratch directory and returns its path.
    pub(crate) async fn file(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir().join(name);
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }
}
