//! In-memory vector index loaded from the precomputed artifacts.
//!
//! Two files make up the index:
//! - a JSON array of equal-length float arrays (one per document image)
//! - a newline-delimited list of image paths, positionally aligned with it
//!
//! Embedding `i` is paired with path line `i`. Pairs whose image file is
//! missing on disk are dropped together, so the two sequences can never
//! drift out of alignment.

use lectern_core::{AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counts gathered while loading, reported by the health check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub raw_embeddings: usize,
    pub raw_paths: usize,
    /// Pairs dropped because the image file does not exist
    pub dropped_missing: usize,
    pub dimension: usize,
}

#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    embeddings: Vec<Vec<f32>>,
    image_paths: Vec<String>,
    dimension: usize,
    stats: IndexStats,
}

impl VectorIndex {
    /// Load the index from disk.
    ///
    /// `resolve` maps a raw path line to the location checked for existence
    /// and stored in the index.
    pub fn load<F>(embeddings_path: &Path, paths_file: &Path, resolve: F) -> AppResult<Self>
    where
        F: Fn(&str) -> PathBuf,
    {
        info!(
            embeddings = %embeddings_path.display(),
            paths = %paths_file.display(),
            "Loading vector index"
        );

        let raw = std::fs::read_to_string(embeddings_path).map_err(|e| {
            AppError::Load(format!(
                "Cannot read embeddings file {}: {}",
                embeddings_path.display(),
                e
            ))
        })?;
        let embeddings = parse_embeddings(&raw)?;

        let listing = std::fs::read_to_string(paths_file).map_err(|e| {
            AppError::Load(format!(
                "Cannot read image path list {}: {}",
                paths_file.display(),
                e
            ))
        })?;
        let lines: Vec<&str> = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let index = Self::from_parts(embeddings, &lines, |raw| {
            let path = resolve(raw);
            path.exists().then(|| path.to_string_lossy().into_owned())
        })?;

        info!(
            documents = index.len(),
            dimension = index.dimension,
            dropped = index.stats.dropped_missing,
            "Vector index loaded"
        );

        Ok(index)
    }

    /// Pair embeddings with path lines in lockstep.
    ///
    /// `keep` returns the stored path for a line, or `None` to drop the pair.
    pub fn from_parts<F>(embeddings: Vec<Vec<f32>>, lines: &[&str], keep: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dimension = validate_embeddings(&embeddings)?;

        if embeddings.len() != lines.len() {
            warn!(
                embeddings = embeddings.len(),
                paths = lines.len(),
                "Embedding count does not match image path count, pairing the first {} entries",
                embeddings.len().min(lines.len())
            );
        }

        let mut stats = IndexStats {
            raw_embeddings: embeddings.len(),
            raw_paths: lines.len(),
            dropped_missing: 0,
            dimension,
        };

        let mut kept_embeddings = Vec::with_capacity(embeddings.len().min(lines.len()));
        let mut kept_paths = Vec::with_capacity(kept_embeddings.capacity());

        for (embedding, line) in embeddings.into_iter().zip(lines.iter()) {
            match keep(line) {
                Some(path) => {
                    kept_embeddings.push(embedding);
                    kept_paths.push(path);
                }
                None => {
                    debug!(path = line, "Dropping index entry with missing image");
                    stats.dropped_missing += 1;
                }
            }
        }

        if stats.dropped_missing > 0 {
            warn!(
                dropped = stats.dropped_missing,
                "Some image files are missing; their embeddings were dropped"
            );
        }

        Ok(Self {
            embeddings: kept_embeddings,
            image_paths: kept_paths,
            dimension,
            stats,
        })
    }

    /// True when there is at least one searchable document.
    pub fn is_ready(&self) -> bool {
        !self.embeddings.is_empty() && !self.image_paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn image_paths(&self) -> &[String] {
        &self.image_paths
    }

    pub fn image_path(&self, index: usize) -> Option<&str> {
        self.image_paths.get(index).map(String::as_str)
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

fn parse_embeddings(raw: &str) -> AppResult<Vec<Vec<f32>>> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Load(format!("Malformed embeddings file: {}", e)))
}

/// Check that there is at least one vector and all share one non-zero length.
fn validate_embeddings(embeddings: &[Vec<f32>]) -> AppResult<usize> {
    let first = embeddings
        .first()
        .ok_or_else(|| AppError::Load("Embeddings file contains no vectors".to_string()))?;

    let dimension = first.len();
    if dimension == 0 {
        return Err(AppError::Load("Embedding vectors are empty".to_string()));
    }

    if let Some((i, v)) = embeddings
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != dimension)
    {
        return Err(AppError::Load(format!(
            "Embedding {} has {} dimensions, expected {}",
            i,
            v.len(),
            dimension
        )));
    }

    Ok(dimension)
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns `f32::NEG_INFINITY` when either vector has zero norm so that such
/// documents always rank last.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return f32::NEG_INFINITY;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn keep_all(line: &str) -> Option<String> {
        Some(line.to_string())
    }

    #[test]
    fn test_cosine_self_similarity() {
        let v = vec![0.3, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), f32::NEG_INFINITY);
    }

    #[test]
    fn test_from_parts_lockstep_filtering() {
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]];
        let lines = ["a.png", "missing.png", "c.png"];

        let index = VectorIndex::from_parts(embeddings, &lines, |line| {
            (line != "missing.png").then(|| line.to_string())
        })
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.image_paths(), &["a.png", "c.png"]);
        assert_eq!(index.embeddings()[1], vec![0.7, 0.7]);
        assert_eq!(index.stats().dropped_missing, 1);
    }

    #[test]
    fn test_from_parts_count_mismatch_pairs_prefix() {
        let embeddings = vec![vec![1.0], vec![2.0], vec![3.0]];
        let lines = ["a.png", "b.png"];

        let index = VectorIndex::from_parts(embeddings, &lines, keep_all).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.embeddings().len(), index.image_paths().len());
        assert_eq!(index.stats().raw_embeddings, 3);
        assert_eq!(index.stats().raw_paths, 2);
    }

    #[test]
    fn test_rejects_ragged_vectors() {
        let result = VectorIndex::from_parts(vec![vec![1.0, 0.0], vec![1.0]], &["a", "b"], keep_all);
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn test_rejects_empty_artifact() {
        let result = VectorIndex::from_parts(Vec::new(), &[], keep_all);
        assert!(matches!(result, Err(AppError::Load(_))));

        let result = VectorIndex::from_parts(vec![Vec::new()], &["a"], keep_all);
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn test_not_ready_when_all_images_missing() {
        let index =
            VectorIndex::from_parts(vec![vec![1.0, 0.0]], &["gone.png"], |_| None).unwrap();
        assert!(!index.is_ready());
        assert_eq!(index.dimension(), 2);
    }

    #[test]
    fn test_load_from_files() {
        let temp = TempDir::new().unwrap();
        let images = temp.path().join("images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("p1.png"), b"png").unwrap();
        fs::write(images.join("p3.jpg"), b"jpg").unwrap();

        let embeddings = temp.path().join("embeddings.json");
        fs::write(&embeddings, "[[1,0],[0,1],[0.7,0.7]]").unwrap();
        let paths = temp.path().join("paths.txt");
        fs::write(&paths, "p1.png\n\np2.png\n  p3.jpg  \n").unwrap();

        let index = VectorIndex::load(&embeddings, &paths, |raw| images.join(raw)).unwrap();

        assert!(index.is_ready());
        assert_eq!(index.len(), 2);
        assert!(index.image_path(0).unwrap().ends_with("p1.png"));
        assert!(index.image_path(1).unwrap().ends_with("p3.jpg"));
        assert_eq!(index.stats().dropped_missing, 1);
    }

    #[test]
    fn test_load_missing_artifact() {
        let temp = TempDir::new().unwrap();
        let result = VectorIndex::load(
            &temp.path().join("nope.json"),
            &temp.path().join("nope.txt"),
            |raw| PathBuf::from(raw),
        );
        assert!(matches!(result, Err(AppError::Load(_))));
    }

    #[test]
    fn test_load_malformed_json() {
        let temp = TempDir::new().unwrap();
        let embeddings = temp.path().join("embeddings.json");
        fs::write(&embeddings, "{not json").unwrap();
        let paths = temp.path().join("paths.txt");
        fs::write(&paths, "a.png\n").unwrap();

        let result = VectorIndex::load(&embeddings, &paths, |raw| PathBuf::from(raw));
        assert!(matches!(result, Err(AppError::Load(_))));
    }
}
