//! Asset loading: a worker thread reads the glTF/GLB file (reporting
//! fractional progress), parses it, and hands flattened geometry back
//! to the UI thread over a channel.

use glam::{Mat4, Vec3};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

const READ_CHUNK: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse glTF container {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("asset {path} references buffer data that is not available")]
    MissingBuffer { path: String },
    #[error("mesh primitive in {path} has no vertex positions")]
    MissingPositions { path: String },
    #[error("asset {path} contains no renderable geometry")]
    Empty { path: String },
}

/// Messages the loader worker sends back to the UI thread. Progress
/// fractions are monotonically non-decreasing in [0, 1].
pub enum LoadEvent {
    Progress(f32),
    Loaded(Box<ModelData>),
    Failed(AssetError),
}

/// How a source material maps onto the renderer. Closed set: anything
/// unrecognized falls back to a default PBR construction rather than
/// being probed field-by-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaterialKind {
    Pbr,
    Unlit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialFactors {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    /// False for unlit materials: the shader emits the base color as-is.
    pub shaded: bool,
}

impl Default for MaterialFactors {
    /// The default PBR construction used when a primitive carries no
    /// usable material.
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 0.8,
            emissive: [0.0, 0.0, 0.0],
            shaded: true,
        }
    }
}

/// One drawable primitive, pre-transformed into model space (the node
/// hierarchy is flattened at load time).
#[derive(Debug, Clone)]
pub struct PrimitiveData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub material: MaterialFactors,
}

/// The loaded asset: flattened primitives plus the axis-aligned bounds
/// they span.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
    pub primitives: Vec<PrimitiveData>,
}

impl ModelData {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|primitive| primitive.indices.len() / 3)
            .sum()
    }

    /// Translate the geometry so the bounding-box center sits at the
    /// world origin; returns the translation that was applied.
    /// Recentering an already-centered model is a no-op.
    pub fn recenter(&mut self) -> Vec3 {
        let translation = -self.center();
        if translation == Vec3::ZERO {
            return translation;
        }
        for primitive in &mut self.primitives {
            for position in &mut primitive.positions {
                *position = (Vec3::from_array(*position) + translation).to_array();
            }
        }
        self.min += translation;
        self.max += translation;
        translation
    }
}

/// Kick off the load on a worker thread. The returned receiver is
/// drained by the render loop, so loader effects never interleave with
/// drawing.
pub fn spawn_load(path: PathBuf) -> Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        log::info!("Loading asset {}", path.display());
        let result = read_with_progress(&path, &tx)
            .and_then(|bytes| parse_model(&bytes, &path));
        // Sends fail only when the app is already shutting down.
        match result {
            Ok(model) => {
                let _ = tx.send(LoadEvent::Progress(1.0));
                let _ = tx.send(LoadEvent::Loaded(Box::new(model)));
            }
            Err(err) => {
                let _ = tx.send(LoadEvent::Failed(err));
            }
        }
    });
    rx
}

fn read_with_progress(path: &Path, tx: &Sender<LoadEvent>) -> Result<Vec<u8>, AssetError> {
    let as_read_error = |source: std::io::Error| AssetError::Read {
        path: path.display().to_string(),
        source,
    };
    let mut file = File::open(path).map_err(as_read_error)?;
    let total = file.metadata().map(|meta| meta.len()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let read = file.read(&mut chunk).map_err(as_read_error)?;
        if read == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..read]);
        if total > 0 {
            let fraction = (bytes.len() as f64 / total as f64).min(1.0) as f32;
            let _ = tx.send(LoadEvent::Progress(fraction));
        }
    }
    Ok(bytes)
}

/// Parse a glTF/GLB byte blob into flattened model geometry. External
/// `.bin` buffers are resolved relative to the asset path.
pub fn parse_model(bytes: &[u8], path: &Path) -> Result<ModelData, AssetError> {
    let path_string = path.display().to_string();
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|source| AssetError::Parse {
        path: path_string.clone(),
        source,
    })?;
    let buffers = resolve_buffers(&gltf, path)?;

    let mut primitives = Vec::new();
    let scene = gltf.default_scene().or_else(|| gltf.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, path, &mut primitives)?;
        }
    }
    if primitives.iter().all(|primitive| primitive.indices.is_empty()) {
        return Err(AssetError::Empty { path: path_string });
    }

    let (min, max) = bounds_of(&primitives);
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("model")
        .to_string();
    Ok(ModelData {
        name,
        min,
        max,
        primitives,
    })
}

fn resolve_buffers(gltf: &gltf::Gltf, path: &Path) -> Result<Vec<Vec<u8>>, AssetError> {
    let missing = || AssetError::MissingBuffer {
        path: path.display().to_string(),
    };
    let mut buffers = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                buffers.push(gltf.blob.as_deref().ok_or_else(missing)?.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                if uri.starts_with("data:") {
                    // Embedded base64 payloads only appear in exporters
                    // this viewer does not target.
                    return Err(missing());
                }
                let buffer_path = path.parent().unwrap_or(Path::new(".")).join(uri);
                buffers.push(std::fs::read(&buffer_path).map_err(|source| AssetError::Read {
                    path: buffer_path.display().to_string(),
                    source,
                })?);
            }
        }
    }
    Ok(buffers)
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[Vec<u8>],
    path: &Path,
    out: &mut Vec<PrimitiveData>,
) -> Result<(), AssetError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            out.push(convert_primitive(&primitive, world, buffers, path)?);
        }
    }
    for child in node.children() {
        collect_node(&child, world, buffers, path, out)?;
    }
    Ok(())
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[Vec<u8>],
    path: &Path,
) -> Result<PrimitiveData, AssetError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| AssetError::MissingPositions {
            path: path.display().to_string(),
        })?
        .map(|position| world.transform_point3(Vec3::from_array(position)).to_array())
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let normal_matrix = world.inverse().transpose();
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(normals) => normals
            .map(|normal| {
                normal_matrix
                    .transform_vector3(Vec3::from_array(normal))
                    .normalize_or_zero()
                    .to_array()
            })
            .collect(),
        None => compute_normals(&positions, &indices),
    };

    Ok(PrimitiveData {
        positions,
        normals,
        indices,
        material: convert_material(&primitive.material()),
    })
}

fn convert_material(material: &gltf::Material) -> MaterialFactors {
    let kind = if material.unlit() {
        MaterialKind::Unlit
    } else if material.index().is_some() {
        MaterialKind::Pbr
    } else {
        // No material bound at all: default PBR construction.
        return MaterialFactors::default();
    };

    let pbr = material.pbr_metallic_roughness();
    MaterialFactors {
        base_color: pbr.base_color_factor(),
        metallic: pbr.metallic_factor(),
        roughness: pbr.roughness_factor(),
        emissive: material.emissive_factor(),
        shaded: kind == MaterialKind::Pbr,
    }
}

/// Area-weighted vertex normals for sources that omit them.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let a = Vec3::from_array(positions[triangle[0] as usize]);
        let b = Vec3::from_array(positions[triangle[1] as usize]);
        let c = Vec3::from_array(positions[triangle[2] as usize]);
        let face = (b - a).cross(c - a);
        for &index in triangle {
            accumulated[index as usize] += face;
        }
    }
    accumulated
        .into_iter()
        .map(|normal| normal.normalize_or_zero().to_array())
        .collect()
}

fn bounds_of(primitives: &[PrimitiveData]) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for primitive in primitives {
        for position in &primitive.positions {
            let point = Vec3::from_array(*position);
            min = min.min(point);
            max = max.max(point);
        }
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal single-triangle GLB in memory: one node with a
    /// translation, POSITION accessor and u16 indices.
    fn tiny_glb() -> Vec<u8> {
        let json = br#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"mesh":0,"translation":[1.0,0.0,0.0]}],"meshes":[{"primitives":[{"attributes":{"POSITION":0},"indices":1}]}],"buffers":[{"byteLength":42}],"bufferViews":[{"buffer":0,"byteOffset":0,"byteLength":36},{"buffer":0,"byteOffset":36,"byteLength":6}],"accessors":[{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]},{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}]}"#;

        let mut bin: Vec<u8> = Vec::new();
        for value in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0] {
            bin.extend_from_slice(&value.to_le_bytes());
        }
        for index in [0u16, 1, 2] {
            bin.extend_from_slice(&index.to_le_bytes());
        }

        let mut json_chunk = json.to_vec();
        while json_chunk.len() % 4 != 0 {
            json_chunk.push(b' ');
        }
        let mut bin_chunk = bin;
        while bin_chunk.len() % 4 != 0 {
            bin_chunk.push(0);
        }

        let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json_chunk);
        glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin_chunk);
        glb
    }

    #[test]
    fn parses_glb_and_applies_node_transforms() {
        let model = parse_model(&tiny_glb(), Path::new("triangle.glb")).unwrap();
        assert_eq!(model.primitives.len(), 1);
        assert_eq!(model.triangle_count(), 1);
        // The node translation shifted the triangle one unit along +x.
        assert!((model.min - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
        assert!((model.max - Vec3::new(2.0, 1.0, 0.0)).length() < 1e-6);
        // Normals were generated for the untextured triangle.
        let normal = Vec3::from_array(model.primitives[0].normals[0]);
        assert!((normal - Vec3::Z).length() < 1e-5);
        // No material bound: default PBR fallback.
        assert_eq!(model.primitives[0].material, MaterialFactors::default());
    }

    #[test]
    fn garbage_bytes_fail_with_a_parse_error() {
        let err = parse_model(b"definitely not gltf", Path::new("bad.glb")).unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn recenter_moves_box_center_to_origin_and_is_idempotent() {
        let mut model = parse_model(&tiny_glb(), Path::new("triangle.glb")).unwrap();
        let translation = model.recenter();
        assert!((translation - Vec3::new(-1.5, -0.5, 0.0)).length() < 1e-6);
        assert!(model.center().length() < 1e-6);

        let again = model.recenter();
        assert!(again.length() < 1e-6);
    }

    #[test]
    fn computed_normals_are_area_weighted_and_unit_length() {
        let positions = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for normal in normals {
            assert!((Vec3::from_array(normal) - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_one() {
        let mut path = std::env::temp_dir();
        path.push(format!("turntable_progress_{}.bin", std::process::id()));
        std::fs::write(&path, vec![7u8; 3 * READ_CHUNK + 11]).unwrap();

        let (tx, rx) = mpsc::channel();
        let bytes = read_with_progress(&path, &tx).unwrap();
        drop(tx);
        assert_eq!(bytes.len(), 3 * READ_CHUNK + 11);

        let mut last = 0.0f32;
        let mut count = 0;
        for event in rx.try_iter() {
            if let LoadEvent::Progress(fraction) = event {
                assert!(fraction >= last);
                assert!((0.0..=1.0).contains(&fraction));
                last = fraction;
                count += 1;
            }
        }
        assert!(count >= 4);
        assert!((last - 1.0).abs() < 1e-6);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_reports_a_read_error() {
        let (tx, _rx) = mpsc::channel();
        let err = read_with_progress(Path::new("does/not/exist.glb"), &tx).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }
}
