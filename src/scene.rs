//! Scene collaborator used by the drawing tools.
//!
//! [`SceneBackend`] is the seam between the tools in this crate and the 3D
//! engine that owns meshes and materials. [`SceneGraph`] is an in-memory
//! backend that keeps every live artifact around so that headless tools and
//! tests can inspect what was drawn.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::Vec3;
use log::{trace, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Opaque handle to a drawable object owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactHandle(u64);

impl ArtifactHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Opaque handle to a reusable surface style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaterialHandle(u64);

impl MaterialHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Operations the drawing tools need from the 3D engine.
pub trait SceneBackend {
    fn create_line_artifact(&mut self, points: &[Vec3], colors: &[Color]) -> ArtifactHandle;
    fn create_ribbon_artifact(&mut self, rail_a: &[Vec3], rail_b: &[Vec3]) -> ArtifactHandle;
    fn create_box_artifact(&mut self, size: f32) -> ArtifactHandle;
    fn create_sphere_artifact(&mut self, diameter: f32) -> ArtifactHandle;
    fn release_artifact(&mut self, artifact: ArtifactHandle);

    fn create_material(&mut self) -> MaterialHandle;
    fn set_material_color(&mut self, material: MaterialHandle, color: Color);
    fn set_material_alpha(&mut self, material: MaterialHandle, alpha: f32);
    fn set_material_texture(&mut self, material: MaterialHandle, path: &str);

    fn set_artifact_material(&mut self, artifact: ArtifactHandle, material: MaterialHandle);
    fn set_artifact_position(&mut self, artifact: ArtifactHandle, position: Vec3);
    fn set_artifact_pickable(&mut self, artifact: ArtifactHandle, pickable: bool);
    fn set_artifact_draggable(&mut self, artifact: ArtifactHandle, draggable: bool);
    /// Marks the artifact as authored by the user rather than part of the environment.
    fn set_artifact_user_flag(&mut self, artifact: ArtifactHandle, user_added: bool);
}

/// Geometry stored for an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArtifactShape {
    Lines { points: Vec<Vec3>, colors: Vec<Color> },
    Ribbon { rail_a: Vec<Vec3>, rail_b: Vec<Vec3> },
    Box { size: f32 },
    Sphere { diameter: f32 },
}

impl ArtifactShape {
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactShape::Lines { .. } => "lines",
            ArtifactShape::Ribbon { .. } => "ribbon",
            ArtifactShape::Box { .. } => "box",
            ArtifactShape::Sphere { .. } => "sphere",
        }
    }
}

/// Live artifact as tracked by [`SceneGraph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub shape: ArtifactShape,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialHandle>,
    pub pickable: bool,
    pub draggable: bool,
    pub user_added: bool,
}

impl Artifact {
    fn new(shape: ArtifactShape) -> Self {
        Self {
            shape,
            position: Vec3::ZERO,
            material: None,
            pickable: true,
            draggable: false,
            user_added: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub color: Color,
    pub alpha: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            alpha: 1.0,
            texture: None,
        }
    }
}

/// Allocation counters kept by [`SceneGraph`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    pub artifacts_created: usize,
    pub artifacts_released: usize,
    pub materials_created: usize,
    pub material_color_writes: usize,
}

impl SceneStats {
    pub fn live_artifacts(&self) -> usize {
        self.artifacts_created - self.artifacts_released
    }
}

#[derive(Debug, Default)]
struct SceneStore {
    next_id: u64,
    artifacts: BTreeMap<ArtifactHandle, Artifact>,
    materials: BTreeMap<MaterialHandle, Material>,
    stats: SceneStats,
}

impl SceneStore {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert(&mut self, shape: ArtifactShape) -> ArtifactHandle {
        let handle = ArtifactHandle(self.next_id());
        trace!("creating {} artifact {}", shape.kind(), handle.0);
        self.artifacts.insert(handle, Artifact::new(shape));
        self.stats.artifacts_created += 1;
        handle
    }
}

/// Shared in-memory scene. Clones refer to the same store.
#[derive(Debug, Default)]
pub struct SceneGraph {
    store: Arc<RwLock<SceneStore>>,
}

impl Clone for SceneGraph {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the requested artifact if it is still live.
    pub fn artifact(&self, handle: ArtifactHandle) -> Option<Artifact> {
        self.store.read().artifacts.get(&handle).cloned()
    }

    /// Returns a snapshot of all live artifacts in creation order.
    pub fn live_artifacts(&self) -> Vec<(ArtifactHandle, Artifact)> {
        self.store
            .read()
            .artifacts
            .iter()
            .map(|(handle, artifact)| (*handle, artifact.clone()))
            .collect()
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<Material> {
        self.store.read().materials.get(&handle).cloned()
    }

    pub fn stats(&self) -> SceneStats {
        self.store.read().stats
    }

    fn update_artifact<F>(&self, handle: ArtifactHandle, updater: F)
    where
        F: FnOnce(&mut Artifact),
    {
        match self.store.write().artifacts.get_mut(&handle) {
            Some(artifact) => updater(artifact),
            None => warn!("ignoring update of unknown artifact {}", handle.0),
        }
    }

    fn update_material<F>(&self, handle: MaterialHandle, updater: F)
    where
        F: FnOnce(&mut Material),
    {
        match self.store.write().materials.get_mut(&handle) {
            Some(material) => updater(material),
            None => warn!("ignoring update of unknown material {}", handle.0),
        }
    }
}

impl SceneBackend for SceneGraph {
    fn create_line_artifact(&mut self, points: &[Vec3], colors: &[Color]) -> ArtifactHandle {
        self.store.write().insert(ArtifactShape::Lines {
            points: points.to_vec(),
            colors: colors.to_vec(),
        })
    }

    fn create_ribbon_artifact(&mut self, rail_a: &[Vec3], rail_b: &[Vec3]) -> ArtifactHandle {
        self.store.write().insert(ArtifactShape::Ribbon {
            rail_a: rail_a.to_vec(),
            rail_b: rail_b.to_vec(),
        })
    }

    fn create_box_artifact(&mut self, size: f32) -> ArtifactHandle {
        self.store.write().insert(ArtifactShape::Box { size })
    }

    fn create_sphere_artifact(&mut self, diameter: f32) -> ArtifactHandle {
        self.store.write().insert(ArtifactShape::Sphere { diameter })
    }

    fn release_artifact(&mut self, artifact: ArtifactHandle) {
        let mut store = self.store.write();
        if store.artifacts.remove(&artifact).is_some() {
            trace!("released artifact {}", artifact.0);
            store.stats.artifacts_released += 1;
        } else {
            warn!("release of unknown artifact {}", artifact.0);
        }
    }

    fn create_material(&mut self) -> MaterialHandle {
        let mut store = self.store.write();
        let handle = MaterialHandle(store.next_id());
        store.materials.insert(handle, Material::default());
        store.stats.materials_created += 1;
        handle
    }

    fn set_material_color(&mut self, material: MaterialHandle, color: Color) {
        self.update_material(material, |m| m.color = color);
        self.store.write().stats.material_color_writes += 1;
    }

    fn set_material_alpha(&mut self, material: MaterialHandle, alpha: f32) {
        self.update_material(material, |m| m.alpha = alpha);
    }

    fn set_material_texture(&mut self, material: MaterialHandle, path: &str) {
        self.update_material(material, |m| m.texture = Some(path.to_string()));
    }

    fn set_artifact_material(&mut self, artifact: ArtifactHandle, material: MaterialHandle) {
        self.update_artifact(artifact, |a| a.material = Some(material));
    }

    fn set_artifact_position(&mut self, artifact: ArtifactHandle, position: Vec3) {
        self.update_artifact(artifact, |a| a.position = position);
    }

    fn set_artifact_pickable(&mut self, artifact: ArtifactHandle, pickable: bool) {
        self.update_artifact(artifact, |a| a.pickable = pickable);
    }

    fn set_artifact_draggable(&mut self, artifact: ArtifactHandle, draggable: bool) {
        self.update_artifact(artifact, |a| a.draggable = draggable);
    }

    fn set_artifact_user_flag(&mut self, artifact: ArtifactHandle, user_added: bool) {
        self.update_artifact(artifact, |a| a.user_added = user_added);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_store() {
        let mut scene = SceneGraph::new();
        let observer = scene.clone();
        let handle = scene.create_box_artifact(0.5);
        scene.set_artifact_position(handle, Vec3::new(1.0, 2.0, 3.0));

        let artifact = observer.artifact(handle).unwrap();
        assert_eq!(artifact.shape, ArtifactShape::Box { size: 0.5 });
        assert_eq!(artifact.position, Vec3::new(1.0, 2.0, 3.0));
        assert!(artifact.pickable);
        assert!(!artifact.user_added);
    }

    #[test]
    fn release_removes_artifact_and_counts() {
        let mut scene = SceneGraph::new();
        let first = scene.create_sphere_artifact(1.0);
        let second = scene.create_line_artifact(&[Vec3::ZERO, Vec3::X], &[Color::WHITE; 2]);
        scene.release_artifact(first);
        scene.release_artifact(first);

        assert!(scene.artifact(first).is_none());
        assert!(scene.artifact(second).is_some());
        let stats = scene.stats();
        assert_eq!(stats.artifacts_created, 2);
        assert_eq!(stats.artifacts_released, 1);
        assert_eq!(stats.live_artifacts(), 1);
    }

    #[test]
    fn materials_track_color_alpha_and_texture() {
        let mut scene = SceneGraph::new();
        let material = scene.create_material();
        scene.set_material_color(material, Color::GREEN);
        scene.set_material_alpha(material, 0.7);
        scene.set_material_texture(material, "img/grass.png");

        let stored = scene.material(material).unwrap();
        assert_eq!(stored.color, Color::GREEN);
        assert_eq!(stored.alpha, 0.7);
        assert_eq!(stored.texture.as_deref(), Some("img/grass.png"));
        assert_eq!(scene.stats().materials_created, 1);
        assert_eq!(scene.stats().material_color_writes, 1);
    }
}
