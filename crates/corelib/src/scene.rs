//! Scene: the explicit application state that replaces ad-hoc globals.

use crate::Vec3;
use crate::transform::Transform;

/// Instance id (dense, index into the instance list).
pub type InstanceId = u32;

/// One drawable placement of the scene's mesh.
#[derive(Clone, Copy, Debug)]
pub struct MeshInstance {
    pub transform: Transform,
    /// Euler spin speed in radians per second; zero keeps the instance
    /// static.
    pub spin: Vec3,
}

/// All instances sharing the currently loaded mesh.
#[derive(Default)]
pub struct Scene {
    instances: Vec<MeshInstance>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, transform: Transform, spin: Vec3) -> InstanceId {
        let id = self.instances.len() as InstanceId;
        self.instances.push(MeshInstance { transform, spin });
        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshInstance> {
        self.instances.iter()
    }

    /// Advance per-instance spin by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        for inst in &mut self.instances {
            inst.transform.rotation_euler += inst.spin * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    #[test]
    fn spawn_and_iterate() {
        let mut scene = Scene::new();
        let a = scene.spawn(Transform::from_translation(vec3(0.0, 0.0, -2.0)), Vec3::Y);
        let b = scene.spawn(Transform::from_translation(vec3(0.0, 0.0, -4.0)), Vec3::ZERO);
        assert_eq!((a, b), (0, 1));
        assert_eq!(scene.len(), 2);
        let zs: Vec<f32> = scene.iter().map(|i| i.transform.translation.z).collect();
        assert_eq!(zs, vec![-2.0, -4.0]);
    }

    #[test]
    fn update_applies_spin() {
        let mut scene = Scene::new();
        scene.spawn(Transform::identity(), vec3(0.0, 2.0, 0.0));
        scene.spawn(Transform::identity(), Vec3::ZERO);
        scene.update(0.5);
        let rots: Vec<f32> = scene.iter().map(|i| i.transform.rotation_euler.y).collect();
        assert_eq!(rots, vec![1.0, 0.0]);
    }
}
