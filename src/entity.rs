use glam::{const_vec3, vec3, Quat, Vec3};
use rand::Rng;

use crate::window::Size;

pub const STAR_COUNT: usize = 2000;
pub const METEOR_COUNT: usize = 8;

/// 0xFFD700, the glow color meteors and lights start from.
const GOLD: Vec3 = const_vec3!([1., 0.84313726, 0.]);

#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub starfield: Starfield,
    pub meteors: [Meteor; METEOR_COUNT],
    pub lights: [PointLight; 2],
}

impl Scene {
    pub fn new(size: Size, rng: &mut impl Rng) -> Self {
        let camera = Camera {
            position: vec3(0., 0., 5.),
            rotation: Quat::IDENTITY,
            fov: 75.,
            aspect_ratio: size.aspect_ratio(),
            near: 0.1,
            far: 1000.,
        };

        let starfield = Starfield::new(rng);

        let meteors = [(); METEOR_COUNT].map(|_| Meteor::spawn(rng));

        let lights = [
            PointLight {
                position: vec3(5., 5., 5.),
                color: GOLD,
                intensity: 1.,
                range: 0.,
            },
            PointLight {
                position: vec3(0., 0., 100.),
                color: GOLD,
                intensity: 1.,
                range: 200.,
            },
        ];

        Self {
            camera,
            starfield,
            meteors,
            lights,
        }
    }

    pub fn handle_resize(&mut self, size: Size) {
        self.camera.aspect_ratio = size.aspect_ratio();
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

/// The distant-star backdrop: a fixed point cloud spun slowly as a whole.
/// Star positions never change after creation.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub points: Vec<Vec3>,
    pub yaw: f32,
    pub pitch: f32,
}

impl Starfield {
    fn new(rng: &mut impl Rng) -> Self {
        let points = (0..STAR_COUNT)
            .map(|_| {
                vec3(
                    rng.gen_range(-500.0..500.0),
                    rng.gen_range(-500.0..500.0),
                    rng.gen_range(-500.0..500.0),
                )
            })
            .collect();

        Self {
            points,
            yaw: 0.,
            pitch: 0.,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Meteor {
    pub position: Vec3,
    pub velocity: Vec3,
    pub scale: f32,
    pub opacity: f32,
    pub hue_offset: f32,
    pub color: Vec3,
}

impl Meteor {
    pub fn spawn(rng: &mut impl Rng) -> Self {
        let mut meteor = Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            scale: 1.,
            opacity: 0.,
            hue_offset: rng.gen_range(0.0..1.0),
            color: GOLD,
        };
        meteor.respawn(rng);
        meteor
    }

    /// Re-seeds a faded meteor in place: above and to the right of the view,
    /// falling toward the lower left, drifting toward the camera. The hue
    /// offset (and with it the current color) is left untouched so the glow
    /// cycle stays continuous across lifetimes.
    pub fn respawn(&mut self, rng: &mut impl Rng) {
        self.position = vec3(
            rng.gen_range(50.0..200.0),
            rng.gen_range(40.0..100.0),
            rng.gen_range(-40.0..40.0),
        );
        self.velocity = vec3(
            -rng.gen_range(0.8..2.6),
            -rng.gen_range(0.6..1.8),
            rng.gen_range(0.0..0.5),
        );
        self.scale = rng.gen_range(1.5..3.0);
        self.opacity = 1.;
    }
}

/// The star and meteor materials are unlit, so these only surface in the
/// scene debug dump.
#[derive(Debug, Copy, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Attenuation distance; 0 leaves the light unattenuated.
    pub range: f32,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn rng() -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(7)
    }

    #[test]
    fn bootstrap_builds_the_whole_scene() {
        let scene = Scene::new(
            Size {
                width: 1920,
                height: 1080,
            },
            &mut rng(),
        );

        assert_eq!(scene.starfield.points.len(), STAR_COUNT);
        assert_eq!(scene.meteors.len(), METEOR_COUNT);
        assert_eq!(scene.lights.len(), 2);

        assert_eq!(scene.camera.fov, 75.);
        assert_eq!(scene.camera.near, 0.1);
        assert_eq!(scene.camera.far, 1000.);
        assert_eq!(scene.camera.position, vec3(0., 0., 5.));
        assert!((scene.camera.aspect_ratio - 1920. / 1080.).abs() < 1e-6);
    }

    #[test]
    fn stars_fill_a_1000_unit_cube_around_the_origin() {
        let scene = Scene::new(
            Size {
                width: 640,
                height: 360,
            },
            &mut rng(),
        );

        for point in &scene.starfield.points {
            for coord in [point.x, point.y, point.z] {
                assert!((-500.0..500.0).contains(&coord), "{:?}", point);
            }
        }
        assert_eq!(scene.starfield.yaw, 0.);
        assert_eq!(scene.starfield.pitch, 0.);
    }

    #[test]
    fn meteors_start_fully_opaque_with_hue_offsets() {
        let scene = Scene::new(
            Size {
                width: 640,
                height: 360,
            },
            &mut rng(),
        );

        for meteor in &scene.meteors {
            assert_eq!(meteor.opacity, 1.);
            assert!((0.0..1.0).contains(&meteor.hue_offset));
            assert_eq!(meteor.color, GOLD);
        }
    }

    #[test]
    fn respawn_stays_inside_the_spawn_window() {
        let mut rng = rng();
        let mut meteor = Meteor::spawn(&mut rng);

        for _ in 0..1000 {
            meteor.respawn(&mut rng);

            assert!((50.0..200.0).contains(&meteor.position.x));
            assert!((40.0..100.0).contains(&meteor.position.y));
            assert!((-40.0..40.0).contains(&meteor.position.z));

            assert!(meteor.velocity.x > -2.6 && meteor.velocity.x <= -0.8);
            assert!(meteor.velocity.y > -1.8 && meteor.velocity.y <= -0.6);
            assert!((0.0..0.5).contains(&meteor.velocity.z));

            assert!((1.5..3.0).contains(&meteor.scale));
            assert_eq!(meteor.opacity, 1.);
        }
    }

    #[test]
    fn respawn_keeps_the_hue_offset() {
        let mut rng = rng();
        let mut meteor = Meteor::spawn(&mut rng);
        let hue_offset = meteor.hue_offset;

        for _ in 0..100 {
            meteor.respawn(&mut rng);
            assert_eq!(meteor.hue_offset, hue_offset);
        }
    }

    #[test]
    fn resize_updates_the_camera_aspect_ratio() {
        let mut scene = Scene::new(
            Size {
                width: 1920,
                height: 1080,
            },
            &mut rng(),
        );

        scene.handle_resize(Size {
            width: 800,
            height: 600,
        });

        assert!((scene.camera.aspect_ratio - 800. / 600.).abs() < 1e-6);
    }
}
