//! Animated globe scene: spinning globe and cloud layer, orbiting moon,
//! slowly turning starfield and the incoming asteroid.
//!
//! Bodies are hecs entities. Every pose is recomputed from the scene clock's
//! elapsed time on each tick, so motion speed does not depend on frame rate.

use engine_core::{SceneClock, Transform, VizError};
use glam::Vec3;
use hecs::{Entity, World};
use procgen::{Starfield, StarfieldParams, Trajectory};
use rand::RngCore;
use renderer::{SceneBody, SceneHost};

use crate::config::SceneConfig;

/// Which host body an entity drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Body(pub SceneBody);

/// Constant spin about `axis`, expressed per reference frame.
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    pub axis: Vec3,
    pub rate_per_frame: f32,
}

/// Circular orbit with a vertical bob at half the orbital frequency.
#[derive(Debug, Clone, Copy)]
pub struct Orbit {
    pub radius: f32,
    /// Radians per second.
    pub speed: f32,
    pub vertical_amplitude: f32,
}

impl Orbit {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let a = t * self.speed;
        Vec3::new(
            a.cos() * self.radius,
            (a * 0.5).sin() * self.vertical_amplitude,
            a.sin() * self.radius,
        )
    }
}

/// Travel along a trajectory, restarting every `period` seconds.
#[derive(Debug, Clone)]
pub struct FollowPath {
    pub trajectory: Trajectory,
    pub period: f32,
    /// Scene time at which the path was started.
    pub started_at: f32,
}

impl FollowPath {
    pub fn position_at(&self, t: f32) -> Vec3 {
        let period = self.period.max(f32::EPSILON);
        let phase = ((t - self.started_at).max(0.0) % period) / period;
        self.trajectory.point_at(phase)
    }
}

pub struct SceneAnimator {
    world: World,
    clock: SceneClock,
    config: SceneConfig,
    starfield: Starfield,
    asteroid: Option<Entity>,
}

impl SceneAnimator {
    /// Build the scene. The starfield is sampled here, once, from `rng`.
    pub fn new(config: &SceneConfig, rng: &mut dyn RngCore) -> Self {
        let starfield = Starfield::generate(
            StarfieldParams {
                count: config.star_count,
                inner_radius: config.star_inner_radius,
                outer_radius: config.star_outer_radius,
            },
            rng,
        );

        let tilt = config.axial_tilt_deg.to_radians();
        let globe_axis = Vec3::new(-tilt.sin(), tilt.cos(), 0.0);

        let mut world = World::new();
        world.spawn((
            Body(SceneBody::Globe),
            Transform::default(),
            Spin { axis: globe_axis, rate_per_frame: config.globe_spin_per_frame },
        ));
        world.spawn((
            Body(SceneBody::Clouds),
            Transform::default().with_scale(config.cloud_scale),
            Spin { axis: globe_axis, rate_per_frame: config.cloud_spin_per_frame },
        ));
        world.spawn((
            Body(SceneBody::Moon),
            Transform::default().with_scale(config.moon_scale),
            Spin { axis: Vec3::Y, rate_per_frame: config.moon_spin_per_frame },
            Orbit {
                radius: config.moon_orbit_radius,
                speed: config.moon_orbit_speed,
                vertical_amplitude: config.moon_vertical_amplitude,
            },
        ));
        world.spawn((
            Body(SceneBody::Starfield),
            Transform::default(),
            Spin { axis: Vec3::Y, rate_per_frame: config.starfield_spin_per_frame },
        ));

        log::debug!("scene animator: {} stars", starfield.len());
        let mut animator = Self {
            world,
            clock: SceneClock::new(),
            config: config.clone(),
            starfield,
            asteroid: None,
        };
        animator.update();
        animator
    }

    /// Advance the clock by `dt` seconds and recompute every pose.
    pub fn tick(&mut self, dt: f64) {
        self.clock.advance(dt);
        self.update();
    }

    /// Recompute poses from the current elapsed time.
    pub fn update(&mut self) {
        let t = self.clock.elapsed_seconds() as f32;
        let reference_frames = t * self.config.reference_fps;

        for (_, (transform, spin)) in self.world.query_mut::<(&mut Transform, &Spin)>() {
            transform.set_spin_about(spin.axis, spin.rate_per_frame * reference_frames);
        }
        for (_, (transform, orbit)) in self.world.query_mut::<(&mut Transform, &Orbit)>() {
            transform.position = orbit.position_at(t);
        }
        for (_, (transform, path)) in self.world.query_mut::<(&mut Transform, &FollowPath)>() {
            transform.position = path.position_at(t);
        }
    }

    /// Aim the asteroid at `target` (world space), replacing any previous one.
    pub fn set_impact_target(&mut self, target: Option<Vec3>) {
        if let Some(old) = self.asteroid.take() {
            self.world.despawn(old).ok();
        }
        let Some(target) = target.filter(|t| t.is_finite()) else {
            return;
        };

        let trajectory = Trajectory::approach(
            target,
            self.config.trajectory_start_distance,
            self.config.trajectory_arc_height,
            self.config.trajectory_samples,
        );
        let path = FollowPath {
            trajectory,
            period: self.config.approach_seconds,
            started_at: self.clock.elapsed_seconds() as f32,
        };
        let transform = Transform::from_position(path.position_at(path.started_at));
        self.asteroid = Some(self.world.spawn((Body(SceneBody::Asteroid), transform, path)));
    }

    /// Upload every body's model matrix.
    pub fn push_to_host(&mut self, host: &mut dyn SceneHost) -> Result<(), VizError> {
        for (_, (body, transform)) in self.world.query_mut::<(&Body, &Transform)>() {
            host.set_body_transform(body.0, transform.to_matrix())?;
        }
        Ok(())
    }

    pub fn transform_of(&self, body: SceneBody) -> Option<Transform> {
        self.world
            .query::<(&Body, &Transform)>()
            .iter()
            .find(|(_, (b, _))| b.0 == body)
            .map(|(_, (_, t))| *t)
    }

    pub fn trajectory(&self) -> Option<Trajectory> {
        let entity = self.asteroid?;
        self.world
            .get::<&FollowPath>(entity)
            .ok()
            .map(|path| path.trajectory.clone())
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn clock(&self) -> &SceneClock {
        &self.clock
    }

    pub fn body_count(&self) -> usize {
        self.world.len() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> SceneConfig {
        SceneConfig {
            star_count: 200,
            ..Default::default()
        }
    }

    fn animator() -> SceneAnimator {
        SceneAnimator::new(&small_config(), &mut StdRng::seed_from_u64(17))
    }

    #[test]
    fn motion_depends_on_elapsed_time_only() {
        let mut fast = animator();
        let mut slow = animator();
        for _ in 0..120 {
            fast.tick(1.0 / 120.0);
        }
        for _ in 0..30 {
            slow.tick(1.0 / 30.0);
        }
        for body in [SceneBody::Globe, SceneBody::Clouds, SceneBody::Moon, SceneBody::Starfield] {
            let a = fast.transform_of(body).unwrap();
            let b = slow.transform_of(body).unwrap();
            assert!(a.position.distance(b.position) < 1e-3, "{body:?}");
            assert!(a.rotation.angle_between(b.rotation) < 1e-3, "{body:?}");
        }
    }

    #[test]
    fn globe_turns_at_the_reference_rate() {
        let mut a = animator();
        a.tick(1.0);
        let globe = a.transform_of(SceneBody::Globe).unwrap();
        let expected = 0.001 * 60.0;
        assert!((globe.rotation.angle_between(glam::Quat::IDENTITY) - expected).abs() < 1e-4);
        let clouds = a.transform_of(SceneBody::Clouds).unwrap();
        assert!(clouds.rotation.angle_between(globe.rotation) > 1e-3);
    }

    #[test]
    fn moon_follows_its_orbit() {
        let config = small_config();
        let mut a = animator();
        a.tick(2.5);
        let moon = a.transform_of(SceneBody::Moon).unwrap();
        let angle = 2.5 * config.moon_orbit_speed;
        let expected = Vec3::new(
            angle.cos() * config.moon_orbit_radius,
            (angle * 0.5).sin() * config.moon_vertical_amplitude,
            angle.sin() * config.moon_orbit_radius,
        );
        assert!(moon.position.distance(expected) < 1e-4);
        assert!((moon.scale.x - config.moon_scale).abs() < 1e-6);
    }

    #[test]
    fn starfield_is_generated_once() {
        let mut a = animator();
        let before = a.starfield().as_bytes().to_vec();
        a.tick(10.0);
        a.set_impact_target(Some(Vec3::X * 5.0));
        a.tick(10.0);
        assert_eq!(a.starfield().as_bytes(), &before[..]);
        assert_eq!(a.starfield().len(), 200);
    }

    #[test]
    fn asteroid_is_replaced_not_duplicated() {
        let mut a = animator();
        assert_eq!(a.body_count(), 4);
        a.set_impact_target(Some(Vec3::new(0.0, 0.0, -5.0)));
        a.set_impact_target(Some(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(a.body_count(), 5);
        let end = a.trajectory().unwrap().end;
        assert_eq!(end, Vec3::new(5.0, 0.0, 0.0));
        a.set_impact_target(None);
        assert_eq!(a.body_count(), 4);
        assert!(a.trajectory().is_none());
    }

    #[test]
    fn asteroid_approaches_target() {
        let mut a = animator();
        let target = Vec3::new(0.0, 0.0, -5.0);
        a.set_impact_target(Some(target));
        let start = a.transform_of(SceneBody::Asteroid).unwrap().position;
        a.tick(small_config().approach_seconds as f64 * 0.99);
        let near_end = a.transform_of(SceneBody::Asteroid).unwrap().position;
        assert!(near_end.distance(target) < start.distance(target));
    }

    #[test]
    fn pushes_every_body_to_the_host() {
        use renderer::{HeadlessHost, HostConfig};
        let mut host = HeadlessHost::new(&HostConfig::default());
        let mut a = animator();
        a.set_impact_target(Some(Vec3::X * 5.0));
        a.tick(0.5);
        a.push_to_host(&mut host).unwrap();
        for body in [
            SceneBody::Globe,
            SceneBody::Clouds,
            SceneBody::Moon,
            SceneBody::Starfield,
            SceneBody::Asteroid,
        ] {
            assert!(host.body_transform(body).is_some(), "{body:?}");
        }
        host.destroy();
        assert!(a.push_to_host(&mut host).is_err());
    }
}
