//! Engine shell: fixed-rate simulation and input threads running
//! beside the window loop, plus whole-frame rendering.
//!
//! The window loop stays on the main thread and only reads shared
//! state, so a slow frame never stalls the simulation and a slow tick
//! never stalls the frame.

use crate::config::EngineConfig;
use crate::input::{integrate, InputFlags, Pose, PoseCell};
use crate::particles::{Emission, ParticleSystem, PARTICLE_RADIUS};
use crate::rasterizer::{Camera, Screen, Vec3};
use crate::scene;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

const TICK_TARGET: Duration = Duration::from_millis(16);
const TICK_FLOOR: Duration = Duration::from_millis(2);

/// Time to sleep after a tick that took `elapsed`. A tick that blows
/// its budget still yields a little instead of spinning.
fn sleep_for(elapsed: Duration) -> Duration {
    TICK_TARGET.saturating_sub(elapsed).max(TICK_FLOOR)
}

/// Keeps a loop near sixty ticks per second.
struct TickPacer {
    last: Instant,
}

impl TickPacer {
    fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Sleeps off the rest of the tick budget and starts the next one.
    fn pace(&mut self) {
        thread::sleep(sleep_for(self.last.elapsed()));
        self.last = Instant::now();
    }
}

/// Shared handles plus the worker threads behind them.
pub struct Engine {
    pub pose: Arc<PoseCell>,
    pub flags: Arc<InputFlags>,
    pub particles: Arc<Mutex<ParticleSystem>>,
    stop: Arc<AtomicBool>,
    ticks_per_sec: Arc<AtomicU32>,
    workers: Vec<JoinHandle<()>>,
}

impl Engine {
    /// Spawns the simulation and input threads and hands back the
    /// shared state the window loop works with.
    pub fn start(config: &EngineConfig) -> Self {
        let pose = Arc::new(PoseCell::new(config.start_pose));
        let flags = Arc::new(InputFlags::new(config.depth_test, config.depth_overlay));
        let particles = Arc::new(Mutex::new(match config.particle_seed {
            Some(seed) => ParticleSystem::with_seed(seed),
            None => ParticleSystem::new(),
        }));
        let stop = Arc::new(AtomicBool::new(false));
        let ticks_per_sec = Arc::new(AtomicU32::new(0));

        let sim = {
            let pose = Arc::clone(&pose);
            let flags = Arc::clone(&flags);
            let particles = Arc::clone(&particles);
            let stop = Arc::clone(&stop);
            let ticks_per_sec = Arc::clone(&ticks_per_sec);
            thread::spawn(move || simulation_loop(&pose, &flags, &particles, &stop, &ticks_per_sec))
        };
        let input = {
            let pose = Arc::clone(&pose);
            let flags = Arc::clone(&flags);
            let stop = Arc::clone(&stop);
            thread::spawn(move || input_loop(&pose, &flags, &stop))
        };
        info!("Simulation and input threads started");

        Self {
            pose,
            flags,
            particles,
            stop,
            ticks_per_sec,
            workers: vec![sim, input],
        }
    }

    /// Simulation ticks counted over the last full second.
    pub fn tick_rate(&self) -> u32 {
        self.ticks_per_sec.load(Ordering::Relaxed)
    }

    /// Signals both threads and waits for them to finish.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if self.workers.is_empty() {
            return;
        }
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("Worker thread panicked");
            }
        }
        info!("Worker threads stopped");
    }
}

/// Advances the particle system at a fixed rate. While the emit
/// button is held, each tick adds a burst starting just below the eye
/// and aimed along the look direction.
fn simulation_loop(
    pose: &PoseCell,
    flags: &InputFlags,
    particles: &Mutex<ParticleSystem>,
    stop: &AtomicBool,
    ticks_per_sec: &AtomicU32,
) {
    let mut pacer = TickPacer::new();
    let mut ticks = 0u32;
    let mut window = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        let emission = if flags.emitting() {
            let p = pose.load();
            let eye = p.world_eye();
            Some(Emission {
                origin: Vec3::new(eye.x, eye.y - 1.0, eye.z),
                dir: p.forward(),
            })
        } else {
            None
        };
        particles.lock().unwrap().tick(emission);

        ticks += 1;
        if window.elapsed() >= Duration::from_secs(1) {
            ticks_per_sec.store(ticks, Ordering::Relaxed);
            debug!(ticks, "simulation rate");
            ticks = 0;
            window = Instant::now();
        }
        pacer.pace();
    }
}

/// Folds sampled keys and accumulated mouse motion into the pose at
/// the same fixed rate the simulation runs at.
fn input_loop(pose: &PoseCell, flags: &InputFlags, stop: &AtomicBool) {
    let mut pacer = TickPacer::new();
    let mut ticks = 0u32;
    let mut window = Instant::now();
    while !stop.load(Ordering::Relaxed) {
        let moves = flags.sample_moves();
        let (dx, dy) = flags.take_look();
        let mut next = pose.load();
        integrate(&mut next, &moves, dx, dy);
        pose.store(next);

        ticks += 1;
        if window.elapsed() >= Duration::from_secs(1) {
            debug!(ticks, "input rate");
            ticks = 0;
            window = Instant::now();
        }
        pacer.pace();
    }
}

/// Everything one frame needs from the shared state.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub pose: Pose,
    pub depth_test: bool,
    pub depth_overlay: bool,
}

/// Draws one complete frame into the screen buffers.
pub fn render_frame(
    screen: &mut Screen,
    camera: &mut Camera,
    particles: &ParticleSystem,
    frame: FrameInput,
) {
    screen.set_depth_test(frame.depth_test);
    screen.clear();
    camera.set_translation(frame.pose.x, frame.pose.y, frame.pose.z);
    camera.set_rotation(frame.pose.pitch, frame.pose.yaw);
    scene::draw_axes(screen, camera);
    scene::draw_scene(screen, camera);
    for p in &particles.particles {
        screen.draw_circle(camera, p.loc, PARTICLE_RADIUS, p.color());
    }
    if frame.depth_overlay {
        screen.apply_depth_overlay();
    }
}
