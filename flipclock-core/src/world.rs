/// World controller: owns all animated state and reacts to platform ticks,
/// sensor samples and user input
use nalgebra::Vector3;
use std::f32::consts::FRAC_PI_4;
use std::time::Duration;

use crate::blinker::{Blinker, BlinkerHandle, Ink};
use crate::clock::{Clock3D, ClockTime, SlotGroup, CUBE_SIZE};
use crate::error::{SettingError, WorldError, WorldResult};
use crate::glyph::DigitSkin;
use crate::interpolator::{AnimationTables, InterpolationTable};
use crate::projection::{Camera, ProjectionMode};
use crate::render::{self, Canvas, TransparencyMode};
use crate::sampler::AxisSamplers;
use crate::transform::{angle_delta, normalize_angle, rotate_axis, scale, Axis};

/// Settings key of the world mode
pub const PKEY_WORLD_MODE: u32 = 1;
/// Settings key of the transparency mode
pub const PKEY_TRANSPARENCY_MODE: u32 = 2;

/// What an emulator reports when its sensor feed is off
const EMULATOR_IDLE_SAMPLE: [i32; 3] = [0, 0, -1000];

/// Longest accepted world update interval
pub const MAX_UPDATE_INTERVAL: Duration = Duration::from_secs(1);

const CONFIG_BLINK: (u32, u32, Ink, Ink) = (250, 250, Ink::FULL, Ink::NONE);
const MINUTES_BLINK: (u32, u32, Ink, Ink) = (500, 500, Ink::FULL, Ink::HALF);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorldMode {
    /// Camera follows the device tilt and spin physics run
    #[default]
    Dynamic,
    /// Fixed camera, no spin, frozen hundredths
    Steady,
}

impl WorldMode {
    pub fn toggled(self) -> Self {
        match self {
            WorldMode::Dynamic => WorldMode::Steady,
            WorldMode::Steady => WorldMode::Dynamic,
        }
    }
}

impl From<WorldMode> for i32 {
    fn from(mode: WorldMode) -> i32 {
        match mode {
            WorldMode::Dynamic => 1,
            WorldMode::Steady => 2,
        }
    }
}

impl TryFrom<i32> for WorldMode {
    type Error = SettingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WorldMode::Dynamic),
            2 => Ok(WorldMode::Steady),
            other => Err(SettingError::UnknownWorldMode(other)),
        }
    }
}

/// Side effect of a world mode transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    SubscribeAccel,
    UnsubscribeAccel,
    /// Stop spinning and return to the steady angle
    ResetSpin,
}

/// Exit actions of `from` followed by the enter actions of `to`
pub fn mode_transition(from: Option<WorldMode>, to: WorldMode) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(2);
    if from == Some(WorldMode::Dynamic) {
        effects.push(Effect::UnsubscribeAccel);
    }
    match to {
        WorldMode::Dynamic => effects.push(Effect::SubscribeAccel),
        WorldMode::Steady => effects.push(Effect::ResetSpin),
    }
    effects
}

/// Timer and sensor services of the host platform
pub trait Services {
    fn start_update_timer(&mut self, interval: Duration);
    fn cancel_update_timer(&mut self);
    fn subscribe_ticks(&mut self);
    fn unsubscribe_ticks(&mut self);
    fn subscribe_taps(&mut self);
    fn unsubscribe_taps(&mut self);
    fn subscribe_accel(&mut self);
    fn unsubscribe_accel(&mut self);
    /// Request a redraw; the host calls [`World::render`] on its next pass
    fn mark_dirty(&mut self);
}

/// Persistent integer key/value storage
pub trait SettingsStore {
    fn read_int(&self, key: u32) -> Option<i32>;
    fn write_int(&mut self, key: u32, value: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAxis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Spin boost
    Punch,
    /// Toggle the world mode
    Twist,
    /// Stop spinning and return to the steady angle
    Shake,
}

impl TapAxis {
    pub fn gesture(self) -> Gesture {
        match self {
            TapAxis::X => Gesture::Punch,
            TapAxis::Y => Gesture::Twist,
            TapAxis::Z => Gesture::Shake,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Up,
    Select,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Short,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The user has been inactive too long; the host should stop and exit
    Exit,
}

/// Tunables of the world
#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub update_interval: Duration,
    pub flip_steps: usize,
    pub spin_steps: usize,
    pub sampler_capacity: usize,
    /// Substitute acceleration (milli-g) when no live sample is available
    pub steady_attractor: [i32; 3],
    /// Spin angle per unit of spin speed per tick, in radians
    pub spin_rotation_quanta: f32,
    pub spin_rotation_steady: f32,
    pub spin_speed_button_step: i32,
    pub spin_speed_punch_step: i32,
    pub camera_distance: f32,
    pub zoom: f32,
    /// Seconds without input before a tick reports [`TickOutcome::Exit`]; 0 disables
    pub user_inactivity_limit: u32,
    pub skin: DigitSkin,
    /// Treat the emulator's idle reading (0, 0, -1000) as a missing sample.
    ///
    /// A real device lying flat reports the same values, so this is off by default.
    pub substitute_emulator_idle: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            update_interval: Duration::from_millis(35),
            flip_steps: 50,
            spin_steps: 75,
            sampler_capacity: 8,
            steady_attractor: [-81, -816, -571],
            spin_rotation_quanta: 0.0001,
            spin_rotation_steady: -FRAC_PI_4,
            spin_speed_button_step: 20,
            spin_speed_punch_step: 1000,
            camera_distance: 2.2 * CUBE_SIZE,
            zoom: 1.25,
            user_inactivity_limit: 90,
            skin: DigitSkin::Curvy,
            substitute_emulator_idle: false,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> WorldResult<()> {
        if self.update_interval.is_zero() {
            return Err(WorldError::InvalidConfig("update interval must be non-zero".into()));
        }
        if self.update_interval > MAX_UPDATE_INTERVAL {
            return Err(WorldError::InvalidConfig(format!(
                "update interval must be at most {} ms",
                MAX_UPDATE_INTERVAL.as_millis()
            )));
        }
        if self.flip_steps == 0 || self.spin_steps == 0 {
            return Err(WorldError::InvalidConfig("animation step counts must be non-zero".into()));
        }
        if self.sampler_capacity == 0 {
            return Err(WorldError::InvalidConfig("sampler capacity must be non-zero".into()));
        }
        if !(self.zoom > 0.0) || !(self.camera_distance > 0.0) {
            return Err(WorldError::InvalidConfig("zoom and camera distance must be positive".into()));
        }
        Ok(())
    }

    fn attractor_direction(&self) -> Vector3<f32> {
        let [x, y, z] = self.steady_attractor;
        Vector3::new(x as f32, -(y as f32), -(z as f32))
            .try_normalize(1e-6)
            .unwrap_or_else(Vector3::z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SpinEase {
    from: f32,
    delta: f32,
    step: usize,
}

/// Spin about the world Z axis with linear friction
#[derive(Debug, Clone, PartialEq)]
pub struct Spin {
    speed: i32,
    rotation: f32,
    ease: Option<SpinEase>,
}

impl Spin {
    pub fn new(rotation: f32) -> Self {
        Self {
            speed: 0,
            rotation: normalize_angle(rotation),
            ease: None,
        }
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn is_easing(&self) -> bool {
        self.ease.is_some()
    }

    fn reset(&mut self, rotation: f32) {
        self.speed = 0;
        self.rotation = normalize_angle(rotation);
        self.ease = None;
    }

    fn boost(&mut self, delta: i32) {
        self.speed = self.speed.saturating_add(delta);
        self.ease = None;
    }

    /// Stop and glide back to `target` along the shorter arc
    fn ease_to(&mut self, target: f32) {
        self.speed = 0;
        self.ease = Some(SpinEase {
            from: self.rotation,
            delta: angle_delta(self.rotation, target),
            step: 0,
        });
    }

    /// One tick: friction first, then move
    fn update(&mut self, quanta: f32, easing: &InterpolationTable) {
        self.speed -= self.speed.signum();

        if let Some(ease) = self.ease.as_mut() {
            ease.step += 1;
            self.rotation = normalize_angle(ease.from + ease.delta * easing.at(ease.step));
            if ease.step >= easing.steps() {
                self.ease = None;
            }
        } else if self.speed != 0 {
            self.rotation = normalize_angle(self.rotation + self.speed as f32 * quanta);
        }
    }
}

fn load_setting<T>(store: &dyn SettingsStore, key: u32) -> T
where
    T: TryFrom<i32, Error = SettingError> + Default + std::fmt::Debug,
{
    match store.read_int(key) {
        None => T::default(),
        Some(raw) => T::try_from(raw).unwrap_or_else(|err| {
            let fallback = T::default();
            log::warn!("Ignoring persisted key {}: {}, using {:?}", key, err, fallback);
            fallback
        }),
    }
}

/// Every piece of state the clock animates, owned in one place.
///
/// Tables and samplers are allocated by [`World::initialize`] and released
/// when [`World::finalize`] consumes the world; `start`/`stop` only
/// (un)subscribe from host services and may be repeated.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    mode: WorldMode,
    transparency: TransparencyMode,
    running: bool,
    config_mode: bool,
    spin: Spin,
    samplers: AxisSamplers,
    tables: AnimationTables,
    camera: Camera,
    clock: Clock3D,
    config_blinker: BlinkerHandle,
    minutes_blinker: BlinkerHandle,
    inactive_seconds: u32,
    update_count: u64,
    substituting: bool,
}

impl World {
    pub fn initialize(config: WorldConfig, store: &dyn SettingsStore) -> WorldResult<Self> {
        config.validate()?;

        let mode: WorldMode = load_setting(store, PKEY_WORLD_MODE);
        let transparency: TransparencyMode = load_setting(store, PKEY_TRANSPARENCY_MODE);

        let minutes_blinker = Blinker::new();
        let mut clock = Clock3D::new(config.skin);
        clock.bind_blinker(|group| group == SlotGroup::Minutes, Some(&minutes_blinker));

        let samplers = AxisSamplers::new(config.sampler_capacity, config.steady_attractor);
        let tables = AnimationTables::new(config.flip_steps, config.spin_steps);
        let spin = Spin::new(config.spin_rotation_steady);
        let camera = Camera::new(
            steady_view_point(&config),
            config.zoom,
            ProjectionMode::Perspective,
        );

        log::info!(
            "World initialized: mode {:?}, transparency {}, skin {}",
            mode,
            transparency,
            config.skin
        );

        Ok(Self {
            config,
            mode,
            transparency,
            running: false,
            config_mode: false,
            spin,
            samplers,
            tables,
            camera,
            clock,
            config_blinker: Blinker::new(),
            minutes_blinker,
            inactive_seconds: 0,
            update_count: 0,
            substituting: false,
        })
    }

    /// Subscribe to host services and run the first update
    pub fn start(&mut self, services: &mut dyn Services) {
        if self.running {
            return;
        }
        let (on_ms, off_ms, on_ink, off_ink) = MINUTES_BLINK;
        self.minutes_blinker.start(on_ms, off_ms, on_ink, off_ink);

        let effects = mode_transition(None, self.mode);
        self.apply(&effects, services);

        services.subscribe_ticks();
        services.subscribe_taps();
        services.start_update_timer(self.config.update_interval);
        self.running = true;
        log::info!("World started in {:?} mode", self.mode);

        self.update(services);
    }

    /// Unsubscribe from every host service. In-flight flips stay where they are.
    pub fn stop(&mut self, services: &mut dyn Services) {
        if !self.running {
            return;
        }
        if self.config_mode {
            self.exit_config_mode();
        }
        self.minutes_blinker.stop();
        services.cancel_update_timer();
        services.unsubscribe_ticks();
        services.unsubscribe_taps();
        services.unsubscribe_accel();
        self.running = false;
        log::info!("World stopped after {} updates", self.update_count);
    }

    /// Persist settings and release the world
    pub fn finalize(self, store: &mut dyn SettingsStore) {
        if self.running {
            log::warn!("Finalizing a running world");
        }
        store.write_int(PKEY_WORLD_MODE, self.mode.into());
        store.write_int(PKEY_TRANSPARENCY_MODE, self.transparency.into());
        log::info!(
            "World finalized: saved mode {:?}, transparency {}",
            self.mode,
            self.transparency
        );
    }

    /// One world tick: flips, hundredths, spin and camera
    pub fn update(&mut self, services: &mut dyn Services) {
        if !self.running {
            return;
        }
        self.update_count += 1;

        self.clock.update_animation(self.config.flip_steps);

        if self.mode == WorldMode::Dynamic {
            let elapsed_ms = u32::try_from(self.config.update_interval.as_millis()).unwrap_or(u32::MAX);
            self.clock.advance_hundredths(elapsed_ms);
            self.spin
                .update(self.config.spin_rotation_quanta, &self.tables.spin_rotation);
        }

        self.configure_camera();
        services.mark_dirty();
    }

    fn configure_camera(&mut self) {
        let view_point = match self.mode {
            WorldMode::Dynamic => {
                let mean = self.samplers.mean();
                let direction = Vector3::new(mean.x, -mean.y, -mean.z)
                    .try_normalize(1e-6)
                    .unwrap_or_else(|| self.config.attractor_direction());
                rotate_axis(
                    &scale(self.config.camera_distance, &direction),
                    Axis::Z,
                    self.spin.rotation(),
                )
            }
            WorldMode::Steady => steady_view_point(&self.config),
        };
        self.camera
            .look_at_origin_upright(view_point, self.config.zoom, ProjectionMode::Perspective);
    }

    /// Feed the current wall-clock time
    pub fn on_tick(&mut self, time: ClockTime) -> TickOutcome {
        if !self.running {
            return TickOutcome::Continue;
        }
        if self.spin.speed() == 0 {
            self.inactive_seconds = self.inactive_seconds.saturating_add(1);
        }
        let limit = self.config.user_inactivity_limit;
        if limit > 0 && self.inactive_seconds > limit {
            log::info!("No user activity for {} s, exiting", self.inactive_seconds);
            return TickOutcome::Exit;
        }

        let flips = self.clock.set_time(time);
        if flips > 0 {
            log::debug!("{:?}: {} digit flips", time, flips);
        }
        TickOutcome::Continue
    }

    /// Feed one raw accelerometer sample (milli-g)
    pub fn on_acceleration_sample(&mut self, x: i32, y: i32, z: i32) {
        if !self.running || self.mode != WorldMode::Dynamic {
            return;
        }
        if self.config.substitute_emulator_idle && [x, y, z] == EMULATOR_IDLE_SAMPLE {
            self.substitute_sample();
            return;
        }
        if self.substituting {
            log::debug!("Accelerometer samples available again");
            self.substituting = false;
        }
        self.samplers.push(x, y, z);
    }

    /// Feed the steady attractor in place of a missing sample
    pub fn on_sensor_unavailable(&mut self) {
        if !self.running || self.mode != WorldMode::Dynamic {
            return;
        }
        self.substitute_sample();
    }

    fn substitute_sample(&mut self) {
        if !self.substituting {
            log::debug!("Accelerometer unavailable, substituting steady attractor");
            self.substituting = true;
        }
        let [x, y, z] = self.config.steady_attractor;
        self.samplers.push(x, y, z);
    }

    pub fn on_tap(&mut self, axis: TapAxis, direction: i32, services: &mut dyn Services) {
        if !self.running {
            return;
        }
        log::debug!("Tap on {:?} axis, direction {}", axis, direction);
        self.on_gesture(axis.gesture(), services);
    }

    pub fn on_gesture(&mut self, gesture: Gesture, services: &mut dyn Services) {
        if !self.running {
            return;
        }
        self.inactive_seconds = 0;
        match gesture {
            Gesture::Punch => self.spin.boost(self.config.spin_speed_punch_step),
            Gesture::Twist => self.set_mode(self.mode.toggled(), services),
            Gesture::Shake => match self.mode {
                WorldMode::Dynamic => self.spin.ease_to(self.config.spin_rotation_steady),
                WorldMode::Steady => self.spin.reset(self.config.spin_rotation_steady),
            },
        }
    }

    pub fn on_button(&mut self, button: Button, press: Press) {
        if !self.running {
            return;
        }
        self.inactive_seconds = 0;
        let step = self.config.spin_speed_button_step;
        match (self.config_mode, button, press) {
            (false, Button::Up, Press::Short) => self.spin.boost(-step),
            (false, Button::Down, Press::Short) => self.spin.boost(step),
            (false, Button::Select, Press::Short) => {
                self.cycle_transparency();
            }
            (false, Button::Select, Press::Long) => self.enter_config_mode(),
            (true, Button::Up, Press::Short) | (true, Button::Down, Press::Short) => {
                let skin = self.clock.cycle_skin();
                log::info!("Digit skin: {}", skin);
            }
            (true, Button::Select, Press::Long) => self.exit_config_mode(),
            _ => {}
        }
    }

    pub fn set_mode(&mut self, mode: WorldMode, services: &mut dyn Services) {
        let effects = mode_transition(Some(self.mode), mode);
        log::info!("World mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.apply(&effects, services);
    }

    fn apply(&mut self, effects: &[Effect], services: &mut dyn Services) {
        for effect in effects {
            match effect {
                Effect::SubscribeAccel => services.subscribe_accel(),
                Effect::UnsubscribeAccel => services.unsubscribe_accel(),
                Effect::ResetSpin => self.spin.reset(self.config.spin_rotation_steady),
            }
        }
    }

    pub fn cycle_transparency(&mut self) -> TransparencyMode {
        self.transparency = self.transparency.next();
        log::info!("Transparency: {}", self.transparency);
        self.transparency
    }

    fn enter_config_mode(&mut self) {
        let (on_ms, off_ms, on_ink, off_ink) = CONFIG_BLINK;
        let handle = self.config_blinker.start(on_ms, off_ms, on_ink, off_ink);
        self.clock.bind_blinker(|_| true, Some(&handle));
        self.config_mode = true;
        log::info!("Entered configuration mode");
    }

    fn exit_config_mode(&mut self) {
        self.clock.bind_blinker(|_| true, None);
        self.clock
            .bind_blinker(|group| group == SlotGroup::Minutes, Some(&self.minutes_blinker));
        self.config_blinker.stop();
        self.config_mode = false;
        log::info!("Left configuration mode");
    }

    /// Let wall time pass for the blinkers, independently of world updates
    pub fn advance_blinkers(&self, elapsed: Duration) {
        self.config_blinker.advance(elapsed);
        self.minutes_blinker.advance(elapsed);
    }

    /// Paint the current state onto `canvas`
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        render::render(canvas, &self.clock, &self.camera, &self.tables, self.transparency);
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn mode(&self) -> WorldMode {
        self.mode
    }

    pub fn transparency(&self) -> TransparencyMode {
        self.transparency
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn in_config_mode(&self) -> bool {
        self.config_mode
    }

    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn clock(&self) -> &Clock3D {
        &self.clock
    }

    pub fn samplers(&self) -> &AxisSamplers {
        &self.samplers
    }

    pub fn tables(&self) -> &AnimationTables {
        &self.tables
    }

    pub fn inactive_seconds(&self) -> u32 {
        self.inactive_seconds
    }

    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

fn steady_view_point(config: &WorldConfig) -> Vector3<f32> {
    rotate_axis(
        &scale(config.camera_distance, &config.attractor_direction()),
        Axis::Z,
        config.spin_rotation_steady,
    )
}
