/// Terminal host for the 3D flip clock
use chrono::{Datelike, Local, Timelike};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use flipclock_core::{Button, ClockTime, Press, Services, TapAxis, TickOutcome, World};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod settings;

pub use renderer::AsciiCanvas;
pub use settings::{FileSettingsStore, StoreError};

/// Most world updates run in one frame after a stall
const MAX_CATCH_UP: u32 = 4;
/// Tilt change per key press, in milli-g
const TILT_STEP: i32 = 100;

/// Subscription state the world asks the terminal for
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TerminalServices {
    update_timer: Option<Duration>,
    ticks: bool,
    taps: bool,
    accel: bool,
    dirty: bool,
}

impl TerminalServices {
    pub fn update_timer(&self) -> Option<Duration> {
        self.update_timer
    }

    pub fn wants_ticks(&self) -> bool {
        self.ticks
    }

    pub fn wants_taps(&self) -> bool {
        self.taps
    }

    pub fn wants_accel(&self) -> bool {
        self.accel
    }

    /// Return and clear the redraw request
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Services for TerminalServices {
    fn start_update_timer(&mut self, interval: Duration) {
        self.update_timer = Some(interval);
    }

    fn cancel_update_timer(&mut self) {
        self.update_timer = None;
    }

    fn subscribe_ticks(&mut self) {
        self.ticks = true;
    }

    fn unsubscribe_ticks(&mut self) {
        self.ticks = false;
    }

    fn subscribe_taps(&mut self) {
        self.taps = true;
    }

    fn unsubscribe_taps(&mut self) {
        self.taps = false;
    }

    fn subscribe_accel(&mut self) {
        self.accel = true;
    }

    fn unsubscribe_accel(&mut self) {
        self.accel = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

/// Keyboard-driven stand-in for a device accelerometer
#[derive(Debug, Clone)]
pub struct SimulatedAccelerometer {
    rest: [i32; 3],
    tilt: [i32; 3],
    available: bool,
}

impl SimulatedAccelerometer {
    pub fn new(rest: [i32; 3]) -> Self {
        Self {
            rest,
            tilt: rest,
            available: true,
        }
    }

    pub fn nudge(&mut self, dx: i32, dy: i32) {
        self.tilt[0] = (self.tilt[0] + dx).clamp(-1000, 1000);
        self.tilt[1] = (self.tilt[1] + dy).clamp(-1000, 1000);
    }

    pub fn level(&mut self) {
        self.tilt = self.rest;
    }

    pub fn toggle_available(&mut self) -> bool {
        self.available = !self.available;
        self.available
    }

    /// Current reading, or `None` while the sensor is switched off
    pub fn sample(&self) -> Option<[i32; 3]> {
        self.available.then_some(self.tilt)
    }
}

/// What a key press means to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Button(Button, Press),
    Tap(TapAxis),
    Tilt(i32, i32),
    Level,
    ToggleSensor,
}

pub fn map_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::Button(Button::Up, Press::Short),
        KeyCode::Down | KeyCode::Char('j') => Action::Button(Button::Down, Press::Short),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Button(Button::Select, Press::Short),
        KeyCode::Tab | KeyCode::Char('c') => Action::Button(Button::Select, Press::Long),
        KeyCode::Char('p') => Action::Tap(TapAxis::X),
        KeyCode::Char('t') => Action::Tap(TapAxis::Y),
        KeyCode::Char('z') => Action::Tap(TapAxis::Z),
        KeyCode::Char('a') | KeyCode::Left => Action::Tilt(-TILT_STEP, 0),
        KeyCode::Char('d') | KeyCode::Right => Action::Tilt(TILT_STEP, 0),
        KeyCode::Char('w') => Action::Tilt(0, -TILT_STEP),
        KeyCode::Char('s') => Action::Tilt(0, TILT_STEP),
        KeyCode::Char('r') => Action::Level,
        KeyCode::Char('n') => Action::ToggleSensor,
        _ => return None,
    };
    Some(action)
}

pub fn clock_time_now() -> ClockTime {
    let now = Local::now();
    ClockTime::new(
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    )
}

/// Main application struct for the terminal flip clock
pub struct TerminalApp {
    world: World,
    store: FileSettingsStore,
    services: TerminalServices,
    canvas: AsciiCanvas,
    accelerometer: SimulatedAccelerometer,
    frame_interval: Duration,
    running: bool,
    last_pump: Instant,
    last_update: Instant,
    last_tick: Option<ClockTime>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(world: World, store: FileSettingsStore, frame_interval: Duration) -> anyhow::Result<Self> {
        let (width, height) = terminal::size()?;
        let accelerometer = SimulatedAccelerometer::new(world.config().steady_attractor);
        let now = Instant::now();

        Ok(Self {
            world,
            store,
            services: TerminalServices::default(),
            canvas: AsciiCanvas::new(width as usize, (height as usize).saturating_sub(1)),
            accelerometer,
            frame_interval,
            running: true,
            last_pump: now,
            last_update: now,
            last_tick: None,
            last_frame: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    /// Run until quit or inactivity timeout, then persist settings
    pub fn run(mut self) -> anyhow::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        self.world.start(&mut self.services);
        let result = self.main_loop();
        self.world.stop(&mut self.services);

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        let Self { world, mut store, .. } = self;
        world.finalize(&mut store);
        store.save()?;

        result
    }

    fn main_loop(&mut self) -> anyhow::Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::ZERO)? {
                self.handle_input()?;
            }

            // Update
            self.pump_world(frame_start);

            // Render
            if self.services.take_dirty() {
                self.render()?;
                self.frame_count += 1;
            }

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_interval {
                std::thread::sleep(self.frame_interval - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> anyhow::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => {
                if let Some(action) = map_key(code) {
                    self.apply(action);
                }
            }
            Event::Resize(..) => self.services.mark_dirty(),
            _ => {}
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Button(button, press) => self.world.on_button(button, press),
            Action::Tap(axis) => {
                if self.services.wants_taps() {
                    self.world.on_tap(axis, 1, &mut self.services);
                }
            }
            Action::Tilt(dx, dy) => self.accelerometer.nudge(dx, dy),
            Action::Level => self.accelerometer.level(),
            Action::ToggleSensor => {
                let available = self.accelerometer.toggle_available();
                log::info!("Simulated accelerometer {}", if available { "on" } else { "off" });
            }
        }
    }

    /// Deliver whatever timers, ticks and samples are due
    fn pump_world(&mut self, now: Instant) {
        self.world.advance_blinkers(now - self.last_pump);
        self.last_pump = now;

        if self.services.wants_accel() {
            match self.accelerometer.sample() {
                Some([x, y, z]) => self.world.on_acceleration_sample(x, y, z),
                None => self.world.on_sensor_unavailable(),
            }
        }

        if let Some(interval) = self.services.update_timer() {
            let mut due = 0;
            while now - self.last_update >= interval && due < MAX_CATCH_UP {
                self.world.update(&mut self.services);
                self.last_update += interval;
                due += 1;
            }
            if due == MAX_CATCH_UP {
                self.last_update = now;
            }
        }

        if self.services.wants_ticks() {
            let time = clock_time_now();
            if self.last_tick != Some(time) {
                self.last_tick = Some(time);
                if self.world.on_tick(time) == TickOutcome::Exit {
                    self.running = false;
                }
            }
        }
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let (width, height) = terminal::size()?;
        self.canvas
            .resize(width as usize, (height as usize).saturating_sub(1));

        // Clear canvas
        self.canvas.clear();

        // Render world
        self.world.render(&mut self.canvas);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 1))?;

        self.canvas.draw(&mut stdout)?;

        // Draw UI overlay
        let mode = if self.world.in_config_mode() {
            "config".to_string()
        } else {
            format!("{:?}", self.world.mode()).to_lowercase()
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Flipclock | {} | {} | {} | FPS: {:.1} | Up/Down Spin Enter=Look Tab=Config P/T/Z=Tap WASD=Tilt Q=Quit",
                mode,
                self.world.transparency(),
                self.world.clock().skin(),
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipclock_core::{WorldConfig, WorldMode};

    #[test]
    fn test_services_track_subscriptions() {
        let world_store = FileSettingsStore::empty("unused.conf");
        let mut world = World::initialize(WorldConfig::default(), &world_store).unwrap();
        let mut services = TerminalServices::default();

        world.start(&mut services);
        assert_eq!(services.update_timer(), Some(Duration::from_millis(35)));
        assert!(services.wants_ticks() && services.wants_taps() && services.wants_accel());
        assert!(services.take_dirty());
        assert!(!services.take_dirty());

        world.stop(&mut services);
        assert_eq!(services, TerminalServices::default());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(
            map_key(KeyCode::Up),
            Some(Action::Button(Button::Up, Press::Short))
        );
        assert_eq!(
            map_key(KeyCode::Tab),
            Some(Action::Button(Button::Select, Press::Long))
        );
        assert_eq!(map_key(KeyCode::Char('t')), Some(Action::Tap(TapAxis::Y)));
        assert_eq!(map_key(KeyCode::Char('?')), None);
    }

    #[test]
    fn test_simulated_accelerometer() {
        let mut accel = SimulatedAccelerometer::new([-81, -816, -571]);
        assert_eq!(accel.sample(), Some([-81, -816, -571]));

        accel.nudge(TILT_STEP, 0);
        assert_eq!(accel.sample(), Some([19, -816, -571]));
        for _ in 0..20 {
            accel.nudge(0, -TILT_STEP);
        }
        assert_eq!(accel.sample().map(|s| s[1]), Some(-1000));

        assert!(!accel.toggle_available());
        assert_eq!(accel.sample(), None);
        accel.toggle_available();
        accel.level();
        assert_eq!(accel.sample(), Some([-81, -816, -571]));
    }

    #[test]
    fn test_world_drives_ascii_canvas() {
        let store = FileSettingsStore::empty("unused.conf");
        let mut world = World::initialize(WorldConfig::default(), &store).unwrap();
        let mut services = TerminalServices::default();
        world.start(&mut services);
        world.on_tick(ClockTime::new(3, 12, 45, 30));
        for _ in 0..60 {
            world.update(&mut services);
        }

        let mut canvas = AsciiCanvas::new(60, 30);
        world.render(&mut canvas);
        let inked = (0..30)
            .flat_map(|y| (0..60).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.intensity_at(x, y).unwrap_or(0.0) > 0.0)
            .count();
        assert!(inked > 50);
        assert_eq!(world.mode(), WorldMode::Dynamic);
    }
}
