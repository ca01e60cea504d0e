/// Shared periodic on/off intensity toggles
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Paint intensity in percent (0 = background, 100 = full ink)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ink(u8);

impl Ink {
    pub const NONE: Ink = Ink(0);
    pub const HALF: Ink = Ink(50);
    pub const FULL: Ink = Ink(100);

    pub const fn new(percent: u8) -> Self {
        if percent > 100 {
            Ink(100)
        } else {
            Ink(percent)
        }
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl Default for Ink {
    fn default() -> Self {
        Ink::FULL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPhase {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cadence {
    on_ms: u32,
    off_ms: u32,
    on_ink: Ink,
    off_ink: Ink,
}

/// Handle shared by every consumer of one blinker
pub type BlinkerHandle = Rc<Blinker>;

/// Alternates between two intensities at its own cadence.
///
/// Consumers hold a [`BlinkerHandle`] and read [`Blinker::intensity`]; a
/// stopped blinker reports `None` so they fall back to their default ink.
#[derive(Debug, Default)]
pub struct Blinker {
    cadence: Cell<Option<Cadence>>,
    phase: Cell<Option<BlinkPhase>>,
    elapsed_ms: Cell<u32>,
}

impl Blinker {
    pub fn new() -> BlinkerHandle {
        Rc::new(Self::default())
    }

    /// Start (or restart) blinking in the On phase and hand out a consumer handle
    pub fn start(
        self: &Rc<Self>,
        on_ms: u32,
        off_ms: u32,
        on_ink: Ink,
        off_ink: Ink,
    ) -> BlinkerHandle {
        self.cadence.set(Some(Cadence {
            on_ms: on_ms.max(1),
            off_ms: off_ms.max(1),
            on_ink,
            off_ink,
        }));
        self.phase.set(Some(BlinkPhase::On));
        self.elapsed_ms.set(0);
        Rc::clone(self)
    }

    pub fn stop(&self) {
        self.cadence.set(None);
        self.phase.set(None);
        self.elapsed_ms.set(0);
    }

    pub fn is_running(&self) -> bool {
        self.cadence.get().is_some()
    }

    pub fn phase(&self) -> Option<BlinkPhase> {
        self.phase.get()
    }

    /// Let `elapsed` of wall time pass, toggling as many times as it covers
    pub fn advance(&self, elapsed: Duration) {
        let Some(cadence) = self.cadence.get() else {
            return;
        };
        let Some(mut phase) = self.phase.get() else {
            return;
        };

        let period = cadence.on_ms as u64 + cadence.off_ms as u64;
        let mut remaining = self.elapsed_ms.get() as u64 + (elapsed.as_millis() as u64 % period);
        loop {
            let length = match phase {
                BlinkPhase::On => cadence.on_ms,
                BlinkPhase::Off => cadence.off_ms,
            } as u64;
            if remaining < length {
                break;
            }
            remaining -= length;
            phase = match phase {
                BlinkPhase::On => BlinkPhase::Off,
                BlinkPhase::Off => BlinkPhase::On,
            };
        }

        self.phase.set(Some(phase));
        self.elapsed_ms.set(remaining as u32);
    }

    /// Current ink, or `None` when stopped
    pub fn intensity(&self) -> Option<Ink> {
        let cadence = self.cadence.get()?;
        match self.phase.get()? {
            BlinkPhase::On => Some(cadence.on_ink),
            BlinkPhase::Off => Some(cadence.off_ink),
        }
    }
}
