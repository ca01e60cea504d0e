/// Precomputed easing tables for fixed-step animations
use std::f32::consts::PI;
use std::ops::Index;

/// Shaping law of an interpolation table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Ease-in/ease-out from 0 to 1
    AccelerateDecelerate,
    /// Rises from 0 to a peak of 1 at the midpoint and returns to 0
    TrigonometricYoYo,
}

impl Easing {
    /// Fraction at normalized time `t` in [0, 1]
    pub fn fraction(self, t: f32) -> f32 {
        match self {
            Easing::AccelerateDecelerate => (1.0 - (PI * t).cos()) * 0.5,
            Easing::TrigonometricYoYo => (PI * t).sin(),
        }
    }

    fn start(self) -> f32 {
        0.0
    }

    fn end(self) -> f32 {
        match self {
            Easing::AccelerateDecelerate => 1.0,
            Easing::TrigonometricYoYo => 0.0,
        }
    }
}

/// Fractions for steps `0..=steps` of one easing law, built once.
#[derive(Debug, Clone)]
pub struct InterpolationTable {
    easing: Easing,
    fractions: Box<[f32]>,
}

impl InterpolationTable {
    pub fn new(easing: Easing, steps: usize) -> Self {
        let fractions = (0..=steps)
            .map(|i| {
                if i == steps {
                    easing.end()
                } else if i == 0 {
                    easing.start()
                } else {
                    easing.fraction(i as f32 / steps as f32)
                }
            })
            .collect();

        Self { easing, fractions }
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn steps(&self) -> usize {
        self.fractions.len() - 1
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Fraction at `step`, saturating at the last entry
    pub fn at(&self, step: usize) -> f32 {
        self.fractions[step.min(self.steps())]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.fractions
    }
}

impl Index<usize> for InterpolationTable {
    type Output = f32;

    fn index(&self, step: usize) -> &f32 {
        &self.fractions[step]
    }
}

/// The three tables the world animates with
#[derive(Debug, Clone)]
pub struct AnimationTables {
    pub spin_rotation: InterpolationTable,
    pub flip_rotation: InterpolationTable,
    pub flip_translation: InterpolationTable,
}

impl AnimationTables {
    pub fn new(flip_steps: usize, spin_steps: usize) -> Self {
        Self {
            spin_rotation: InterpolationTable::new(Easing::AccelerateDecelerate, spin_steps),
            flip_rotation: InterpolationTable::new(Easing::AccelerateDecelerate, flip_steps),
            flip_translation: InterpolationTable::new(Easing::TrigonometricYoYo, flip_steps),
        }
    }

    pub fn flip_steps(&self) -> usize {
        self.flip_rotation.steps()
    }

    pub fn spin_steps(&self) -> usize {
        self.spin_rotation.steps()
    }
}
