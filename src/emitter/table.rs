//! Measured emitter characteristic with interpolated lookup.
//!
//! An emitter's forward voltage is only known at the currents it was
//! measured at. Between two measured currents the voltage is linearly
//! interpolated:
//!   V = V_lo + (I - I_lo) * (V_hi - V_lo) / (I_hi - I_lo)
//!
//! Outside the measured range it is extrapolated along the slope of the
//! nearest boundary interval:
//!   V = V_first - dV/dI_initial * (I_first - I)
//!   V = V_last  + dV/dI_final   * (I - I_last)

use crate::error::{LedCalcError, Result};

/// One measured point of an emitter characteristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitterSample {
    /// Forward voltage across the emitter (V)
    pub forward_voltage: f64,
    /// Current through the emitter (A)
    pub current_draw: f64,
    /// Luminous output (lm)
    pub luminous_output: f64,
}

impl EmitterSample {
    /// Create a sample from a (forward voltage, current, output) triple.
    pub const fn new(forward_voltage: f64, current_draw: f64, luminous_output: f64) -> Self {
        Self {
            forward_voltage,
            current_draw,
            luminous_output,
        }
    }
}

/// A value read from the table, and whether it lies outside the measured range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    pub was_extrapolated: bool,
}

impl Estimate {
    fn interpolated(value: f64) -> Self {
        Self {
            value,
            was_extrapolated: false,
        }
    }

    fn extrapolated(value: f64) -> Self {
        Self {
            value,
            was_extrapolated: true,
        }
    }
}

/// Slopes of the boundary intervals, used only for extrapolation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundaryGradients {
    initial: f64,
    final_: f64,
}

impl BoundaryGradients {
    fn of(samples: &[EmitterSample], field: fn(&EmitterSample) -> f64) -> Self {
        let n = samples.len();
        Self {
            initial: slope(&samples[0], &samples[1], field),
            final_: slope(&samples[n - 2], &samples[n - 1], field),
        }
    }
}

/// Slope of `field` against current between two samples.
/// A zero-width interval has no defined slope and is treated as flat.
fn slope(lower: &EmitterSample, upper: &EmitterSample, field: fn(&EmitterSample) -> f64) -> f64 {
    let d_current = upper.current_draw - lower.current_draw;
    if d_current == 0.0 {
        0.0
    } else {
        (field(upper) - field(lower)) / d_current
    }
}

/// Measured characteristic of one emitter type, sorted by current.
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterDataTable {
    samples: Vec<EmitterSample>,
    voltage_gradients: BoundaryGradients,
    output_gradients: BoundaryGradients,
}

impl EmitterDataTable {
    /// Build a table from measured samples.
    ///
    /// Samples are stably sorted by current, so samples sharing a current
    /// keep the order they were given in.
    ///
    /// # Errors
    ///
    /// Returns [`LedCalcError::InvalidTable`] if fewer than two samples are
    /// given, and [`LedCalcError::InvalidSample`] if any sample has a
    /// non-finite value or a negative current.
    pub fn new(samples: impl Into<Vec<EmitterSample>>) -> Result<Self> {
        let mut samples = samples.into();

        if samples.len() < 2 {
            return Err(LedCalcError::InvalidTable {
                samples: samples.len(),
            });
        }

        for (index, sample) in samples.iter().enumerate() {
            if !(sample.forward_voltage.is_finite()
                && sample.current_draw.is_finite()
                && sample.luminous_output.is_finite())
            {
                return Err(LedCalcError::invalid_sample(index, "values must be finite"));
            }
            if sample.current_draw < 0.0 {
                return Err(LedCalcError::invalid_sample(
                    index,
                    format!("current draw {} A is negative", sample.current_draw),
                ));
            }
        }

        // All values are finite here, so total_cmp agrees with numeric order
        samples.sort_by(|a, b| a.current_draw.total_cmp(&b.current_draw));

        let voltage_gradients = BoundaryGradients::of(&samples, |s| s.forward_voltage);
        let output_gradients = BoundaryGradients::of(&samples, |s| s.luminous_output);

        Ok(Self {
            samples,
            voltage_gradients,
            output_gradients,
        })
    }

    /// Samples in ascending order of current.
    pub fn samples(&self) -> &[EmitterSample] {
        &self.samples
    }

    /// dV/dI between the two lowest-current samples.
    pub fn initial_gradient(&self) -> f64 {
        self.voltage_gradients.initial
    }

    /// dV/dI between the two highest-current samples.
    pub fn final_gradient(&self) -> f64 {
        self.voltage_gradients.final_
    }

    /// Lowest and highest measured current.
    pub fn current_range(&self) -> (f64, f64) {
        let first = self.samples[0].current_draw;
        let last = self.samples[self.samples.len() - 1].current_draw;
        (first, last)
    }

    /// Forward voltage (V) the emitter exhibits when drawing `current` (A).
    ///
    /// Currents strictly inside the last measured interval are labelled
    /// interpolated, where the browser calculator labelled them extrapolated.
    /// The voltage is the same either way.
    pub fn forward_voltage_at(&self, current: f64) -> Estimate {
        self.estimate(current, |s| s.forward_voltage, self.voltage_gradients)
    }

    /// Luminous output (lm) the emitter produces when drawing `current` (A).
    pub fn luminous_output_at(&self, current: f64) -> Estimate {
        self.estimate(current, |s| s.luminous_output, self.output_gradients)
    }

    fn estimate(
        &self,
        current: f64,
        field: fn(&EmitterSample) -> f64,
        gradients: BoundaryGradients,
    ) -> Estimate {
        let last_index = self.samples.len() - 1;
        // Leftmost sample with current_draw >= current
        let index = self.samples.partition_point(|s| s.current_draw < current);

        if index > last_index
            || (index == last_index && current >= self.samples[last_index].current_draw)
        {
            let last = &self.samples[last_index];
            return Estimate::extrapolated(
                field(last) + gradients.final_ * (current - last.current_draw),
            );
        }

        if index == 0 {
            let first = &self.samples[0];
            return Estimate::extrapolated(
                field(first) - gradients.initial * (first.current_draw - current),
            );
        }

        let lower = &self.samples[index - 1];
        let upper = &self.samples[index];
        let d_current = upper.current_draw - lower.current_draw;

        if d_current == 0.0 {
            return Estimate::interpolated((field(upper) + field(lower)) / 2.0);
        }

        let gradient = (field(upper) - field(lower)) / d_current;
        Estimate::interpolated(field(lower) + (current - lower.current_draw) * gradient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn two_point_table() -> EmitterDataTable {
        EmitterDataTable::new(vec![
            EmitterSample::new(3.00, 1.00, 400.0),
            EmitterSample::new(3.30, 4.00, 1000.0),
        ])
        .unwrap()
    }

    fn four_point_table() -> EmitterDataTable {
        EmitterDataTable::new(vec![
            EmitterSample::new(2.80, 0.50, 200.0),
            EmitterSample::new(3.00, 1.00, 400.0),
            EmitterSample::new(3.20, 2.00, 700.0),
            EmitterSample::new(3.30, 3.00, 900.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_short_table() {
        assert_eq!(
            EmitterDataTable::new(Vec::<EmitterSample>::new()),
            Err(LedCalcError::InvalidTable { samples: 0 })
        );
        assert_eq!(
            EmitterDataTable::new(vec![EmitterSample::new(3.0, 1.0, 100.0)]),
            Err(LedCalcError::InvalidTable { samples: 1 })
        );
    }

    #[test]
    fn test_rejects_bad_samples() {
        let result = EmitterDataTable::new(vec![
            EmitterSample::new(3.0, 1.0, 100.0),
            EmitterSample::new(f64::NAN, 2.0, 100.0),
        ]);
        assert!(matches!(result, Err(LedCalcError::InvalidSample { index: 1, .. })));

        let result = EmitterDataTable::new(vec![
            EmitterSample::new(3.0, -1.0, 100.0),
            EmitterSample::new(3.2, 2.0, 100.0),
        ]);
        assert!(matches!(result, Err(LedCalcError::InvalidSample { index: 0, .. })));
    }

    #[test]
    fn test_sorts_by_current() {
        let table = EmitterDataTable::new(vec![
            EmitterSample::new(3.30, 4.00, 1000.0),
            EmitterSample::new(3.10, 2.00, 700.0),
            EmitterSample::new(3.00, 1.00, 400.0),
        ])
        .unwrap();

        let currents: Vec<f64> = table.samples().iter().map(|s| s.current_draw).collect();
        assert_eq!(currents, vec![1.00, 2.00, 4.00]);
        assert_relative_eq!(table.initial_gradient(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(table.final_gradient(), 0.10, epsilon = 1e-12);
        assert_eq!(table.current_range(), (1.00, 4.00));
    }

    #[test]
    fn test_sort_is_stable_for_equal_currents() {
        let table = EmitterDataTable::new(vec![
            EmitterSample::new(3.05, 2.00, 1.0),
            EmitterSample::new(3.00, 1.00, 0.0),
            EmitterSample::new(3.15, 2.00, 2.0),
        ])
        .unwrap();

        let outputs: Vec<f64> = table.samples().iter().map(|s| s.luminous_output).collect();
        assert_eq!(outputs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_interpolates_midpoint() {
        let estimate = two_point_table().forward_voltage_at(2.5);
        assert_relative_eq!(estimate.value, 3.15, epsilon = 1e-12);
        assert!(!estimate.was_extrapolated);
    }

    #[test]
    fn test_extrapolates_below_range() {
        let estimate = two_point_table().forward_voltage_at(0.5);
        assert_relative_eq!(estimate.value, 2.95, epsilon = 1e-12);
        assert!(estimate.was_extrapolated);
    }

    #[test]
    fn test_extrapolates_above_range() {
        let estimate = two_point_table().forward_voltage_at(5.0);
        assert_relative_eq!(estimate.value, 3.40, epsilon = 1e-12);
        assert!(estimate.was_extrapolated);
    }

    #[test]
    fn test_last_interval_is_interpolated() {
        let table = four_point_table();
        let estimate = table.forward_voltage_at(2.5);
        assert_relative_eq!(estimate.value, 3.25, epsilon = 1e-12);
        assert!(!estimate.was_extrapolated);

        let estimate = table.forward_voltage_at(3.0);
        assert_relative_eq!(estimate.value, 3.30, epsilon = 1e-12);
        assert!(estimate.was_extrapolated);
    }

    #[test]
    fn test_interior_points_lie_on_segment() {
        let table = four_point_table();
        for pair in table.samples().windows(2) {
            let (lower, upper) = (pair[0], pair[1]);
            for fraction in [0.1, 0.25, 0.5, 0.9] {
                let current = lower.current_draw + fraction * (upper.current_draw - lower.current_draw);
                let estimate = table.forward_voltage_at(current);
                let expected = lower.forward_voltage
                    + fraction * (upper.forward_voltage - lower.forward_voltage);
                assert_relative_eq!(estimate.value, expected, epsilon = 1e-12);
                assert!(!estimate.was_extrapolated, "extrapolated at {current} A");
            }
        }
    }

    #[test]
    fn test_outside_range_is_extrapolated() {
        let table = four_point_table();
        for current in [0.0, 0.1, 0.49, 3.01, 10.0] {
            assert!(table.forward_voltage_at(current).was_extrapolated, "{current} A");
        }
    }

    #[test]
    fn test_continuous_at_samples() {
        let table = four_point_table();
        for sample in table.samples() {
            let estimate = table.forward_voltage_at(sample.current_draw);
            assert_relative_eq!(estimate.value, sample.forward_voltage, epsilon = 1e-12);
        }
        // Boundary samples themselves go through the extrapolation formulas
        assert!(table.forward_voltage_at(0.50).was_extrapolated);
        assert!(table.forward_voltage_at(3.00).was_extrapolated);
        assert!(!table.forward_voltage_at(1.00).was_extrapolated);
    }

    #[test]
    fn test_duplicate_currents_bracket_from_leftmost() {
        let table = EmitterDataTable::new(vec![
            EmitterSample::new(2.90, 0.50, 0.0),
            EmitterSample::new(3.00, 1.00, 0.0),
            EmitterSample::new(3.10, 1.00, 0.0),
            EmitterSample::new(3.30, 2.00, 0.0),
        ])
        .unwrap();

        // Leftmost match on 1.00 A is the 3.00 V sample, bracketed from below
        let estimate = table.forward_voltage_at(1.00);
        assert_relative_eq!(estimate.value, 3.00, epsilon = 1e-12);

        let estimate = table.forward_voltage_at(1.50);
        assert_relative_eq!(estimate.value, 3.20, epsilon = 1e-12);
        assert!(!estimate.was_extrapolated);
    }

    #[test]
    fn test_duplicate_boundary_currents_extrapolate_flat() {
        let table = EmitterDataTable::new(vec![
            EmitterSample::new(3.00, 1.00, 0.0),
            EmitterSample::new(3.20, 2.00, 0.0),
            EmitterSample::new(3.30, 2.00, 0.0),
        ])
        .unwrap();

        assert_eq!(table.final_gradient(), 0.0);
        let estimate = table.forward_voltage_at(3.0);
        assert_relative_eq!(estimate.value, 3.30, epsilon = 1e-12);
        assert!(estimate.was_extrapolated);
    }

    #[test]
    fn test_luminous_output_lookup() {
        let table = two_point_table();
        let estimate = table.luminous_output_at(2.5);
        assert_relative_eq!(estimate.value, 700.0, epsilon = 1e-9);
        assert!(!estimate.was_extrapolated);

        let estimate = table.luminous_output_at(0.0);
        assert_relative_eq!(estimate.value, 200.0, epsilon = 1e-9);
        assert!(estimate.was_extrapolated);
    }
}
