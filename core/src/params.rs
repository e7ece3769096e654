/// A named runtime tunable with a fixed range
///
/// The audio pipeline that hosts a receiver addresses tunables by `name`;
/// `label` is the human-readable description. Values written through
/// [`Parameter::set`] are clamped into `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: &'static str,
    label: &'static str,
    min: f32,
    max: f32,
    value: f32,
}

impl Parameter {
    pub fn new(name: &'static str, label: &'static str, min: f32, max: f32, value: f32) -> Self {
        let mut param = Self {
            name,
            label,
            min,
            max,
            value: min,
        };
        param.set(value);
        param
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Set the value, clamped into range. NaN leaves the value unchanged.
    /// Returns the value actually stored.
    pub fn set(&mut self, value: f32) -> f32 {
        if !value.is_nan() {
            self.value = value.max(self.min).min(self.max);
        }
        self.value
    }
}

/// Start-tone detection threshold, compared against sample power
pub fn start_threshold(value: f32) -> Parameter {
    Parameter::new("start", "Start Threshold", 0.0, 0.5, value)
}

/// Legacy binary-one threshold
pub fn one_threshold(value: f32) -> Parameter {
    Parameter::new("one", "One Threshold", 0.0, 1.0, value)
}
