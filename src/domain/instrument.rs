//! Instrument metadata supplied by the account provider.

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentSpec {
    /// Minimum price increment.
    pub point: f64,
    pub digits: u32,
    /// Monetary value of one point for one lot.
    pub tick_value: f64,
    pub min_volume: f64,
    pub volume_step: f64,
    pub max_volume: f64,
}

impl Default for InstrumentSpec {
    fn default() -> Self {
        InstrumentSpec {
            point: 0.00001,
            digits: 5,
            tick_value: 1.0,
            min_volume: 0.01,
            volume_step: 0.01,
            max_volume: 100.0,
        }
    }
}

impl InstrumentSpec {
    /// Round a price to the instrument's quoted precision.
    pub fn normalize_price(&self, price: f64) -> f64 {
        let factor = 10f64.powi(self.digits as i32);
        (price * factor).round() / factor
    }

    pub fn points_to_price(&self, points: f64) -> f64 {
        points * self.point
    }

    /// Price distance expressed in points. Zero point size yields 0.
    pub fn price_to_points(&self, distance: f64) -> f64 {
        if self.point <= 0.0 {
            return 0.0;
        }
        distance / self.point
    }
}
