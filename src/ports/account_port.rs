//! Account and instrument metadata port.

use crate::domain::instrument::InstrumentSpec;

pub trait AccountPort {
    fn equity(&self) -> f64;
    fn instrument(&self) -> InstrumentSpec;
}
