//! Reference predictive models

mod linear;

pub use linear::{LinearModel, LinearModelError, Link};
