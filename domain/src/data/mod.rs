//! Data domain containers
//!
//! The orchestrator treats these as opaque values: it only asks a
//! [`DataBatch`] for its [`DataDomain`](crate::DataDomain), its length and
//! its default model input mapping. Algorithms match on the concrete
//! container they were registered for.
//!
//! | Domain | Container | Default model input |
//! |--------|-----------|---------------------|
//! | tabular | [`Tabular`] | one dense row per instance |
//! | text | [`Text`] | raw strings |
//! | image | [`Images`] | pixels flattened row-major (h, w, c) |
//! | timeseries | [`Timeseries`] | timesteps flattened row-major (t, v) |

pub mod batch;
pub mod error;
pub mod image;
pub mod tabular;
pub mod text;
pub mod timeseries;

pub use batch::{DataBatch, ModelInput};
pub use error::DataError;
pub use image::{Image, Images};
pub use tabular::Tabular;
pub use text::Text;
pub use timeseries::Timeseries;
