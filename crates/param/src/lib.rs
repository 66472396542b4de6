//! # hydrosched-param
//!
//! The parameter expression algebra: a small object-safe [`Param`] trait
//! plus its combinators, dispatched through `Arc<dyn Param>` the way
//! `gat_algo::opf` dispatches `Arc<dyn OpfBackend>`.

pub mod conversions;
pub mod cost;
pub mod flip_sign;
pub mod leaf;
pub mod products;
pub mod prognosis;
pub mod series;
pub mod stateful;
pub mod traits;

pub use conversions::{CostPerMWToGWh, M3SToMM3, M3SToMM3Series, MWToGWh, MWToGWhSeries};
pub use cost::{
    ExogenCost, ExogenIncome, FossilMC, InConversionLoss, OutConversionLoss, TransmissionLossRHS,
};
pub use flip_sign::FlipSign;
pub use leaf::{Constant, MinusOne, PlusOne, Zero};
pub use products::{HourProduct, TwoProduct};
pub use prognosis::{Prognosis, UMMSeries};
pub use series::{profile_value, MeanSeries, MeanSeriesIgnorePhasein};
pub use stateful::Stateful;
pub use traits::Param;
