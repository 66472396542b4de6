//! [`Arrow`] — a directional connector from a flow to a balance, carrying
//! a coefficient expression. When the balance on the other end is
//! exogenous, that coefficient is pre-composed from the conversion and
//! loss via [`hydrosched_param::InConversionLoss`]/[`hydrosched_param::OutConversionLoss`]
//! (spec §4.4: "divided/multiplied by `1-loss` when the opposite side is
//! exogenous") rather than re-deriving the loss algebra at update time.

use std::sync::Arc;

use hydrosched_core::Id;
use hydrosched_param::{InConversionLoss, OutConversionLoss, Param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// +1 ingoing, -1 outgoing (spec §4.4: "sign +1 ... sign -1").
    pub fn sign(self) -> f64 {
        match self {
            Direction::In => 1.0,
            Direction::Out => -1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Arrow {
    pub balance: Id,
    pub direction: Direction,
    pub coeff: Arc<dyn Param>,
    /// Whether `balance` owns an equality row to write this arrow's
    /// coefficient into. Arrows into an exogenous balance instead feed
    /// an `ExogenCost`/`ExogenIncome` term onto the flow's [`crate::cost::SumCost`]
    /// (spec §4.4 "Balance (exogenous) has no equation").
    pub balance_is_endogenous: bool,
}

impl Arrow {
    /// A plain arrow into an endogenous balance: its balance-row
    /// coefficient is the conversion alone (no loss coupling).
    pub fn new(balance: Id, direction: Direction, conversion: Arc<dyn Param>) -> Self {
        Self {
            balance,
            direction,
            coeff: conversion,
            balance_is_endogenous: true,
        }
    }

    /// An arrow whose opposite balance is exogenous: the coefficient is
    /// `conv*(1-loss)` for an ingoing arrow, `conv/(1-loss)` for an
    /// outgoing one. Carries no balance-row write of its own.
    pub fn with_exogenous_loss(
        balance: Id,
        direction: Direction,
        conversion: Arc<dyn Param>,
        loss: Arc<dyn Param>,
    ) -> Self {
        let coeff: Arc<dyn Param> = match direction {
            Direction::In => Arc::new(InConversionLoss { conversion, loss }),
            Direction::Out => Arc::new(OutConversionLoss { conversion, loss }),
        };
        Self {
            balance,
            direction,
            coeff,
            balance_is_endogenous: false,
        }
    }
}
