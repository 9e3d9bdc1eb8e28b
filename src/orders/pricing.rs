//! Cost of a single cabinet line.
//!
//! `volume = thickness * width * height / 1_000_000` (all in mm) is the unit
//! the catalog's `price_per_m3` values are calibrated against. It is not a
//! geometric mm³ → m³ conversion and must not be "corrected" without
//! repricing the catalog.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::catalog::{Handle, Hinge, Material};

const VOLUME_DIVISOR: i64 = 1_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("dimensions must not be negative: {width}x{height}x{thickness}")]
    NegativeDimension { width: i32, height: i32, thickness: i32 },
    #[error("cost does not fit into a decimal")]
    Overflow,
}

/// `round(volume * price_per_m3 + handle.price + hinge.price, 2)`, rounding
/// midpoints away from zero.
pub fn compute_cost(
    material: &Material,
    handle: &Handle,
    hinge: &Hinge,
    width_mm: i32,
    height_mm: i32,
    thickness_mm: i32,
) -> Result<Decimal, PricingError> {
    if width_mm < 0 || height_mm < 0 || thickness_mm < 0 {
        return Err(PricingError::NegativeDimension {
            width: width_mm,
            height: height_mm,
            thickness: thickness_mm,
        });
    }
    let raw = i128::from(thickness_mm) * i128::from(width_mm) * i128::from(height_mm);
    let raw = Decimal::from_i128_with_scale(raw, 0);
    let volume = raw / Decimal::from(VOLUME_DIVISOR);
    let material_cost = volume
        .checked_mul(material.price_per_m3)
        .ok_or(PricingError::Overflow)?;
    let hardware_cost = handle
        .price
        .checked_add(hinge.price)
        .ok_or(PricingError::Overflow)?;
    let total = material_cost
        .checked_add(hardware_cost)
        .ok_or(PricingError::Overflow)?;
    Ok(total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
