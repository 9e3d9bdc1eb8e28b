use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use crate::db::decode_decimal;
use crate::error::StoreError;

/// `Handle::size` value for the "no handle" option.
pub const HANDLE_SIZE_NONE: i64 = -1;
/// `Handle::size` value for a customer-specified handle size.
pub const HANDLE_SIZE_CUSTOM: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub price_per_m3: Decimal,
    pub category: String,
    pub is_water_resistant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handle {
    pub id: i64,
    pub name: String,
    pub size: i64, // mm, or one of the HANDLE_SIZE_* sentinels
    pub price: Decimal,
}

impl Handle {
    pub fn is_none(&self) -> bool {
        self.size == HANDLE_SIZE_NONE
    }

    pub fn is_custom(&self) -> bool {
        self.size == HANDLE_SIZE_CUSTOM
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hinge {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub price: Decimal,
}

#[derive(Debug, FromRow)]
pub(crate) struct MaterialRow {
    pub id: i64,
    pub name: String,
    pub price_per_m3: String,
    pub category: String,
    pub is_water_resistant: bool,
}

#[derive(Debug, FromRow)]
pub(crate) struct HandleRow {
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub price: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct HingeRow {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
    pub price: String,
}

impl TryFrom<MaterialRow> for Material {
    type Error = StoreError;

    fn try_from(r: MaterialRow) -> Result<Self, Self::Error> {
        Ok(Self {
            price_per_m3: decode_decimal("material", r.id, &r.price_per_m3)?,
            id: r.id,
            name: r.name,
            category: r.category,
            is_water_resistant: r.is_water_resistant,
        })
    }
}

impl TryFrom<HandleRow> for Handle {
    type Error = StoreError;

    fn try_from(r: HandleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            price: decode_decimal("handle", r.id, &r.price)?,
            id: r.id,
            name: r.name,
            size: r.size,
        })
    }
}

impl TryFrom<HingeRow> for Hinge {
    type Error = StoreError;

    fn try_from(r: HingeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            price: decode_decimal("hinge", r.id, &r.price)?,
            id: r.id,
            name: r.name,
            kind: r.kind,
        })
    }
}
