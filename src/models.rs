// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Card,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentMethod {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(ParseEnumError {
                kind: "payment method",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Stock,
    Asset,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemType::Stock => "Stock",
            ItemType::Asset => "Asset",
        };
        f.write_str(s)
    }
}

impl FromStr for ItemType {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" => Ok(ItemType::Stock),
            "asset" => Ok(ItemType::Asset),
            _ => Err(ParseEnumError {
                kind: "item type",
                value: s.to_string(),
            }),
        }
    }
}

/// Asset lifecycle status. Stock items keep the default `Available`; the
/// field carries no meaning for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    Available,
    Assigned,
    NeedsRepair,
    Discarded,
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetStatus::Available => "Available",
            AssetStatus::Assigned => "Assigned",
            AssetStatus::NeedsRepair => "Needs Repair",
            AssetStatus::Discarded => "Discarded",
        };
        f.write_str(s)
    }
}

impl FromStr for AssetStatus {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(AssetStatus::Available),
            "assigned" => Ok(AssetStatus::Assigned),
            "needs repair" | "needs-repair" => Ok(AssetStatus::NeedsRepair),
            "discarded" => Ok(AssetStatus::Discarded),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Opaque reference to a blob held by external storage. Never opened or
/// validated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
    pub size: u64,
    pub mime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    /// "Occurred on" date, freely editable by the user.
    pub date: NaiveDate,
    /// Set by the store on add/update. Authoritative for ordering and
    /// month bucketing.
    pub timestamp: NaiveDateTime,
    pub item: String,
    pub category: String,
    pub centre: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub created_by: String,
    pub note: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: i64,
    pub item_name: String,
    pub category: String,
    pub centre: String,
    pub quantity: u32,
    /// Baseline for the relative low-stock alert; when absent that alert is
    /// skipped for the item.
    pub original_quantity: Option<u32>,
    pub damaged: u32,
    pub repaired: u32,
    pub item_type: ItemType,
    pub status: AssetStatus,
    pub assigned_to: Option<String>,
    pub last_updated: NaiveDateTime,
    pub last_used: Option<NaiveDateTime>,
}

impl InventoryRecord {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }
}
