use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::Period;
use crate::types::Money;

// ---------------------------------------------------------------------------
// Portfolio records
// ---------------------------------------------------------------------------

/// Occupancy status of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    Rented,
    UnderMaintenance,
}

/// A property in the portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub status: PropertyStatus,
    /// Monthly asking or contracted rent, if set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_amount: Option<Money>,
    /// Current market value, if appraised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_value: Option<Money>,
    /// Floor area in square metres
    #[serde(default)]
    pub area: Decimal,
}

impl Property {
    pub fn rent_or_zero(&self) -> Money {
        self.rent_amount.unwrap_or(Decimal::ZERO)
    }

    pub fn market_value_or_zero(&self) -> Money {
        self.market_value.unwrap_or(Decimal::ZERO)
    }
}

/// Lifecycle status of a lease contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Draft,
    Ended,
    PendingSignature,
    Signed,
}

/// A lease contract between the portfolio and a tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub id: String,
    pub property_id: String,
    pub tenant_id: String,
    pub status: ContractStatus,
    pub monthly_value: Money,
    /// ISO date (YYYY-MM-DD)
    pub start_date: String,
    /// ISO date (YYYY-MM-DD); blank for an open-ended lease
    #[serde(default)]
    pub end_date: String,
    /// Day of month the rent falls due (1-31)
    pub payment_day: u32,
}

impl Contract {
    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }
}

// ---------------------------------------------------------------------------
// Calculation inputs
// ---------------------------------------------------------------------------

/// Owner-paid costs deductible from a rental receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReceiptDeductions {
    /// Property tax (IPTU) paid by the owner
    #[serde(default)]
    pub property_tax: Money,
    /// Condominium fee paid by the owner
    #[serde(default)]
    pub condo_fee: Money,
    /// Property management / agency fee
    #[serde(default)]
    pub management_fee: Money,
}

impl ReceiptDeductions {
    /// Sum of all deductions, `None` on overflow.
    pub fn total(&self) -> Option<Money> {
        self.property_tax
            .checked_add(self.condo_fee)?
            .checked_add(self.management_fee)
    }
}

/// A single rent receipt used as tax input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalReceipt {
    pub gross_amount: Money,
    /// ISO date (YYYY-MM-DD) the rent was received
    pub receipt_date: String,
    #[serde(default)]
    pub deductions: ReceiptDeductions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependents: Option<u32>,
}

/// A unit sharing a common expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    pub occupied: bool,
    /// Number of residents; 0 when vacant
    #[serde(default)]
    pub residents: u32,
}

// ---------------------------------------------------------------------------
// Projection output
// ---------------------------------------------------------------------------

/// One month of realized or projected cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub period: Period,
    pub realized: Money,
    pub projected: Money,
    pub is_projection: bool,
}
