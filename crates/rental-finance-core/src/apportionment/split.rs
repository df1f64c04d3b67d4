use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

use crate::entities::Unit;
use crate::error::RentalFinanceError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money};
use crate::RentalFinanceResult;

const NOTE_VACANT_OWNER_PAYS: &str = "Unidade vaga: cota absorvida pelo proprietário";
const NOTE_NO_CONSUMPTION: &str = "Sem consumo: unidade vaga ou sem moradores";
const NOTE_ALL_VACANT: &str = "Nenhum morador no condomínio: despesa absorvida pelo proprietário";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Allocation rule for a shared expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApportionmentStrategy {
    /// Equal share per unit, vacant units included
    ByUnit,
    /// Proportional to residents of occupied units
    ByOccupant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApportionmentInput {
    pub total_expense: Money,
    pub units: Vec<Unit>,
    pub strategy: ApportionmentStrategy,
}

/// One unit's billed share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitShare {
    pub unit_id: String,
    pub unit_name: String,
    /// Amount billed to the unit, in cents
    pub share: Money,
    /// Why the unit was billed nothing, when that is the case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApportionmentOutput {
    pub strategy: ApportionmentStrategy,
    pub distribution: Vec<UnitShare>,
    /// Cost absorbed by the owner (vacant units, or everything when no one lives there)
    pub owner_total: Money,
    /// Unrounded cost per unit under `ByUnit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_per_unit: Option<Money>,
    /// Unrounded cost per resident under `ByOccupant`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_occupant: Option<Money>,
    pub total_occupants: u64,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split a shared expense across units.
///
/// Billed shares are whole cents. Cents are distributed with the largest
/// remainder method, and the owner picks up whatever is not billed, so
/// `sum(shares) + owner_total == total_expense` holds exactly.
pub fn apportion_expense(
    input: &ApportionmentInput,
) -> RentalFinanceResult<ComputationOutput<ApportionmentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input, &mut warnings)?;

    let total_occupants: u64 = input
        .units
        .iter()
        .filter(|u| u.occupied)
        .map(|u| u64::from(u.residents))
        .sum();

    let output = match input.strategy {
        ApportionmentStrategy::ByUnit => split_by_unit(input, total_occupants),
        ApportionmentStrategy::ByOccupant => split_by_occupant(input, total_occupants),
    };

    tracing::debug!(
        strategy = ?input.strategy,
        units = input.units.len(),
        total = %input.total_expense,
        owner_total = %output.owner_total,
        "expense apportioned"
    );

    let methodology = match input.strategy {
        ApportionmentStrategy::ByUnit => "Expense Apportionment (equal share per unit)",
        ApportionmentStrategy::ByOccupant => "Expense Apportionment (proportional to residents)",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(
    input: &ApportionmentInput,
    warnings: &mut Vec<String>,
) -> RentalFinanceResult<()> {
    if input.units.is_empty() {
        return Err(RentalFinanceError::invalid(
            "units",
            "At least one unit is required to apportion an expense",
        ));
    }
    if input.total_expense < Decimal::ZERO {
        return Err(RentalFinanceError::invalid(
            "total_expense",
            "Total expense must not be negative",
        ));
    }

    let mut seen = HashSet::new();
    for (i, unit) in input.units.iter().enumerate() {
        if !seen.insert(unit.id.as_str()) {
            return Err(RentalFinanceError::invalid(
                format!("units[{i}].id"),
                format!("Duplicate unit id '{}'", unit.id),
            ));
        }
        if !unit.occupied && unit.residents > 0 {
            warnings.push(format!(
                "Unit '{}' is vacant but reports {} residents; residents ignored",
                unit.id, unit.residents
            ));
        }
    }

    if input.total_expense.scale() > 2 && input.total_expense != round_money(input.total_expense) {
        warnings.push(format!(
            "Total expense {} has sub-cent precision; the remainder is absorbed by the owner",
            input.total_expense
        ));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn split_by_unit(input: &ApportionmentInput, total_occupants: u64) -> ApportionmentOutput {
    let count = Decimal::from(input.units.len());
    let rate_per_unit = input.total_expense / count;

    let weights: Vec<u32> = vec![1; input.units.len()];
    let cents = allocate_cents(input.total_expense, &weights);

    let mut billed = Decimal::ZERO;
    let distribution = input
        .units
        .iter()
        .zip(cents)
        .map(|(unit, allocated)| {
            if unit.occupied {
                billed += allocated;
                UnitShare {
                    unit_id: unit.id.clone(),
                    unit_name: unit.name.clone(),
                    share: allocated,
                    note: None,
                }
            } else {
                UnitShare {
                    unit_id: unit.id.clone(),
                    unit_name: unit.name.clone(),
                    share: Decimal::ZERO,
                    note: Some(NOTE_VACANT_OWNER_PAYS.to_string()),
                }
            }
        })
        .collect();

    ApportionmentOutput {
        strategy: ApportionmentStrategy::ByUnit,
        distribution,
        owner_total: input.total_expense - billed,
        rate_per_unit: Some(rate_per_unit),
        cost_per_occupant: None,
        total_occupants,
    }
}

fn split_by_occupant(input: &ApportionmentInput, total_occupants: u64) -> ApportionmentOutput {
    if total_occupants == 0 {
        let distribution = input
            .units
            .iter()
            .map(|unit| UnitShare {
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                share: Decimal::ZERO,
                note: Some(NOTE_ALL_VACANT.to_string()),
            })
            .collect();
        return ApportionmentOutput {
            strategy: ApportionmentStrategy::ByOccupant,
            distribution,
            owner_total: input.total_expense,
            rate_per_unit: None,
            cost_per_occupant: None,
            total_occupants,
        };
    }

    let cost_per_occupant = input.total_expense / Decimal::from(total_occupants);
    let weights: Vec<u32> = input
        .units
        .iter()
        .map(|u| if u.occupied { u.residents } else { 0 })
        .collect();
    let cents = allocate_cents(input.total_expense, &weights);

    let mut billed = Decimal::ZERO;
    let distribution = input
        .units
        .iter()
        .zip(weights.iter().zip(cents))
        .map(|(unit, (&weight, allocated))| {
            billed += allocated;
            UnitShare {
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                share: allocated,
                note: (weight == 0).then(|| NOTE_NO_CONSUMPTION.to_string()),
            }
        })
        .collect();

    ApportionmentOutput {
        strategy: ApportionmentStrategy::ByOccupant,
        distribution,
        owner_total: input.total_expense - billed,
        rate_per_unit: None,
        cost_per_occupant: Some(cost_per_occupant),
        total_occupants,
    }
}

/// Split `total` (truncated to cents) across `weights` in whole cents.
///
/// Each slot first receives the floor of its exact share; leftover cents go
/// one at a time to the slots with the largest truncated remainder, earlier
/// slots winning ties. Zero-weight slots always receive zero.
fn allocate_cents(total: Money, weights: &[u32]) -> Vec<Money> {
    let weight_sum: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if weight_sum == 0 {
        return vec![Decimal::ZERO; weights.len()];
    }

    let cent = dec!(0.01);
    let total_cents = total.round_dp_with_strategy(2, RoundingStrategy::ToZero) * dec!(100);
    let weight_sum = Decimal::from(weight_sum);

    let mut floors = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for &w in weights {
        let exact = total_cents * Decimal::from(w) / weight_sum;
        let floor = exact.floor();
        floors.push(floor);
        remainders.push(exact - floor);
    }

    let allocated: Decimal = floors.iter().copied().sum();
    let mut leftover = total_cents - allocated;

    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0).collect();
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]).then(a.cmp(&b)));

    for i in order.into_iter().cycle() {
        if leftover <= Decimal::ZERO {
            break;
        }
        floors[i] += Decimal::ONE;
        leftover -= Decimal::ONE;
    }

    floors.into_iter().map(|c| c * cent).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
