use proptest::prelude::*;
use rental_finance_core::apportionment::split::{
    apportion_expense, ApportionmentInput, ApportionmentStrategy,
};
use rental_finance_core::cash_flow::projection::{
    project_cash_flow, CashFlowProjectionInput, HistoricalCashFlow,
};
use rental_finance_core::occupancy::vacancy::{vacancy_metrics, PortfolioInput};
use rental_finance_core::occupancy::yields::portfolio_yield;
use rental_finance_core::tax::liability::{calculate_tax_liability, TaxLiabilityInput};
use rental_finance_core::{
    Contract, ContractStatus, Property, PropertyStatus, ReceiptDeductions, RentalReceipt, Unit,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn cents(c: u64) -> Decimal {
    Decimal::new(c as i64, 2)
}

fn mills(m: u64) -> Decimal {
    Decimal::new(m as i64, 3)
}

fn tax_on(base: Decimal) -> Decimal {
    let input = TaxLiabilityInput {
        receipts: vec![RentalReceipt {
            gross_amount: base,
            receipt_date: "2024-01-15".into(),
            deductions: ReceiptDeductions::default(),
            dependents: None,
        }],
    };
    calculate_tax_liability(&input).unwrap().result.tax_owed
}

fn arb_unit() -> impl Strategy<Value = (bool, u32)> {
    prop_oneof![Just((false, 0u32)), (1u32..6).prop_map(|r| (true, r)), Just((true, 0u32))]
}

fn arb_status() -> impl Strategy<Value = PropertyStatus> {
    prop_oneof![
        Just(PropertyStatus::Available),
        Just(PropertyStatus::Rented),
        Just(PropertyStatus::UnderMaintenance),
    ]
}

proptest! {
    #[test]
    fn tax_is_monotonic(a in 0u64..1_500_000, b in 0u64..1_500_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(tax_on(cents(lo)) <= tax_on(cents(hi)));
    }

    #[test]
    fn tax_never_negative(base in 0u64..2_000_000) {
        prop_assert!(tax_on(cents(base)) >= Decimal::ZERO);
    }

    #[test]
    fn apportionment_is_conserved(
        total in 0u64..100_000_000,
        units in prop::collection::vec(arb_unit(), 1..25),
        by_occupant in any::<bool>(),
    ) {
        let total = mills(total);
        let units: Vec<Unit> = units
            .into_iter()
            .enumerate()
            .map(|(i, (occupied, residents))| Unit {
                id: format!("u{i}"),
                name: format!("Unit {i}"),
                occupied,
                residents,
            })
            .collect();
        let strategy = if by_occupant {
            ApportionmentStrategy::ByOccupant
        } else {
            ApportionmentStrategy::ByUnit
        };
        let out = apportion_expense(&ApportionmentInput { total_expense: total, units, strategy })
            .unwrap()
            .result;

        let billed: Decimal = out.distribution.iter().map(|s| s.share).sum();
        prop_assert_eq!(billed + out.owner_total, total);
        prop_assert!(billed <= total);
        prop_assert!(out.owner_total >= Decimal::ZERO);
        prop_assert!(out.distribution.iter().all(|s| s.share >= Decimal::ZERO));
    }

    #[test]
    fn all_vacant_owner_absorbs_everything(total in 0u64..1_000_000, n in 1usize..10) {
        let units: Vec<Unit> = (0..n)
            .map(|i| Unit { id: i.to_string(), name: i.to_string(), occupied: false, residents: 0 })
            .collect();
        let out = apportion_expense(&ApportionmentInput {
            total_expense: cents(total),
            units,
            strategy: ApportionmentStrategy::ByOccupant,
        })
        .unwrap()
        .result;
        prop_assert!(out.distribution.iter().all(|s| s.share.is_zero()));
        prop_assert_eq!(out.owner_total, cents(total));
    }

    #[test]
    fn vacancy_and_yield_bounds(
        props in prop::collection::vec(
            (arb_status(), prop::option::of(0u64..1_000_000), prop::option::of(0u64..100_000_000)),
            0..30,
        )
    ) {
        let properties: Vec<Property> = props
            .into_iter()
            .enumerate()
            .map(|(i, (status, rent, value))| Property {
                id: i.to_string(),
                name: format!("P{i}"),
                status,
                rent_amount: rent.map(cents),
                market_value: value.map(cents),
                area: Decimal::ZERO,
            })
            .collect();
        let input = PortfolioInput { properties };
        let v = vacancy_metrics(&input).unwrap().result;
        prop_assert!(v.physical_pct >= Decimal::ZERO && v.physical_pct <= dec!(100));
        prop_assert!(v.financial_pct >= Decimal::ZERO && v.financial_pct <= dec!(100));

        let y = portfolio_yield(&input).unwrap().result;
        prop_assert!(y.annual_yield_pct >= Decimal::ZERO);
    }

    #[test]
    fn projection_partition(months in 1usize..24, contract_count in 0usize..6) {
        let history: Vec<HistoricalCashFlow> = (0..months)
            .map(|m| HistoricalCashFlow {
                period: format!("{:04}-{:02}", 2022 + m / 12, m % 12 + 1),
                realized: Decimal::from(1000 + m as i64),
            })
            .collect();
        let contracts: Vec<Contract> = (0..contract_count)
            .map(|i| Contract {
                id: format!("c{i}"),
                property_id: format!("p{i}"),
                tenant_id: format!("t{i}"),
                status: ContractStatus::Active,
                monthly_value: dec!(1000),
                start_date: "2021-01-01".into(),
                end_date: "2030-12-31".into(),
                payment_day: 1,
            })
            .collect();
        let out = project_cash_flow(&CashFlowProjectionInput { history, contracts, as_of: None })
            .unwrap()
            .result;

        prop_assert_eq!(out.points.len(), months + 3);
        for p in &out.points[..months] {
            prop_assert!(!p.is_projection);
            prop_assert!(p.projected.is_zero());
        }
        for p in &out.points[months..] {
            prop_assert!(p.is_projection);
            prop_assert!(p.realized.is_zero());
            prop_assert_eq!(p.projected, Decimal::from(1000 * contract_count as i64));
        }
        prop_assert!(out.points.windows(2).all(|w| w[0].period < w[1].period));
    }
}
