use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

use networth_projection::{
    amortization::AmortizationCalculator,
    projection::calculate_liabilities_value,
    Asset, AssetType, Liability, LiabilityType, Portfolio, ProjectionEngine, Scenario,
    ScenarioRateTable, ScenarioReturns, ScenarioRunner, Settings, TypeRegistry,
};

fn settings(horizon_years: u32) -> Settings {
    Settings {
        horizon_years,
        inflation: 4.0,
        show_real_values: true,
    }
}

fn flat_rates(asset_type: AssetType, rate: f64) -> ScenarioRateTable {
    ScenarioRateTable::new().with_rate(asset_type, ScenarioReturns::flat(rate))
}

fn mixed_portfolio(stocks: f64, bonds: f64, realty: f64, mortgage: f64) -> Portfolio {
    Portfolio::new(
        vec![
            Asset::new("stocks", AssetType::Stocks, "Stocks", stocks),
            Asset::new("bonds", AssetType::Bonds, "Bonds", bonds),
            Asset::new("flat", AssetType::Realty, "Flat", realty),
        ],
        vec![Liability::new("home", LiabilityType::Mortgage, mortgage, 8.5, 20)],
    )
    .unwrap()
}

#[test]
fn test_mortgage_reference_loan() {
    let loan = Liability::new("home", LiabilityType::Mortgage, 1_000_000.0, 8.5, 20);
    assert_abs_diff_eq!(loan.monthly_payment(), 8_678.3, epsilon = 0.5);

    let year_5 = AmortizationCalculator::calculate_remaining_balance(&loan, 5.0);
    let year_10 = AmortizationCalculator::calculate_remaining_balance(&loan, 10.0);
    assert!(year_10 > 0.0 && year_10 < 1_000_000.0);
    assert!(year_10 < year_5);
}

#[test]
fn test_single_stock_asset_one_year() {
    let engine = ProjectionEngine::default();
    let portfolio = Portfolio::new(vec![Asset::new("s", AssetType::Stocks, "Stocks", 100_000.0)], vec![]).unwrap();
    let rates = ScenarioRateTable::new().with_rate(AssetType::Stocks, ScenarioReturns::new(4.0, 12.0, 18.0));

    let projections = engine.calculate_projections(&portfolio, &rates, &settings(1));
    assert_relative_eq!(projections.base[1].nominal, 112_000.0, max_relative = 1e-12);
}

#[test]
fn test_empty_portfolio_growth_rate_is_zero() {
    let runner = ScenarioRunner::new();
    let portfolio = Portfolio::default();

    for horizon in [0, 1, 25] {
        let outcome = runner.run(&portfolio, &settings(horizon));
        assert_eq!(outcome.metrics.growth_rate, Some(0.0));
        assert_eq!(outcome.metrics.volatility, 0.0);
    }
}

#[test]
fn test_structurally_identical_inputs_share_result() {
    let engine = ProjectionEngine::default();

    let first = engine.calculate_projections(
        &mixed_portfolio(100_000.0, 50_000.0, 300_000.0, 200_000.0),
        &engine.rate_table(4.0),
        &settings(10),
    );
    let second = engine.calculate_projections(
        &mixed_portfolio(100_000.0, 50_000.0, 300_000.0, 200_000.0),
        &engine.rate_table(4.0),
        &settings(10),
    );

    assert!(Arc::ptr_eq(&first, &second));
    let stats = engine.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(ProjectionEngine::new(TypeRegistry::default_registry()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                engine.calculate_projections(
                    &mixed_portfolio(10_000.0, 20_000.0, 30_000.0, 5_000.0),
                    &engine.rate_table(3.0),
                    &settings(5),
                )
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(engine.cache_stats().misses, 1);
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_year_zero_matches_current_totals(
        stocks in 0u32..2_000_000,
        bonds in 0u32..2_000_000,
        realty in 0u32..5_000_000,
        mortgage in 1u32..3_000_000,
        horizon in 0u32..30,
        inflation_bp in 0u32..1_500
    ) {
        let engine = ProjectionEngine::default();
        let portfolio = mixed_portfolio(stocks as f64, bonds as f64, realty as f64, mortgage as f64);
        let settings = Settings {
            horizon_years: horizon,
            inflation: inflation_bp as f64 / 100.0,
            show_real_values: true,
        };
        let projections = engine.calculate_projections(&portfolio, &engine.rate_table(settings.inflation), &settings);

        for scenario in Scenario::ALL {
            let points = projections.get(scenario);
            prop_assert_eq!(points.len(), horizon as usize + 1);
            let first = &points[0];
            prop_assert!((first.nominal - portfolio.total_value()).abs() < 1e-6);
            prop_assert_eq!(first.real, first.net_worth);
            prop_assert_eq!(first.liabilities, mortgage as f64);
        }
    }

    #[test]
    fn prop_single_type_compounds_exactly(
        value in 1u32..10_000_000,
        rate_bp in -1_000i32..2_500,
        horizon in 0u32..40
    ) {
        let engine = ProjectionEngine::default();
        let portfolio = Portfolio::new(vec![Asset::new("b", AssetType::Bonds, "Bonds", value as f64)], vec![]).unwrap();
        let rate = rate_bp as f64 / 100.0;
        let projections = engine.calculate_projections(&portfolio, &flat_rates(AssetType::Bonds, rate), &settings(horizon));

        for point in &projections.base {
            let expected = value as f64 * (1.0 + rate / 100.0).powi(point.year as i32);
            prop_assert!((point.nominal - expected).abs() <= expected.abs() * 1e-12 + 1e-9);
        }
    }

    #[test]
    fn prop_liabilities_identical_across_scenarios(
        principal in 1u32..2_000_000,
        rate_bp in 1u32..2_000,
        term in 1u32..31,
        horizon in 0u32..40
    ) {
        let engine = ProjectionEngine::default();
        let portfolio = Portfolio::new(
            vec![Asset::new("s", AssetType::Stocks, "Stocks", 500_000.0)],
            vec![Liability::new("loan", LiabilityType::Business, principal as f64, rate_bp as f64 / 100.0, term)],
        )
        .unwrap();
        let projections = engine.calculate_projections(&portfolio, &engine.rate_table(4.0), &settings(horizon));

        for year in 0..=horizon as usize {
            let expected = calculate_liabilities_value(portfolio.liabilities(), year as f64);
            prop_assert_eq!(projections.pessimistic[year].liabilities, expected);
            prop_assert_eq!(projections.base[year].liabilities, expected);
            prop_assert_eq!(projections.optimistic[year].liabilities, expected);
        }
    }

    #[test]
    fn prop_balance_endpoints(
        principal in 1u32..5_000_000,
        rate_bp in 0u32..3_000,
        term in 1u32..41
    ) {
        let loan = Liability::new("loan", LiabilityType::Consumer, principal as f64, rate_bp as f64 / 100.0, term);
        prop_assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, 0.0), principal as f64);
        prop_assert_eq!(AmortizationCalculator::calculate_remaining_balance(&loan, term as f64), 0.0);
    }

    #[test]
    fn prop_balance_never_increases(
        principal in 1_000u32..5_000_000,
        rate_bp in 1u32..3_000,
        term in 1u32..41
    ) {
        let loan = Liability::new("loan", LiabilityType::Auto, principal as f64, rate_bp as f64 / 100.0, term);
        let mut previous = principal as f64;
        for year in 1..=term {
            let balance = AmortizationCalculator::calculate_remaining_balance(&loan, year as f64);
            prop_assert!(balance <= previous);
            previous = balance;
        }
    }

    #[test]
    fn prop_base_value_non_decreasing_for_non_negative_returns(
        stocks in 0u32..1_000_000,
        cash in 0u32..1_000_000,
        stock_rate_bp in 0u32..2_000,
        cash_rate_bp in 0u32..500,
        horizon in 1u32..40
    ) {
        let engine = ProjectionEngine::default();
        let portfolio = Portfolio::new(
            vec![
                Asset::new("s", AssetType::Stocks, "Stocks", stocks as f64),
                Asset::new("c", AssetType::Cash, "Cash", cash as f64),
            ],
            vec![],
        )
        .unwrap();
        let rates = ScenarioRateTable::new()
            .with_rate(AssetType::Stocks, ScenarioReturns::flat(stock_rate_bp as f64 / 100.0))
            .with_rate(AssetType::Cash, ScenarioReturns::flat(cash_rate_bp as f64 / 100.0));
        let projections = engine.calculate_projections(&portfolio, &rates, &settings(horizon));

        prop_assert!(projections.base.windows(2).all(|w| w[1].nominal >= w[0].nominal));
    }
}
