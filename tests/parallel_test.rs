#[cfg(feature = "parallel")]
use structura::factory::{ProductFactory, ProductTerms};
#[cfg(feature = "parallel")]
use structura::greeks::BumpConfig;
#[cfg(feature = "parallel")]
use structura::risk::{Measure, greeks_grid, surface};

#[cfg(feature = "parallel")]
#[test]
fn parallel_surface_matches_pointwise_evaluation() {
    let product = ProductFactory::iron_condor(80.0, 90.0, 110.0, 120.0, &ProductTerms::default())
        .expect("valid product");
    let spots: Vec<f64> = (50..=150).map(f64::from).collect();
    let taus: Vec<f64> = (0..=12).map(|m| f64::from(m) / 12.0).collect();
    let bumps = BumpConfig::default();

    for measure in Measure::ALL {
        let grid = surface(&product, measure, &spots, &taus, &bumps).expect("valid grid");
        assert_eq!(grid.len(), taus.len());
        for (row, &tau) in grid.iter().zip(&taus) {
            for (&value, &spot) in row.iter().zip(&spots) {
                assert_eq!(value, measure.eval(&product, spot, tau, &bumps));
            }
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_greeks_grid_preserves_order() {
    let product = ProductFactory::straddle(100.0, &ProductTerms::default()).expect("valid");
    let spots = [90.0, 100.0, 110.0];
    let taus = [0.05, 0.125];
    let points = greeks_grid(&product, &spots, &taus, &BumpConfig::default()).expect("valid");

    let expected: Vec<(f64, f64)> = taus
        .iter()
        .flat_map(|&t| spots.iter().map(move |&s| (s, t)))
        .collect();
    let got: Vec<(f64, f64)> = points.iter().map(|p| (p.spot, p.tau)).collect();
    assert_eq!(got, expected);
}
