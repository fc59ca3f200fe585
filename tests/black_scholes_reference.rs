// Reference call prices from OpenGamma Strata (Apache 2.0), https://github.com/OpenGamma/Strata
// BlackScholesFormulaRepositoryTest.java, strike 100 slice:
//   SPOT = 100, TIME_TO_EXPIRY = 4.5, COST_OF_CARRY b = r - q = 0.05.

use approx::assert_relative_eq;
use structura::core::OptionType;
use structura::instruments::OptionLeg;

const SPOT: f64 = 100.0;
const STRIKE: f64 = 100.0;
const EXPIRY: f64 = 4.5;
const COST_OF_CARRY: f64 = 0.05;

const VOLS: [f64; 7] = [0.1, 0.12, 0.15, 0.2, 0.3, 0.5, 0.8];
const RATES: [f64; 7] = [-0.01, -0.005, 0.0, 0.008, 0.032, 0.062, 0.1];

#[rustfmt::skip]
const CALL_PRICE_K100: [[f64; 7]; 7] = [
    [28.227691366172778, 27.599_660_156_387_03, 26.985_601_864_023_08, 26.031398901929947, 23.366502028061248, 20.415684622407838, 17.206779436958136],
    [29.460572920194522, 28.805111621144633, 28.164_233_525_066_35, 27.168354493347223, 24.387_064_742_833_29, 21.307366505179694, 17.958308164432047],
    [31.614253168446297, 30.910875148391668, 30.223_146_419_068_74, 29.154464831673863, 26.169852192071076, 22.865_016_266_736_47, 19.271_128_987_385_02],
    [35.651_639_079_672_99, 34.858434218120514, 34.082_877_183_389_9, 32.877_716_648_934_47, 29.511_945_771_703_95, 25.785056605612148, 21.732201980396823],
    [44.356_758_683_618_42, 43.369875680794145, 42.404_949_603_817_69, 40.905_523_030_963_74, 36.717_926_319_013_79, 32.081036469111204, 27.038589635496734],
    [61.767_323_908_809_18, 60.393_077_369_959_68, 59.049_406_116_390_98, 56.961_436_446_119_52, 51.130_157_286_355_24, 44.673_231_988_200_47, 37.651563676357824],
    [84.816_610_871_615_35, 82.929_546_214_267_66, 81.084_466_410_882_19, 78.217_343_475_515_83, 70.210_046_023_101_04, 61.343_634_370_732_56, 51.701_738_442_808_58],
];

fn leg(option_type: OptionType, strike: f64, vol: f64, r: f64, q: f64) -> OptionLeg {
    OptionLeg::new(option_type, strike, vol, r, q).expect("valid leg")
}

#[test]
fn hull_reference_call_and_put() {
    let call = leg(OptionType::Call, 100.0, 0.2, 0.05, 0.0);
    let put = leg(OptionType::Put, 100.0, 0.2, 0.05, 0.0);

    assert_relative_eq!(call.price(100.0, 1.0), 10.450_583_572_185_565, epsilon = 1e-9);
    assert_relative_eq!(put.price(100.0, 1.0), 5.573_526_022_256_971, epsilon = 1e-9);
}

#[test]
fn strata_call_grid_strike_100() {
    for (j, &vol) in VOLS.iter().enumerate() {
        for (k, &rate) in RATES.iter().enumerate() {
            let q = rate - COST_OF_CARRY;
            let expected = CALL_PRICE_K100[j][k];
            let price = leg(OptionType::Call, STRIKE, vol, rate, q).price(SPOT, EXPIRY);
            assert!(
                (price - expected).abs() < 1e-8,
                "vol={vol} r={rate} expected={expected} got={price}"
            );
        }
    }
}

#[test]
fn put_call_parity_holds_across_grid() {
    for &k in &[60.0, 95.0, 100.0, 130.0] {
        for &vol in &[0.0, 0.05, 0.25, 0.9] {
            for &(r, q) in &[(0.05, 0.0), (0.02, 0.04), (-0.01, 0.0)] {
                for &tau in &[0.0, 1.0 / 365.0, 0.5, 3.0] {
                    for &s in &[20.0, 80.0, 100.0, 125.0, 400.0] {
                        let c = leg(OptionType::Call, k, vol, r, q).price(s, tau);
                        let p = leg(OptionType::Put, k, vol, r, q).price(s, tau);
                        let rhs = s * (-q * tau).exp() - k * (-r * tau).exp();
                        let tol = 1e-8 * rhs.abs().max(1.0);
                        assert!(
                            (c - p - rhs).abs() <= tol,
                            "K={k} vol={vol} r={r} q={q} tau={tau} S={s}: {} vs {rhs}",
                            c - p
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn prices_are_non_negative() {
    for option_type in [OptionType::Call, OptionType::Put] {
        for &vol in &[0.0, 0.01, 0.3, 2.0] {
            for &tau in &[0.0, 1e-6, 0.25, 10.0] {
                for &s in &[1e-3, 1.0, 50.0, 100.0, 1e4] {
                    let px = leg(option_type, 100.0, vol, 0.05, 0.02).price(s, tau);
                    assert!(px >= 0.0, "{option_type} vol={vol} tau={tau} S={s} px={px}");
                }
            }
        }
    }
}

#[test]
fn monotone_in_spot() {
    let call = leg(OptionType::Call, 100.0, 0.25, 0.03, 0.01);
    let put = leg(OptionType::Put, 100.0, 0.25, 0.03, 0.01);
    let spots: Vec<f64> = (1..=300).map(|i| i as f64).collect();

    for w in spots.windows(2) {
        assert!(call.price(w[1], 0.75) >= call.price(w[0], 0.75));
        assert!(put.price(w[1], 0.75) <= put.price(w[0], 0.75));
    }
}

#[test]
fn converges_to_intrinsic_as_tau_vanishes() {
    for option_type in [OptionType::Call, OptionType::Put] {
        let option = leg(option_type, 100.0, 0.3, 0.05, 0.02);
        for &s in &[80.0, 99.0, 100.0, 101.0, 120.0] {
            let intrinsic = option.intrinsic(s);
            assert_eq!(option.price(s, 0.0), intrinsic);

            let mut prev_gap = f64::INFINITY;
            for &tau in &[1e-2, 1e-4, 1e-6, 1e-8, 1e-10] {
                let gap = (option.price(s, tau) - intrinsic).abs();
                assert!(gap <= prev_gap + 1e-12, "{option_type} S={s} tau={tau}");
                prev_gap = gap;
            }
            assert!(prev_gap < 1e-3, "{option_type} S={s} gap={prev_gap}");
        }
    }
}

#[test]
fn zero_volatility_routes_through_forward_limit() {
    let s = 100.0;
    let r = 0.04;
    let q = 0.0;
    let tau = 2.0;
    // Forward = 100 e^{0.08} ~ 108.33: 105 call is in the money, 110 call is not.
    let itm = leg(OptionType::Call, 105.0, 0.0, r, q);
    let otm = leg(OptionType::Call, 110.0, 0.0, r, q);
    let put = leg(OptionType::Put, 110.0, 0.0, r, q);

    let df = (-r * tau).exp();
    let fwd = s * ((r - q) * tau).exp();
    assert_relative_eq!(itm.price(s, tau), df * (fwd - 105.0), epsilon = 1e-12);
    assert_eq!(otm.price(s, tau), 0.0);
    assert_relative_eq!(put.price(s, tau), df * (110.0 - fwd), epsilon = 1e-12);

    // Tiny vol prices match the limit closely.
    let near = leg(OptionType::Call, 105.0, 1e-6, r, q);
    assert_relative_eq!(near.price(s, tau), itm.price(s, tau), epsilon = 1e-8);
}
