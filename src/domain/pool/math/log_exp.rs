//! Natural exponent and logarithm over 18 decimal fixed point numbers, used
//! for non-integer powers in weighted pool math. Intermediate values are kept
//! in arbitrary precision integers with the same truncating division as the
//! Balancer V2 `LogExpMath` library.

use {
    super::Error,
    crate::{domain::eth::U256, util::conv},
    num::{BigInt, Zero},
    std::sync::LazyLock,
};

static ONE_18: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10).pow(18));
static ONE_20: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10).pow(20));
static ONE_36: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(10).pow(36));

static MAX_NATURAL_EXPONENT: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(130) * &*ONE_18);
static MIN_NATURAL_EXPONENT: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(-41) * &*ONE_18);

static LN_36_LOWER_BOUND: LazyLock<BigInt> =
    LazyLock::new(|| &*ONE_18 - BigInt::from(10).pow(17));
static LN_36_UPPER_BOUND: LazyLock<BigInt> =
    LazyLock::new(|| &*ONE_18 + BigInt::from(10).pow(17));

static MILD_EXPONENT_BOUND: LazyLock<BigInt> =
    LazyLock::new(|| BigInt::from(2).pow(254) / &*ONE_20);

// Exponents and their powers of `e`. The first two pairs have 18 decimals in
// the exponent and no decimals in the power, the rest have 20 decimals in both.
static X0: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(128) * &*ONE_18);
static A0: LazyLock<BigInt> = LazyLock::new(|| {
    BigInt::from(38_877_084_059_945_950_922_200_u128) * BigInt::from(10).pow(33)
});
static X1: LazyLock<BigInt> = LazyLock::new(|| BigInt::from(64) * &*ONE_18);
static A1: LazyLock<BigInt> =
    LazyLock::new(|| BigInt::from(6_235_149_080_811_616_882_910_000_000_u128));

static TERMS: LazyLock<[(BigInt, BigInt); 10]> = LazyLock::new(|| {
    [
        (3_200_000_000_000_000_000_000_u128, 7_896_296_018_268_069_516_100_000_000_000_000_u128),
        (1_600_000_000_000_000_000_000, 888_611_052_050_787_263_676_000_000),
        (800_000_000_000_000_000_000, 298_095_798_704_172_827_474_000),
        (400_000_000_000_000_000_000, 5_459_815_003_314_423_907_810),
        (200_000_000_000_000_000_000, 738_905_609_893_065_022_723),
        (100_000_000_000_000_000_000, 271_828_182_845_904_523_536),
        (50_000_000_000_000_000_000, 164_872_127_070_012_814_685),
        (25_000_000_000_000_000_000, 128_402_541_668_774_148_407),
        (12_500_000_000_000_000_000, 113_314_845_306_682_631_683),
        (6_250_000_000_000_000_000, 106_449_445_891_785_942_956),
    ]
    .map(|(x, a)| (BigInt::from(x), BigInt::from(a)))
});

/// Computes `x^y` for 18 decimal fixed point arguments.
pub fn pow(x: U256, y: U256) -> Result<U256, Error> {
    if y.is_zero() {
        return Ok(U256::from(10).pow(U256::from(18)));
    }
    if x.is_zero() {
        return Ok(U256::ZERO);
    }
    if x.bit(255) {
        return Err(Error::XOutOfBounds);
    }
    let x = conv::u256_to_bigint(&x);
    let y = conv::u256_to_bigint(&y);
    if y >= *MILD_EXPONENT_BOUND {
        return Err(Error::YOutOfBounds);
    }

    let logx_times_y = if *LN_36_LOWER_BOUND < x && x < *LN_36_UPPER_BOUND {
        let ln_36_x = ln_36(&x);
        // Splits the product to keep the extra precision without overflowing.
        (&ln_36_x / &*ONE_18) * &y + ((&ln_36_x % &*ONE_18) * &y) / &*ONE_18
    } else {
        ln(&x) * &y
    };
    let logx_times_y = logx_times_y / &*ONE_18;

    if logx_times_y < *MIN_NATURAL_EXPONENT || logx_times_y > *MAX_NATURAL_EXPONENT {
        return Err(Error::ProductOutOfBounds);
    }
    conv::bigint_to_u256(&exp(&logx_times_y)?).ok_or(Error::ProductOutOfBounds)
}

/// Natural exponent of an 18 decimal signed fixed point number.
pub fn exp(x: &BigInt) -> Result<BigInt, Error> {
    if *x < *MIN_NATURAL_EXPONENT || *x > *MAX_NATURAL_EXPONENT {
        return Err(Error::InvalidExponent);
    }
    if *x < BigInt::zero() {
        return Ok((&*ONE_18 * &*ONE_18) / exp(&-x)?);
    }

    let mut x = x.clone();
    let first_an = if x >= *X0 {
        x -= &*X0;
        A0.clone()
    } else if x >= *X1 {
        x -= &*X1;
        A1.clone()
    } else {
        BigInt::from(1)
    };

    x *= 100_u32;
    let mut product = ONE_20.clone();
    // The smallest term is only needed by `ln`.
    for (xn, an) in TERMS.iter().take(8) {
        if x >= *xn {
            x -= xn;
            product = product * an / &*ONE_20;
        }
    }

    let mut series_sum = ONE_20.clone();
    let mut term = x.clone();
    series_sum += &term;
    for n in 2..=12_u32 {
        term = term * &x / &*ONE_20 / n;
        series_sum += &term;
    }

    Ok(product * series_sum / &*ONE_20 * first_an / 100_u32)
}

/// Natural logarithm of an 18 decimal fixed point number.
pub fn ln(a: &BigInt) -> BigInt {
    if *a < *ONE_18 {
        return -ln(&((&*ONE_18 * &*ONE_18) / a));
    }

    let mut a = a.clone();
    let mut sum = BigInt::zero();
    if a >= &*A0 * &*ONE_18 {
        a /= &*A0;
        sum += &*X0;
    }
    if a >= &*A1 * &*ONE_18 {
        a /= &*A1;
        sum += &*X1;
    }

    sum *= 100_u32;
    a *= 100_u32;
    for (xn, an) in TERMS.iter() {
        if a >= *an {
            a = a * &*ONE_20 / an;
            sum += xn;
        }
    }

    let z = ((&a - &*ONE_20) * &*ONE_20) / (&a + &*ONE_20);
    let z_squared = &z * &z / &*ONE_20;
    let mut num = z.clone();
    let mut series_sum = z;
    for n in [3_u32, 5, 7, 9, 11] {
        num = num * &z_squared / &*ONE_20;
        series_sum += num.clone() / n;
    }
    series_sum *= 2;

    (sum + series_sum) / 100_u32
}

/// High precision natural logarithm for arguments close to one. The result
/// has 36 decimals.
fn ln_36(x: &BigInt) -> BigInt {
    let x = x * &*ONE_18;
    let z = ((&x - &*ONE_36) * &*ONE_36) / (&x + &*ONE_36);
    let z_squared = &z * &z / &*ONE_36;
    let mut num = z.clone();
    let mut series_sum = z;
    for n in [3_u32, 5, 7, 9, 11, 13, 15] {
        num = num * &z_squared / &*ONE_36;
        series_sum += num.clone() / n;
    }
    series_sum * 2
}
