// src/noyau/lecture.rs
//
// Passage rationnel exact <-> décimal :
// - lecture d'un littéral décimal ("12.50", "-3") en BigRational
// - conversion f64 -> BigRational (valeurs des variables)
// - arrondi à `digits` décimales (demi loin de zéro) puis texte / f64

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

/* ------------------------ Décimal (texte -> rationnel) ------------------------ */

pub(crate) fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// "123.45" -> 12345/100 ; accepte un signe en tête.
/// Refuse tout ce qui n'est pas chiffres+ ('.' chiffres+)?.
pub fn parse_decimal(s: &str) -> Option<BigRational> {
    let (neg, corps) = match s.strip_prefix('-') {
        Some(reste) => (true, reste),
        None => (false, s),
    };

    let (entier, frac) = match corps.split_once('.') {
        Some((a, b)) => (a, b),
        None => (corps, ""),
    };
    if entier.is_empty() || !entier.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if corps.contains('.') && (frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let chiffres = format!("{entier}{frac}");
    let n: BigInt = chiffres.parse().ok()?;
    let r = BigRational::new(n, pow10(frac.len()));
    Some(if neg { -r } else { r })
}

/// Valeur hôte (f64) -> rationnel exact de sa forme décimale la plus courte.
/// None si NaN / infini.
pub fn depuis_f64(v: f64) -> Option<BigRational> {
    if !v.is_finite() {
        return None;
    }
    // Display de f64 : jamais d'exposant, aller-retour garanti
    parse_decimal(&v.to_string())
}

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

/// Convertit un entier “scalé” (×10^digits) en texte décimal.
pub fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;

    let signe = if neg { "-" } else { "" };

    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}

/// r -> entier “scalé” = round(r * 10^digits), demi loin de zéro.
pub fn arrondi_scaled(r: &BigRational, digits: usize) -> BigInt {
    let x = r * BigRational::from_integer(pow10(digits));
    // BigRational::round arrondit déjà les demis loin de zéro
    x.round().to_integer()
}

/// Entier scalé -> f64 (via le texte décimal : pas de perte au-delà du f64 lui-même).
pub fn scaled_to_f64(scaled: &BigInt, digits: usize) -> Option<f64> {
    let v: f64 = scaled_to_decimal(scaled.clone(), digits).parse().ok()?;
    v.is_finite().then_some(v)
}
