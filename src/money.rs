//! Fixed-point currency amounts and their storage as integer cents.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::Error;

/// The number of decimal places kept for currency amounts.
pub const CURRENCY_DECIMAL_PLACES: u32 = 2;

/// The largest amount accepted for a single record, 99,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Round `amount` to whole cents and reject negative values and values above [MAX_AMOUNT].
///
/// `field` names the offending field in the error message.
///
/// # Errors
///
/// Returns [Error::Validation] if the amount is negative or too large.
pub fn validate_amount(amount: Decimal, field: &str) -> Result<Decimal, Error> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::Validation(format!("{field} cannot be negative")));
    }

    let amount = amount.round_dp_with_strategy(
        CURRENCY_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    );

    if amount > MAX_AMOUNT {
        return Err(Error::Validation(format!(
            "{field} cannot be more than {MAX_AMOUNT}"
        )));
    }

    Ok(amount)
}

/// Convert an amount into the integer number of cents used for storage.
///
/// # Errors
///
/// Returns [Error::Validation] if the amount does not fit into 64 bits.
pub fn to_cents(amount: Decimal) -> Result<i64, Error> {
    let mut scaled =
        amount.round_dp_with_strategy(CURRENCY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(CURRENCY_DECIMAL_PLACES);

    i64::try_from(scaled.mantissa())
        .map_err(|_| Error::Validation(format!("the amount {amount} is too large")))
}

/// Convert a stored number of cents back into a currency amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, CURRENCY_DECIMAL_PLACES)
}
