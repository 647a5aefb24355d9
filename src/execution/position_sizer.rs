use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::BotError;

/// Size a follower's trade from the target's input amount.
///
/// `input × percentage / 100`, clamped to `max_trade_amount` only when the
/// input asset is native SOL.
pub fn scale_copy_amount(
    target_input_amount: Decimal,
    input_is_native: bool,
    copy_percentage: Decimal,
    max_trade_amount: Decimal,
) -> Decimal {
    let scaled = target_input_amount * copy_percentage / Decimal::ONE_HUNDRED;

    if input_is_native && scaled > max_trade_amount {
        tracing::info!(
            amount = %scaled,
            max = %max_trade_amount,
            "Trade amount exceeds max, capping"
        );
        return max_trade_amount;
    }

    scaled
}

/// `floor(amount × 10^decimals)` as the integer unit the swap router expects.
pub fn to_smallest_unit(amount: Decimal, decimals: u8) -> Result<u64, BotError> {
    let factor = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(|| BotError::Validation(format!("unsupported decimals: {decimals}")))?;

    (amount * Decimal::from(factor))
        .floor()
        .to_u64()
        .ok_or_else(|| BotError::Validation(format!("amount out of range: {amount}")))
}

pub fn validate_percentage(percentage: Decimal) -> Result<Decimal, BotError> {
    if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(BotError::Validation(
            "Percentage must be greater than 0 and at most 100".into(),
        ));
    }
    Ok(percentage)
}

pub fn validate_amount(amount: Decimal) -> Result<Decimal, BotError> {
    if amount <= Decimal::ZERO {
        return Err(BotError::Validation("Amount must be greater than 0".into()));
    }
    Ok(amount)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_amount_never_exceeds_target() {
        let target = Decimal::new(375, 1); // 37.5
        for pct in [1, 10, 33, 50, 99] {
            let scaled = scale_copy_amount(target, false, Decimal::from(pct), Decimal::ONE);
            assert!(scaled < target, "{pct}% should be below the target amount");
        }
        let full = scale_copy_amount(target, false, Decimal::ONE_HUNDRED, Decimal::ONE);
        assert_eq!(full, target);
    }

    #[test]
    fn test_native_input_is_clamped() {
        let scaled = scale_copy_amount(
            Decimal::from(40),
            true,
            Decimal::from(50),
            Decimal::new(25, 1),
        );
        assert_eq!(scaled, Decimal::new(25, 1));
    }

    #[test]
    fn test_native_input_under_max_untouched() {
        let scaled = scale_copy_amount(Decimal::from(2), true, Decimal::from(50), Decimal::from(5));
        assert_eq!(scaled, Decimal::ONE);
    }

    #[test]
    fn test_token_input_ignores_max() {
        let scaled = scale_copy_amount(
            Decimal::from(1_000),
            false,
            Decimal::from(50),
            Decimal::ONE,
        );
        assert_eq!(scaled, Decimal::from(500));
    }

    #[test]
    fn test_to_smallest_unit_floors() {
        assert_eq!(to_smallest_unit(Decimal::new(12_345_678, 7), 6).unwrap(), 1_234_567);
        assert_eq!(to_smallest_unit(Decimal::new(15, 1), 9).unwrap(), 1_500_000_000);
        assert_eq!(to_smallest_unit(Decimal::ZERO, 9).unwrap(), 0);
    }

    #[test]
    fn test_to_smallest_unit_rejects_negative() {
        assert!(to_smallest_unit(Decimal::from(-1), 6).is_err());
    }

    #[test]
    fn test_validate_percentage_bounds() {
        assert!(validate_percentage(Decimal::ZERO).is_err());
        assert!(validate_percentage(Decimal::from(101)).is_err());
        assert!(validate_percentage(Decimal::ONE_HUNDRED).is_ok());
        assert!(validate_percentage(Decimal::new(5, 1)).is_ok());
    }
}
