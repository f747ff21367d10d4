use crate::plan::MAX_INSTALLMENTS;
use crate::ScheduleError;
use optimus_types::TokenAmount;

/// Split `principal` into `n` installment amounts.
///
/// `base = principal / n`, `remainder = principal % n`; installment 1 is
/// `base + remainder`, the rest are `base`. The sum is checked before returning.
pub fn split_principal(principal: TokenAmount, n: u32) -> Result<Vec<TokenAmount>, ScheduleError> {
    if n == 0 {
        return Err(ScheduleError::NoInstallments);
    }
    if n > MAX_INSTALLMENTS {
        return Err(ScheduleError::TooManyInstallments {
            requested: n,
            max: MAX_INSTALLMENTS,
        });
    }
    let count = n as u64;
    let base = principal.raw() / count;
    let remainder = principal.raw() % count;

    let mut amounts = vec![TokenAmount::new(base); n as usize];
    amounts[0] = TokenAmount::new(base + remainder);

    let actual: TokenAmount = amounts.iter().sum();
    if actual != principal {
        return Err(ScheduleError::SumMismatch {
            expected: principal,
            actual,
        });
    }
    Ok(amounts)
}
