use crate::models::Balance;

/// Render a raw planck amount with the chain's decimals, e.g. `12.5 AGC`.
///
/// Trailing zeros of the fraction are dropped.
pub fn format_balance(amount: Balance, decimals: u32, denom: &str) -> String {
    let number = match 10u128.checked_pow(decimals) {
        Some(unit) if decimals > 0 => {
            let whole = amount / unit;
            let fraction = amount % unit;
            if fraction == 0 {
                whole.to_string()
            } else {
                let digits = format!("{:0width$}", fraction, width = decimals as usize);
                format!("{}.{}", whole, digits.trim_end_matches('0'))
            }
        }
        // Zero decimals, or more than u128 can scale by
        _ => amount.to_string(),
    };

    if denom.is_empty() {
        number
    } else {
        format!("{} {}", number, denom)
    }
}
