use crate::error::HoldersError;

pub const MAX_SYMBOL_LENGTH: usize = 12;

/// Trims and uppercases a ticker symbol.
///
/// Accepts letters, digits and the punctuation exchanges use in symbols
/// (`.`, `-`, `^`, `=`), e.g. `BRK-B`, `^GSPC`, `EURUSD=X`, `7203.T`.
pub fn validate_symbol(input: &str) -> Result<String, HoldersError> {
    let symbol = input.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(HoldersError::InvalidInput(
            "symbol cannot be empty".to_string(),
        ));
    }
    if symbol.len() > MAX_SYMBOL_LENGTH {
        return Err(HoldersError::InvalidInput(format!(
            "symbol too long (max {} characters)",
            MAX_SYMBOL_LENGTH
        )));
    }
    if let Some(bad) = symbol
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(HoldersError::InvalidInput(format!(
            "invalid character {:?} in symbol {}",
            bad, symbol
        )));
    }
    Ok(symbol)
}
