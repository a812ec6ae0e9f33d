use std::str::FromStr;

use alloy_primitives::Address;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid Ethereum address format: `{0}`")]
pub struct AddressParseError(pub String);

/// Checks that `value` is an account address the ledger accepts.
///
/// 40 hex digits, optionally prefixed with `0x`. Single-case input is accepted as is, mixed-case
/// input must carry a valid EIP-55 checksum.
pub fn is_address(value: &str) -> bool {
    let hex = strip_hex_prefix(value);

    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());

    if !(has_lower && has_upper) {
        return true;
    }

    Address::parse_checksummed(format!("0x{hex}"), None).is_ok()
}

/// Parses an account address, applying the [`is_address`] predicate first.
pub fn parse_address(value: &str) -> Result<Address, AddressParseError> {
    if !is_address(value) {
        return Err(AddressParseError(value.to_string()));
    }

    Address::from_str(strip_hex_prefix(value)).map_err(|_| AddressParseError(value.to_string()))
}

fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0x627306090abaB3A6e1400e9345bC60c78a8BEf57", true)]
    #[case("0x627306090abab3a6e1400e9345bc60c78a8bef57", true)]
    #[case("0X627306090ABAB3A6E1400E9345BC60C78A8BEF57", true)]
    #[case("627306090abab3a6e1400e9345bc60c78a8bef57", true)]
    #[case("0x627306090abab3A6e1400e9345bC60c78a8BEf57", false)]
    #[case("0x627306090abaB3A6e1400e9345bC60c78a8BEf5", false)]
    #[case("0x627306090abaB3A6e1400e9345bC60c78a8BEf577", false)]
    #[case("0xz27306090abab3a6e1400e9345bc60c78a8bef57", false)]
    #[case("", false)]
    #[case("0x", false)]
    fn address_predicate(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_address(input), expected, "{input}");
    }

    #[test]
    fn parse_address_accepts_unprefixed_input() {
        let parsed = parse_address("f17f52151ebef6c7334fad080c5704d77216b732").unwrap();
        assert_eq!(parsed, address!("f17f52151EbEF6C7334FAD080c5704D77216b732"));
    }

    #[test]
    fn parse_address_rejects_bad_checksum() {
        let input = "0xF17f52151EbEF6C7334FAD080c5704D77216b732";
        assert_eq!(parse_address(input), Err(AddressParseError(input.to_string())));
    }
}
