//! Unwrapping of `redirectForToken` envelopes used by token proxy contracts.
//!
//! Two envelope shapes reach the precompile:
//!
//! | Shape    | Layout                                                       |
//! |----------|--------------------------------------------------------------|
//! | packed   | `618dc65e ‖ token (20 bytes) ‖ nested selector ‖ nested args` |
//! | explicit | `redirectForToken(address token, bytes nested)` ABI-encoded  |
//!
//! The explicit form is only accepted when re-encoding the decoded call gives
//! back the exact input, so a packed envelope that happens to parse as ABI is
//! never misread.

use crate::{
    abi::IHederaTokenService,
    error::DecodeError,
    selectors::{selector_of, Selector, REDIRECT_FOR_TOKEN},
};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;

/// Length of the packed envelope header: outer selector, token, nested selector.
pub const PACKED_HEADER_LEN: usize = 4 + 20 + 4;

/// A facade call extracted from its envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    /// Token address the facade call targets.
    pub token: Address,
    /// Nested selector and arguments.
    pub nested: Bytes,
    /// Envelope was ABI-encoded.
    pub explicit: bool,
}

impl Redirect {
    /// Selector of the nested call.
    pub fn selector(&self) -> Option<Selector> {
        selector_of(&self.nested)
    }
}

/// Extracts the facade call from `input` when it is a redirect envelope.
///
/// Returns `Ok(None)` for inputs that do not start with the redirect selector.
pub fn unwrap_redirect(input: &[u8]) -> Result<Option<Redirect>, DecodeError> {
    if selector_of(input) != Some(REDIRECT_FOR_TOKEN) {
        return Ok(None);
    }

    if let Ok(call) = IHederaTokenService::redirectForTokenCall::abi_decode(input) {
        if call.abi_encode() == input && call.encodedFunctionSelector.len() >= 4 {
            return Ok(Some(Redirect {
                token: call.token,
                nested: call.encodedFunctionSelector,
                explicit: true,
            }));
        }
    }

    if input.len() < PACKED_HEADER_LEN {
        return Err(DecodeError::ShortRedirect { len: input.len() });
    }

    Ok(Some(Redirect {
        token: Address::from_slice(&input[4..24]),
        nested: Bytes::copy_from_slice(&input[24..]),
        explicit: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::{ERC_BALANCE_OF, ERC_NAME};
    use alloy_primitives::address;

    const TOKEN: Address = address!("0x0000000000000000000000000000000000000482");

    fn packed(nested: &[u8]) -> Vec<u8> {
        let mut input = REDIRECT_FOR_TOKEN.to_vec();
        input.extend_from_slice(TOKEN.as_slice());
        input.extend_from_slice(nested);
        input
    }

    #[test]
    fn non_redirect_input_passes_through() {
        assert_eq!(unwrap_redirect(&ERC_NAME), Ok(None));
        assert_eq!(unwrap_redirect(&[]), Ok(None));
    }

    #[test]
    fn packed_envelope_is_unwrapped() {
        let mut nested = ERC_BALANCE_OF.to_vec();
        nested.extend_from_slice(&[0u8; 32]);
        let redirect = unwrap_redirect(&packed(&nested)).unwrap().unwrap();

        assert_eq!(redirect.token, TOKEN);
        assert!(!redirect.explicit);
        assert_eq!(redirect.selector(), Some(ERC_BALANCE_OF));
        assert_eq!(redirect.nested.len(), 4 + 32);
    }

    #[test]
    fn explicit_envelope_is_unwrapped() {
        let input = IHederaTokenService::redirectForTokenCall {
            token: TOKEN,
            encodedFunctionSelector: Bytes::copy_from_slice(&ERC_NAME),
        }
        .abi_encode();
        let redirect = unwrap_redirect(&input).unwrap().unwrap();

        assert!(redirect.explicit);
        assert_eq!(redirect.token, TOKEN);
        assert_eq!(redirect.selector(), Some(ERC_NAME));
        assert_eq!(redirect.nested, Bytes::copy_from_slice(&ERC_NAME));
    }

    #[test]
    fn truncated_envelope_is_a_decode_error() {
        let mut input = packed(&[]);
        input.extend_from_slice(&ERC_NAME[..2]);
        assert_eq!(
            unwrap_redirect(&input),
            Err(DecodeError::ShortRedirect { len: 26 })
        );
    }
}
