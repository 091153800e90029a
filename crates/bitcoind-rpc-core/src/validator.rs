//! Lexical checks for caller-supplied and daemon-supplied strings.
//!
//! These are pattern checks only. Address checks in particular do not
//! verify checksums or network prefixes; the daemon remains the authority.

use once_cell::sync::Lazy;
use regex::Regex;

static ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z0-9:]{30,60}$").expect("static address pattern"));
static AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("static amount pattern"));
static SIGNED_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("static amount pattern"));
static WALLET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?-u:[\w-])+(\.[a-z]{2,8})?$").expect("static wallet name pattern"));
static NEW_WALLET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?-u:[\w-]){3,40}$").expect("static wallet name pattern"));
static WALLET_PASSPHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._-]{3,64}$").expect("static passphrase pattern"));

/// `true` if `hash` is exactly `length` lowercase hex characters.
pub fn is_hash(hash: &str, length: usize) -> bool {
    hash.len() == length && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Loose address shape check: 30 to 60 alphanumerics, `:` allowed for
/// cash-address style prefixes.
pub fn is_address(address: &str) -> bool {
    ADDRESS.is_match(address)
}

/// Plain decimal amount (`123`, `0.5`), optionally with a leading minus.
pub fn is_amount(amount: &str, signed: bool) -> bool {
    if signed {
        SIGNED_AMOUNT.is_match(amount)
    } else {
        AMOUNT.is_match(amount)
    }
}

/// Name of an existing wallet, optionally with a file extension (`wallet.dat`).
pub fn is_wallet_name(name: &str) -> bool {
    WALLET_NAME.is_match(name)
}

/// Name accepted for `createwallet`.
pub fn is_new_wallet_name(name: &str) -> bool {
    NEW_WALLET_NAME.is_match(name)
}

/// Passphrase accepted for `encryptwallet`.
pub fn is_wallet_passphrase(passphrase: &str) -> bool {
    WALLET_PASSPHRASE.is_match(passphrase)
}
