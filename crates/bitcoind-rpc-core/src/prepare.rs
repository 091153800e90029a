//! Transaction preparation: coin selection, change, signing and broadcast.
//!
//! [`PrepareTransaction`] accumulates outputs and a fee setting, then
//! [`send`](PrepareTransaction::send) consumes it:
//!
//! 1. resolve the input pool (pinned inputs, or `listunspent` with at least
//!    one confirmation),
//! 2. with a per-byte fee, sign a pseudo transaction with a placeholder fee
//!    to measure its size, then price the real fee from that size,
//! 3. select inputs greedily in pool order, add change, create, sign and
//!    broadcast.

use std::fmt;

use bitcoin::{OutPoint, Txid};
use tracing::{debug, info, warn};

use crate::amount::Amount;
use crate::error::CoreError;
use crate::response::{Output, SignedRawTransaction, UnspentOutputs};
use crate::validator::is_address;
use crate::wallet::Wallet;

/// Bounds for `fee_per_byte`, in satoshis.
pub const MIN_FEE_PER_BYTE: u64 = 1;
pub const MAX_FEE_PER_BYTE: u64 = 500;

/// Accepted range for the estimated transaction size, in bytes.
pub const MIN_TX_SIZE: usize = 166;
pub const MAX_TX_SIZE: usize = 102_400;

/// Placeholder fee (in satoshis) used to size a per-byte-priced transaction.
const PSEUDO_FEE_SATS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fee {
    /// Absolute fee in the wallet's base unit.
    Flat(Amount),
    /// Satoshis per byte of the signed transaction.
    PerByte(u64),
}

/// Where change goes when no address was preset, or in preference to it.
pub enum ChangeAddressResolver {
    /// Called with the change amount; `None` or an invalid address falls
    /// back to the preset change address.
    Callback(Box<dyn Fn(Amount) -> Option<String> + Send + Sync>),
    /// Ask the wallet for a fresh address.
    NewAddress,
}

impl fmt::Debug for ChangeAddressResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::NewAddress => f.write_str("NewAddress"),
        }
    }
}

/// Builder for one wallet-funded transaction.
///
/// Setters validate their arguments and return the builder; `send` consumes
/// it, so a builder is never reused after a send attempt.
pub struct PrepareTransaction<'w> {
    wallet: &'w Wallet,
    scale: u32,
    outputs: Vec<(String, Amount)>,
    total: Amount,
    fee: Option<Fee>,
    change_address: Option<String>,
    change_resolver: Option<ChangeAddressResolver>,
    inputs: Option<Vec<Output>>,
}

impl<'w> PrepareTransaction<'w> {
    pub(crate) fn new(wallet: &'w Wallet) -> Self {
        let scale = wallet.scale();
        Self {
            wallet,
            scale,
            outputs: Vec::new(),
            total: Amount::zero(scale),
            fee: None,
            change_address: None,
            change_resolver: None,
            inputs: None,
        }
    }

    /// Pay `amount` to `address`. Paying the same address twice adds to the
    /// existing output.
    pub fn output(mut self, address: &str, amount: Amount) -> Result<Self, CoreError> {
        check_address(address)?;
        let amount = self.to_scale(amount)?;
        if !amount.is_positive() {
            return Err(CoreError::Validation(format!(
                "output amount must be positive, got {amount}"
            )));
        }

        match self.outputs.iter_mut().find(|(existing, _)| existing == address) {
            Some((_, existing)) => *existing = checked_add(*existing, amount)?,
            None => self.outputs.push((address.to_owned(), amount)),
        }
        self.total = checked_add(self.total, amount)?;
        Ok(self)
    }

    /// Absolute fee. Clears any per-byte fee.
    pub fn fee(mut self, amount: Amount) -> Result<Self, CoreError> {
        let amount = self.to_scale(amount)?;
        if amount.is_negative() {
            return Err(CoreError::Validation(format!(
                "fee must not be negative, got {amount}"
            )));
        }
        self.fee = Some(Fee::Flat(amount));
        Ok(self)
    }

    /// Fee rate in satoshis per byte. Clears any absolute fee.
    pub fn fee_per_byte(mut self, sats: u64) -> Result<Self, CoreError> {
        if !(MIN_FEE_PER_BYTE..=MAX_FEE_PER_BYTE).contains(&sats) {
            return Err(CoreError::Validation(format!(
                "fee per byte must be within {MIN_FEE_PER_BYTE}..={MAX_FEE_PER_BYTE} satoshis, got {sats}"
            )));
        }
        self.fee = Some(Fee::PerByte(sats));
        Ok(self)
    }

    pub fn change_address(mut self, address: &str) -> Result<Self, CoreError> {
        check_address(address)?;
        self.change_address = Some(address.to_owned());
        Ok(self)
    }

    pub fn change_resolver(mut self, resolver: ChangeAddressResolver) -> Self {
        self.change_resolver = Some(resolver);
        self
    }

    /// Spend exactly from these candidates instead of `listunspent`.
    pub fn inputs(mut self, inputs: impl Into<UnspentOutputs>) -> Self {
        self.inputs = Some(inputs.into().into_iter().collect());
        self
    }

    pub fn outputs(&self) -> &[(String, Amount)] {
        &self.outputs
    }

    /// Sum of all requested outputs, fee excluded.
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn fee_setting(&self) -> Option<Fee> {
        self.fee
    }

    /// Build, sign and broadcast. Returns the broadcast txid.
    pub async fn send(self) -> Result<Txid, CoreError> {
        let fee_setting = self
            .fee
            .ok_or_else(|| CoreError::Transaction("no fee or fee per byte set".to_owned()))?;
        if self.outputs.is_empty() {
            return Err(CoreError::Transaction("no outputs added".to_owned()));
        }

        let pool = match &self.inputs {
            Some(pinned) => pinned.clone(),
            None => self
                .wallet
                .list_unspent(1, None, None)
                .await?
                .into_iter()
                .collect(),
        };
        debug!(candidates = pool.len(), pinned = self.inputs.is_some(), "input pool resolved");

        let mut change_address = None;
        let fee = match fee_setting {
            Fee::Flat(fee) => fee,
            Fee::PerByte(sats) => {
                let pseudo_fee = self.sats(PSEUDO_FEE_SATS)?;
                let pseudo = self
                    .build_signed(&pool, pseudo_fee, &mut change_address)
                    .await?;
                let size = pseudo.size();
                if !(MIN_TX_SIZE..=MAX_TX_SIZE).contains(&size) {
                    return Err(CoreError::Transaction(format!(
                        "estimated transaction size {size} bytes is outside {MIN_TX_SIZE}..={MAX_TX_SIZE}"
                    )));
                }
                let fee_sats = sats.checked_mul(size as u64).ok_or_else(overflow)?;
                let fee = self.sats(fee_sats)?;
                info!(size, fee_per_byte = sats, %fee, "fee resolved from estimated size");
                fee
            }
        };

        let signed = self.build_signed(&pool, fee, &mut change_address).await?;
        let txid = self.wallet.send_raw_transaction(&signed.hex).await?;
        info!(%txid, total = %self.total, %fee, "transaction broadcast");
        Ok(txid)
    }

    async fn build_signed(
        &self,
        pool: &[Output],
        fee: Amount,
        change_address: &mut Option<String>,
    ) -> Result<SignedRawTransaction, CoreError> {
        let target = checked_add(self.total, fee)?;
        let selection = select_inputs(pool, target)?;
        let change = selection
            .total
            .checked_sub(target)
            .ok_or_else(overflow)?;
        debug!(
            inputs = selection.inputs.len(),
            selected = %selection.total,
            %target,
            %change,
            "inputs selected"
        );

        let mut outputs = self.outputs.clone();
        if change.is_positive() {
            let address = match change_address.clone() {
                Some(address) => address,
                None => {
                    let address = self.resolve_change_address(change).await?;
                    *change_address = Some(address.clone());
                    address
                }
            };
            match outputs.iter_mut().find(|(existing, _)| *existing == address) {
                Some((_, amount)) => {
                    warn!(%address, "change address is also a payee; change replaces that output");
                    *amount = change;
                }
                None => outputs.push((address, change)),
            }
        }

        let unsigned = self
            .wallet
            .create_raw_transaction(&selection.inputs, &outputs)
            .await?;
        let signed = self.wallet.sign_raw_transaction(&unsigned).await?;
        if !signed.complete {
            return Err(CoreError::Transaction(format!(
                "daemon could not fully sign the transaction ({} input errors)",
                signed.errors.len()
            )));
        }
        Ok(signed)
    }

    async fn resolve_change_address(&self, change: Amount) -> Result<String, CoreError> {
        if let Some(resolver) = &self.change_resolver {
            let candidate = match resolver {
                ChangeAddressResolver::Callback(resolve) => resolve(change),
                ChangeAddressResolver::NewAddress => Some(self.wallet.get_new_address().await?),
            };
            match candidate {
                Some(address) if is_address(&address) => return Ok(address),
                Some(address) => warn!(%address, "change resolver gave an invalid address"),
                None => debug!("change resolver gave no address"),
            }
        }
        self.change_address.clone().ok_or_else(|| {
            CoreError::Transaction(format!("change of {change} needs a change address"))
        })
    }

    fn to_scale(&self, amount: Amount) -> Result<Amount, CoreError> {
        amount.rescale(self.scale).ok_or_else(overflow)
    }

    fn sats(&self, sats: u64) -> Result<Amount, CoreError> {
        Amount::from_sats(sats, self.scale).ok_or_else(overflow)
    }
}

impl fmt::Debug for PrepareTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepareTransaction")
            .field("wallet", &self.wallet.name())
            .field("outputs", &self.outputs)
            .field("total", &self.total)
            .field("fee", &self.fee)
            .field("change_address", &self.change_address)
            .field("change_resolver", &self.change_resolver)
            .field("inputs", &self.inputs.as_ref().map(Vec::len))
            .finish()
    }
}

/// Inputs picked to cover a target amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub inputs: Vec<OutPoint>,
    pub total: Amount,
}

/// Take candidates in order until `target` is covered.
///
/// Candidates without a valid amount are skipped. Fails with
/// [`CoreError::InsufficientFunds`] when the whole pool falls short.
pub fn select_inputs(pool: &[Output], target: Amount) -> Result<Selection, CoreError> {
    let mut needed = target;
    let mut selection = Selection {
        inputs: Vec::new(),
        total: Amount::zero(target.scale()),
    };

    for candidate in pool {
        if !needed.is_positive() {
            break;
        }
        let Some(amount) = candidate.amount.filter(|a| !a.is_negative()) else {
            continue;
        };
        selection.inputs.push(candidate.outpoint());
        selection.total = checked_add(selection.total, amount)?;
        needed = needed.checked_sub(amount).ok_or_else(overflow)?;
    }

    if needed.is_positive() {
        return Err(CoreError::InsufficientFunds {
            required: target,
            available: selection.total,
        });
    }
    Ok(selection)
}

fn check_address(address: &str) -> Result<(), CoreError> {
    if is_address(address) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("invalid address `{address}`")))
    }
}

fn checked_add(a: Amount, b: Amount) -> Result<Amount, CoreError> {
    a.checked_add(b).ok_or_else(overflow)
}

fn overflow() -> CoreError {
    CoreError::Transaction("amount out of range".to_owned())
}
