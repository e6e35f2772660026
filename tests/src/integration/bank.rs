//! Shared ledger fixture: a small bank-style transaction model wired into
//! every engine port, plus a strictly sequential reference executor the
//! equivalence tests compare against.

use std::sync::Arc;

use px_execution_engine::{
    BlockExecutor, DecodeError, EngineConfig, ExecContext, ExecError, ExecOutcome,
    FeeCollectorUpdater, FeeExtractor, FeeUpdateError, LogFixer, PartyExtractor, SettledTask,
    TxDecoder, TxExecutor,
};
use px_snapshot_store::{MemStore, OverlayBatch, StateWriter};
use shared_types::{code, Address, Bloom, Fee, LogRecord, StoreKey, TxParties};

pub const ACC: StoreKey = StoreKey::new("acc");
pub const STO: StoreKey = StoreKey::new("storage");
pub const FEE_KEY: &[u8] = b"fee_collector";

/// Every account starts with this balance unless seeded otherwise.
pub const OPENING_BALANCE: u64 = 1_000;

pub const TRANSFER_GAS: u64 = 21_000;
pub const INCREMENT_GAS: u64 = 5_000;
pub const DONATE_GAS: u64 = 2_000;
pub const NOOP_GAS: u64 = 1_000;

/// Test transaction model. Accounts and counters are one-byte identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankTx {
    /// Move `amount` from one account to another.
    Transfer {
        from: u8,
        to: u8,
        amount: u64,
        fee: Fee,
    },
    /// Read-modify-write on a shared counter; `sender` only matters for
    /// grouping, so two increments of the same counter can land in
    /// different dependency chains and collide.
    Increment {
        sender: u8,
        counter: u8,
        by: u64,
        fee: Fee,
    },
    /// Reads and bumps the fee-collector balance directly. Every donation
    /// touches that one key and nothing else, so a batch of them contends
    /// solely on the key that conflict detection excludes.
    Donate { sender: u8, amount: u64, fee: Fee },
    /// Touches nothing and has no parties.
    Noop { fee: Fee },
    /// Fails validation before executing.
    BadSig { from: u8 },
}

impl BankTx {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            BankTx::Transfer {
                from,
                to,
                amount,
                fee,
            } => {
                let mut out = vec![0, *from, *to];
                out.extend_from_slice(&amount.to_be_bytes());
                out.extend_from_slice(&fee.to_be_bytes());
                out
            }
            BankTx::Increment {
                sender,
                counter,
                by,
                fee,
            } => {
                let mut out = vec![1, *sender, *counter];
                out.extend_from_slice(&by.to_be_bytes());
                out.extend_from_slice(&fee.to_be_bytes());
                out
            }
            BankTx::Noop { fee } => {
                let mut out = vec![2];
                out.extend_from_slice(&fee.to_be_bytes());
                out
            }
            BankTx::BadSig { from } => vec![3, *from],
            BankTx::Donate {
                sender,
                amount,
                fee,
            } => {
                let mut out = vec![4, *sender];
                out.extend_from_slice(&amount.to_be_bytes());
                out.extend_from_slice(&fee.to_be_bytes());
                out
            }
        }
    }

    pub fn fee(&self) -> Fee {
        match self {
            BankTx::Transfer { fee, .. } => *fee,
            BankTx::Increment { fee, .. } => *fee,
            BankTx::Donate { fee, .. } => *fee,
            BankTx::Noop { fee } => *fee,
            BankTx::BadSig { .. } => 0,
        }
    }
}

fn be_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_be_bytes(buf)
}

fn be_fee(bytes: &[u8]) -> Fee {
    let mut buf = [0u8; 16];
    buf.copy_from_slice(bytes);
    Fee::from_be_bytes(buf)
}

fn addr(byte: u8) -> Address {
    Address::from_low_u64_be(byte as u64)
}

/// Decoder/extractor bundle for [`BankTx`].
pub struct BankCodec;

impl TxDecoder<BankTx> for BankCodec {
    fn decode(&self, payload: &[u8]) -> Result<BankTx, DecodeError> {
        match payload {
            [0, from, to, rest @ ..] if rest.len() == 24 => Ok(BankTx::Transfer {
                from: *from,
                to: *to,
                amount: be_u64(&rest[..8]),
                fee: be_fee(&rest[8..]),
            }),
            [1, sender, counter, rest @ ..] if rest.len() == 24 => Ok(BankTx::Increment {
                sender: *sender,
                counter: *counter,
                by: be_u64(&rest[..8]),
                fee: be_fee(&rest[8..]),
            }),
            [2, rest @ ..] if rest.len() == 16 => Ok(BankTx::Noop { fee: be_fee(rest) }),
            [3, from] => Ok(BankTx::BadSig { from: *from }),
            [4, sender, rest @ ..] if rest.len() == 24 => Ok(BankTx::Donate {
                sender: *sender,
                amount: be_u64(&rest[..8]),
                fee: be_fee(&rest[8..]),
            }),
            _ => Err(DecodeError(format!("bad payload, {} bytes", payload.len()))),
        }
    }
}

impl PartyExtractor<BankTx> for BankCodec {
    fn parties(&self, tx: &BankTx) -> Option<TxParties> {
        match tx {
            BankTx::Transfer { from, to, .. } => Some(TxParties::new(addr(*from), Some(addr(*to)))),
            BankTx::Increment { sender, .. } => Some(TxParties::new(addr(*sender), None)),
            BankTx::Donate { sender, .. } => Some(TxParties::new(addr(*sender), None)),
            BankTx::Noop { .. } => None,
            BankTx::BadSig { from } => Some(TxParties::new(addr(*from), None)),
        }
    }
}

impl FeeExtractor<BankTx> for BankCodec {
    fn fee(&self, tx: &BankTx) -> (Fee, bool) {
        (tx.fee(), matches!(tx, BankTx::Transfer { .. }))
    }
}

fn read_balance(state: &mut OverlayBatch, account: u8) -> u64 {
    state
        .get(ACC, &[account])
        .map(|v| be_u64(&v))
        .unwrap_or(OPENING_BALANCE)
}

fn read_counter(state: &mut OverlayBatch, counter: u8) -> u64 {
    state.get(STO, &[counter]).map(|v| be_u64(&v)).unwrap_or(0)
}

/// A fifth of the fee is refunded on successful transfers, so settlement's
/// refund subtraction gets exercised.
pub fn transfer_refund(fee: Fee) -> Fee {
    fee / 5
}

/// The ledger semantics under test.
pub struct BankExecutor;

impl TxExecutor<BankTx> for BankExecutor {
    fn execute(
        &self,
        _ctx: &ExecContext,
        tx: &BankTx,
        state: &mut OverlayBatch,
    ) -> Result<ExecOutcome, ExecError> {
        match tx {
            BankTx::Transfer {
                from,
                to,
                amount,
                fee,
            } => {
                let from_balance = read_balance(state, *from);
                let Some(from_after) = from_balance.checked_sub(*amount) else {
                    return Err(ExecError::Failed {
                        reason: "insufficient funds".into(),
                        gas_wanted: TRANSFER_GAS,
                        gas_used: TRANSFER_GAS,
                    });
                };
                let to_balance = read_balance(state, *to);
                state.set(ACC, vec![*from], from_after.to_be_bytes().to_vec());
                state.set(ACC, vec![*to], (to_balance + amount).to_be_bytes().to_vec());

                let mut bloom = Bloom::zero();
                bloom.0[*from as usize] = 1;
                Ok(ExecOutcome {
                    gas_wanted: TRANSFER_GAS,
                    gas_used: TRANSFER_GAS,
                    logs: vec![LogRecord {
                        address: addr(*from),
                        topics: Vec::new(),
                        data: vec![*to],
                        index: u64::MAX,
                        tx_index: u64::MAX,
                    }],
                    bloom,
                    refund_fee: transfer_refund(*fee),
                    ..Default::default()
                })
            }
            BankTx::Increment { counter, by, .. } => {
                let current = read_counter(state, *counter);
                state.set(STO, vec![*counter], (current + by).to_be_bytes().to_vec());
                Ok(ExecOutcome {
                    gas_wanted: INCREMENT_GAS,
                    gas_used: INCREMENT_GAS,
                    ..Default::default()
                })
            }
            BankTx::Donate { amount, .. } => {
                // Deliberate read-modify-write on the collector balance: the
                // one key every task may touch without serializing the block.
                let pot = state
                    .get(ACC, FEE_KEY)
                    .map(|v| be_u64(&v))
                    .unwrap_or(0);
                state.set(ACC, FEE_KEY.to_vec(), (pot + amount).to_be_bytes().to_vec());
                Ok(ExecOutcome {
                    gas_wanted: DONATE_GAS,
                    gas_used: DONATE_GAS,
                    ..Default::default()
                })
            }
            BankTx::Noop { .. } => Ok(ExecOutcome {
                gas_wanted: NOOP_GAS,
                gas_used: NOOP_GAS,
                ..Default::default()
            }),
            BankTx::BadSig { .. } => Err(ExecError::Validation("bad signature".into())),
        }
    }
}

/// Writes the net block fee to the collector balance key.
pub struct BankFeeCollector;

impl FeeCollectorUpdater for BankFeeCollector {
    fn update(&self, state: &mut dyn StateWriter, net_fee: Fee) -> Result<(), FeeUpdateError> {
        state.set(ACC, FEE_KEY.to_vec(), net_fee.to_be_bytes().to_vec());
        Ok(())
    }
}

/// Patches transfer responses with `[transfer_index, log_count]` so tests can
/// observe that fixup ran after re-indexing.
pub struct BankLogFixer;

impl LogFixer for BankLogFixer {
    fn fix_logs(&self, tasks: &[SettledTask<'_>]) -> Vec<Vec<u8>> {
        tasks
            .iter()
            .map(|task| match (task.is_transfer, task.ante_err, task.outcome) {
                (true, None, Some(outcome)) => {
                    vec![task.transfer_index as u8, outcome.logs.len() as u8]
                }
                _ => Vec::new(),
            })
            .collect()
    }
}

/// Build an engine over the bank fixture.
pub fn bank_executor(workers: usize) -> BlockExecutor<BankTx> {
    BlockExecutor::new(
        EngineConfig {
            workers,
            fee_collector_key: FEE_KEY.to_vec(),
        },
        Arc::new(BankCodec),
        Arc::new(BankCodec),
        Arc::new(BankCodec),
        Arc::new(BankExecutor),
        Arc::new(BankFeeCollector),
        Arc::new(BankLogFixer),
    )
    .expect("valid fixture config")
}

pub fn encode_all(txs: &[BankTx]) -> Vec<Vec<u8>> {
    txs.iter().map(BankTx::encode).collect()
}

/// What the reference executor produced for one block.
#[derive(Debug, PartialEq, Eq)]
pub struct Reference {
    /// Expected response code per transaction.
    pub codes: Vec<u32>,
    /// Expected durable state after flush.
    pub backend: std::collections::BTreeMap<StoreKey, std::collections::BTreeMap<Vec<u8>, Vec<u8>>>,
    pub gas_used: u64,
}

/// Execute payloads strictly left to right with no speculation. The engine
/// must be observationally equivalent to this.
pub fn run_reference(payloads: &[Vec<u8>]) -> Reference {
    use std::collections::BTreeMap;

    let mut acc: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
    let mut sto: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
    let mut codes = Vec::with_capacity(payloads.len());
    let mut net_fee: Fee = 0;
    let mut gas_used: u64 = 0;

    let balance = |acc: &BTreeMap<Vec<u8>, Vec<u8>>, who: u8| {
        acc.get(&vec![who])
            .map(|v| be_u64(v))
            .unwrap_or(OPENING_BALANCE)
    };

    for payload in payloads {
        let Ok(tx) = BankCodec.decode(payload) else {
            codes.push(code::DECODE_ERROR);
            continue;
        };
        match tx {
            BankTx::Transfer {
                from,
                to,
                amount,
                fee,
            } => {
                gas_used += TRANSFER_GAS;
                match balance(&acc, from).checked_sub(amount) {
                    Some(from_after) => {
                        let to_after = balance(&acc, to) + amount;
                        acc.insert(vec![from], from_after.to_be_bytes().to_vec());
                        acc.insert(vec![to], to_after.to_be_bytes().to_vec());
                        net_fee += fee - transfer_refund(fee);
                        codes.push(code::OK);
                    }
                    None => {
                        net_fee += fee;
                        codes.push(code::EXEC_ERROR);
                    }
                }
            }
            BankTx::Increment { counter, by, fee, .. } => {
                gas_used += INCREMENT_GAS;
                let current = sto.get(&vec![counter]).map(|v| be_u64(v)).unwrap_or(0);
                sto.insert(vec![counter], (current + by).to_be_bytes().to_vec());
                net_fee += fee;
                codes.push(code::OK);
            }
            BankTx::Donate { fee, .. } => {
                // The interim collector writes are overwritten by the single
                // settlement reconciliation, same as in the engine.
                gas_used += DONATE_GAS;
                net_fee += fee;
                codes.push(code::OK);
            }
            BankTx::Noop { fee } => {
                gas_used += NOOP_GAS;
                net_fee += fee;
                codes.push(code::OK);
            }
            BankTx::BadSig { .. } => {
                codes.push(code::VALIDATION_ERROR);
            }
        }
    }

    acc.insert(FEE_KEY.to_vec(), net_fee.to_be_bytes().to_vec());

    let mut backend = std::collections::BTreeMap::new();
    if !acc.is_empty() {
        backend.insert(ACC, acc);
    }
    if !sto.is_empty() {
        backend.insert(STO, sto);
    }
    Reference {
        codes,
        backend,
        gas_used,
    }
}

/// Fresh empty backend.
pub fn backend() -> Arc<MemStore> {
    Arc::new(MemStore::new())
}
