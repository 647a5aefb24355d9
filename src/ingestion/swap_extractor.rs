use rust_decimal::Decimal;

use crate::models::{SwapEvent, TokenBalanceSnapshot, TransactionRecord, NATIVE_DECIMALS, NATIVE_MINT};
use crate::solana::lamports_to_sol;

/// One side of a swap as read from balance deltas.
#[derive(Debug, Clone, PartialEq)]
struct Leg {
    mint: String,
    amount: Decimal,
    decimals: u8,
}

/// Classify a confirmed transaction as a single-hop swap.
///
/// Failed transactions and transactions that never touch `swap_program_id`
/// yield `None`. Token balance deltas are paired by account index: a negative
/// delta is the input leg, a positive one the output leg (later accounts win
/// when several move the same way). If a side is still missing, the fee
/// payer's lamport delta fills it in as native SOL. Multi-leg routes are not
/// disambiguated.
pub fn extract_swap(record: &TransactionRecord, swap_program_id: &str) -> Option<SwapEvent> {
    if !record.succeeded() {
        tracing::debug!(signature = %record.signature, "Transaction failed, skipping");
        return None;
    }

    if !record.mentions_account(swap_program_id) {
        tracing::debug!(signature = %record.signature, "Not a swap-router transaction, skipping");
        return None;
    }

    let (mut input, mut output) = token_legs(&record.pre_token_balances, &record.post_token_balances);

    if let Some(delta) = fee_payer_delta(record) {
        if delta < Decimal::ZERO && input.is_none() {
            input = Some(native_leg(delta.abs()));
        } else if delta > Decimal::ZERO && output.is_none() {
            output = Some(native_leg(delta));
        }
    }

    let (input, output) = match (input, output) {
        (Some(i), Some(o)) => (i, o),
        _ => {
            tracing::debug!(signature = %record.signature, "Could not resolve both swap legs");
            return None;
        }
    };

    Some(SwapEvent {
        signature: record.signature.clone(),
        input_mint: input.mint,
        output_mint: output.mint,
        input_amount: input.amount,
        output_amount: output.amount,
        input_decimals: input.decimals,
        output_decimals: output.decimals,
    })
}

fn native_leg(amount: Decimal) -> Leg {
    Leg {
        mint: NATIVE_MINT.to_string(),
        amount,
        decimals: NATIVE_DECIMALS,
    }
}

/// Pair pre and post snapshots by account index. Accounts without both
/// snapshots (e.g. a token account opened by this transaction) are skipped.
fn token_legs(
    pre: &[TokenBalanceSnapshot],
    post: &[TokenBalanceSnapshot],
) -> (Option<Leg>, Option<Leg>) {
    let mut input = None;
    let mut output = None;

    for before in pre {
        let Some(after) = post.iter().find(|q| q.account_index == before.account_index) else {
            continue;
        };
        let delta = after.ui_amount - before.ui_amount;

        if delta < Decimal::ZERO {
            input = Some(Leg {
                mint: after.mint.clone(),
                amount: delta.abs(),
                decimals: after.decimals,
            });
        } else if delta > Decimal::ZERO {
            output = Some(Leg {
                mint: after.mint.clone(),
                amount: delta,
                decimals: after.decimals,
            });
        }
    }

    (input, output)
}

/// Lamport change on account 0, in SOL.
fn fee_payer_delta(record: &TransactionRecord) -> Option<Decimal> {
    let pre = *record.pre_balances.first()?;
    let post = *record.post_balances.first()?;
    let delta = if post >= pre {
        lamports_to_sol(post - pre)
    } else {
        -lamports_to_sol(pre - post)
    };
    Some(delta)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
