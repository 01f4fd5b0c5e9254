//! Pure consolidation, filtering and sorting over token lists.
//!
//! No side effects and no allocation beyond the returned vectors — safe
//! to recompute on every aggregation change.

use folio_common::types::{ConsolidatedToken, TokenDetail};
use rust_decimal::Decimal;

/// Group per-chain balances by symbol (case-insensitive) into one
/// cross-chain view. Groups keep first-seen order; within a group the
/// primary chain is the entry with the highest USD balance.
pub fn consolidate_tokens_by_symbol(tokens: &[TokenDetail]) -> Vec<ConsolidatedToken> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: std::collections::HashMap<String, Vec<TokenDetail>> =
        std::collections::HashMap::new();

    for detail in tokens {
        let symbol = detail.token.symbol.to_uppercase();
        let group = groups.entry(symbol.clone()).or_insert_with(|| {
            order.push(symbol);
            Vec::new()
        });
        group.push(detail.clone());
    }

    order
        .into_iter()
        .map(|symbol| {
            let chains = groups.remove(&symbol).unwrap_or_default();
            let total_balance_usd = chains.iter().map(|c| c.token.balance_usd).sum();
            let primary_chain = chains
                .iter()
                .max_by_key(|c| c.token.balance_usd)
                .cloned()
                .expect("group is never empty");
            ConsolidatedToken {
                symbol,
                chains,
                primary_chain,
                total_balance_usd,
            }
        })
        .collect()
}

/// Drop dust groups when `hide_small` is set; pass through otherwise.
pub fn filter_consolidated_by_balance(
    tokens: Vec<ConsolidatedToken>,
    hide_small: bool,
    threshold: Decimal,
) -> Vec<ConsolidatedToken> {
    if !hide_small {
        return tokens;
    }
    tokens
        .into_iter()
        .filter(|t| t.total_balance_usd >= threshold)
        .collect()
}

/// Sort descending by total USD balance; ties keep their prior relative
/// order (stable sort).
pub fn sort_consolidated_by_balance(mut tokens: Vec<ConsolidatedToken>) -> Vec<ConsolidatedToken> {
    tokens.sort_by(|a, b| b.total_balance_usd.cmp(&a.total_balance_usd));
    tokens
}
