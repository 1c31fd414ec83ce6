//! Integration test: monetary invariants under concurrent access.
//!
//! Many tasks trade and transfer at once; afterwards the books must still
//! balance: no negative balances, no lost or duplicated funds, and a
//! journal that replays to exactly the observed balances.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;
use tactizen_market::{
    AccountId, EngineConfig, ExecuteTradeCommand, GoodId, MarketEngine, MarketId, OwnerId,
    RegionId, Side, SimulationClock, TradeError, TransferFundsCommand,
};

const REGION: RegionId = RegionId(1);

fn grain_id() -> MarketId {
    MarketId::resource(REGION, GoodId::new("grain").unwrap(), 0)
}

fn setup_engine(traders: u64, balance: &str) -> Arc<MarketEngine<SimulationClock>> {
    let mut accounts = String::new();
    for user in 1..=traders {
        if user > 1 {
            accounts.push(',');
        }
        accounts.push_str(&format!(
            r#"{{ "owner": {{ "user": {} }}, "scope": {{ "local": 1 }}, "balance": "{}" }}"#,
            user, balance
        ));
    }
    let json = format!(
        r#"{{
            "markets": [
                {{ "region": 1, "good": "grain", "initial_price": "10.00" }},
                {{ "region": 1 }}
            ],
            "accounts": [{}]
        }}"#,
        accounts
    );
    let config = EngineConfig::from_json(&json).unwrap();
    Arc::new(MarketEngine::fixed_time(config).unwrap())
}

/// Quote, then confirm with the observed level, retrying on `StalePrice`:
/// the protocol a well-behaved caller follows under contention.
async fn buy_with_retry(
    engine: &MarketEngine<SimulationClock>,
    trader: OwnerId,
    quantity: u32,
) -> Decimal {
    loop {
        let quote = engine.quote(grain_id(), Side::Buy, quantity).await.unwrap();
        let command = ExecuteTradeCommand {
            market_id: grain_id(),
            side: Side::Buy,
            quantity,
            observed_price_level: quote.observed_price_level,
            trader,
        };
        match engine.execute(command).await {
            Ok(execution) => return execution.quote.total,
            Err(TradeError::StalePrice { .. }) => continue,
            Err(other) => panic!("unexpected trade failure: {other}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_buys_serialize_on_one_market() {
    let engine = setup_engine(4, "1000000");

    let mut handles = Vec::new();
    for user in 1..=4u64 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let mut spent = Decimal::ZERO;
            for _ in 0..25 {
                spent += buy_with_retry(&engine, OwnerId::User(user), 10).await;
            }
            spent
        }));
    }

    let mut total_spent = Decimal::ZERO;
    for handle in handles {
        total_spent += handle.await.unwrap();
    }

    // 4 tasks * 25 buys * 10 units all landed: the market's absolute
    // position advanced by exactly 1000 units.
    let market = engine.market(&grain_id()).unwrap();
    let position =
        i64::from(market.price_level) * i64::from(market.volume_per_level)
            + i64::from(market.progress_within_level);
    assert_eq!(position, 1000);

    // Every cent the traders lost is accounted for by an executed trade.
    let mut remaining = Decimal::ZERO;
    for user in 1..=4u64 {
        remaining += engine.balance(&AccountId::local(OwnerId::User(user), REGION));
    }
    assert_eq!(dec!(4000000) - remaining, total_spent);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_opposing_transfers_conserve_funds() {
    let engine = setup_engine(2, "10000");
    let alice = AccountId::local(OwnerId::User(1), REGION);
    let bob = AccountId::local(OwnerId::User(2), REGION);

    let mut handles = Vec::new();
    for task in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            let (from, to) = if task % 2 == 0 { (alice, bob) } else { (bob, alice) };
            for _ in 0..100 {
                // Insufficient funds is acceptable under contention.
                let _ = engine
                    .transfer(TransferFundsCommand {
                        from,
                        to,
                        amount: dec!(7),
                        reason: "wage".to_string(),
                    })
                    .await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert!(engine.balance(&alice) >= Decimal::ZERO);
    assert!(engine.balance(&bob) >= Decimal::ZERO);
    assert_eq!(engine.balance(&alice) + engine.balance(&bob), dec!(20000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_journal_replays_to_observed_balances() {
    let engine = setup_engine(3, "50000");

    let mut handles = Vec::new();
    for user in 1..=3u64 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            for round in 0..20 {
                buy_with_retry(&engine, OwnerId::User(user), 5).await;
                let peer = OwnerId::User(user % 3 + 1);
                let _ = engine
                    .transfer(TransferFundsCommand {
                        from: AccountId::local(OwnerId::User(user), REGION),
                        to: AccountId::local(peer, REGION),
                        amount: Decimal::from(round + 1),
                        reason: "donation".to_string(),
                    })
                    .await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Per-account: the journal's signed amounts sum to the live balance,
    // and every entry's balance_after matches the running sum at that
    // point. Appends happen under the account lock, so per-account journal
    // order is the serialization order.
    let mut running: HashMap<AccountId, Decimal> = HashMap::new();
    for entry in engine.ledger.all_entries() {
        let balance = running.entry(entry.account).or_insert(Decimal::ZERO);
        *balance += entry.signed_amount;
        assert_eq!(
            *balance, entry.balance_after,
            "journal inconsistent for {}",
            entry.account
        );
        assert!(*balance >= Decimal::ZERO);
    }
    for (account, replayed) in running {
        assert_eq!(engine.balance(&account), replayed);
    }
}
