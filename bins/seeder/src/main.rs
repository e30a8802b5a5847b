//! Demo data generator for SplitLedger development and testing.
//!
//! Writes a fixture file with one demo group and prints a bearer token per
//! member, signed with the configured JWT secret. Point
//! `SPLITLEDGER__STORE__SEED_FILE` at the file to serve it.
//!
//! Usage: cargo run --bin seeder [-- <output path>]

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use splitledger_core::ledger::{
    Expense, ExpenseSplit, GroupMember, Settlement, SettlementStatus,
};
use splitledger_db::{FixtureFile, GroupFixture};
use splitledger_shared::types::{ExpenseId, GroupId, SettlementId, UserId};
use splitledger_shared::{AppConfig, JwtConfig, JwtService};

/// Demo group ID (stable across runs)
const DEMO_GROUP_ID: &str = "00000000-0000-0000-0000-000000000100";
/// Demo members (stable across runs)
const DEMO_MEMBERS: [(&str, &str); 3] = [
    ("00000000-0000-0000-0000-000000000101", "Alice"),
    ("00000000-0000-0000-0000-000000000102", "Bob"),
    ("00000000-0000-0000-0000-000000000103", "Carol"),
];

const DEFAULT_OUTPUT: &str = "fixtures/demo.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let output = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT), PathBuf::from);

    println!("Building demo group...");
    let fixture = demo_group()?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    FixtureFile {
        groups: vec![fixture.clone()],
    }
    .write(&output)
    .await
    .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("  Wrote {}", output.display());

    println!("Issuing member tokens...");
    let jwt_config = match AppConfig::load() {
        Ok(config) => JwtConfig::from(&config.jwt),
        Err(e) => {
            eprintln!("  Configuration unavailable ({e}), using the default development secret");
            JwtConfig::default()
        }
    };
    let jwt = JwtService::new(jwt_config);
    for member in &fixture.members {
        let token = jwt.generate_access_token(member.user_id)?;
        println!("  {} ({}): {token}", member.display_name, member.user_id);
    }

    println!("Seeding complete! Group: {}", fixture.group_id);
    Ok(())
}

fn parse_id<T: From<Uuid>>(raw: &str) -> anyhow::Result<T> {
    Ok(T::from(Uuid::parse_str(raw)?))
}

/// Alice paid 90 for dinner split three ways, Carol paid 45 for a taxi split
/// three ways, and Bob has a pending payment to Alice that does not count yet.
fn demo_group() -> anyhow::Result<GroupFixture> {
    let group_id: GroupId = parse_id(DEMO_GROUP_ID)?;
    let members = DEMO_MEMBERS
        .iter()
        .map(|(id, name)| {
            Ok(GroupMember {
                group_id,
                user_id: parse_id(id)?,
                display_name: (*name).to_string(),
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let ids: Vec<UserId> = members.iter().map(|m| m.user_id).collect();
    let (alice, bob, carol) = (ids[0], ids[1], ids[2]);

    let even_expense = |paid_by: UserId, share: Decimal| {
        let id = ExpenseId::new();
        Expense {
            id,
            group_id,
            paid_by,
            splits: ids
                .iter()
                .map(|&user_id| ExpenseSplit {
                    expense_id: id,
                    user_id,
                    amount: share,
                })
                .collect(),
        }
    };

    Ok(GroupFixture {
        group_id,
        expenses: vec![
            even_expense(alice, Decimal::from(30)),
            even_expense(carol, Decimal::from(15)),
        ],
        settlements: vec![Settlement {
            id: SettlementId::new(),
            group_id,
            from_user_id: bob,
            to_user_id: alice,
            amount: Decimal::from(10),
            status: SettlementStatus::Pending,
            settled_at: Utc::now(),
        }],
        members,
    })
}
