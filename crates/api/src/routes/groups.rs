//! Group ledger routes: debts, balances, suggested settlements and settling.
//!
//! Amounts leave the service rounded to two decimal places.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{AppState, error::ApiError, middleware::AuthUser};
use splitledger_core::ledger::{
    DebtDetail, MemberBalances, NetBalanceKind, NetBalances, OptimalSettlements, PartyAmount,
    SettleCommand, Settlement, SettlementStatus,
};
use splitledger_shared::AppError;
use splitledger_shared::types::{GroupId, SettlementId, UserId, round_for_display};

/// Creates the group routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups/{group_id}/debts", get(get_debts))
        .route("/groups/{group_id}/member-balances", get(get_member_balances))
        .route("/groups/{group_id}/net-balances", get(get_net_balances))
        .route("/groups/{group_id}/optimal-settlements", get(get_optimal_settlements))
        .route("/groups/{group_id}/settle", post(settle))
}

fn group_id(path: Result<Path<GroupId>, PathRejection>) -> Result<GroupId, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::Validation(e.body_text()).into())
}

// ============================================================================
// Response types
// ============================================================================

/// An amount owed to or by one counterparty.
#[derive(Debug, Serialize)]
pub struct PartyAmountResponse {
    /// Counterparty ID.
    pub user_id: UserId,
    /// Counterparty display name.
    pub display_name: String,
    /// Amount.
    pub amount: Decimal,
}

impl From<PartyAmount> for PartyAmountResponse {
    fn from(p: PartyAmount) -> Self {
        Self {
            user_id: p.user_id,
            display_name: p.display_name,
            amount: round_for_display(p.amount),
        }
    }
}

/// Response for the viewer's gross debts and credits.
#[derive(Debug, Serialize)]
pub struct DebtDetailResponse {
    /// The viewing member.
    pub viewer_id: UserId,
    /// What the viewer owes.
    pub debts: Vec<PartyAmountResponse>,
    /// What others owe the viewer.
    pub credits: Vec<PartyAmountResponse>,
    /// Sum of debts.
    pub total_debt: Decimal,
    /// Sum of credits.
    pub total_credit: Decimal,
    /// Credits minus debts.
    pub net_balance: Decimal,
}

impl From<DebtDetail> for DebtDetailResponse {
    fn from(d: DebtDetail) -> Self {
        Self {
            viewer_id: d.viewer_id,
            debts: d.debts.into_iter().map(Into::into).collect(),
            credits: d.credits.into_iter().map(Into::into).collect(),
            total_debt: round_for_display(d.total_debt),
            total_credit: round_for_display(d.total_credit),
            net_balance: round_for_display(d.net_balance),
        }
    }
}

/// One member's balance.
#[derive(Debug, Serialize)]
pub struct MemberBalanceResponse {
    /// Member ID.
    pub user_id: UserId,
    /// Member display name.
    pub display_name: String,
    /// Owed minus owes.
    pub net_balance: Decimal,
    /// Total the member owes.
    pub owes: Decimal,
    /// Total the member is owed.
    pub owed: Decimal,
}

/// Response for every member's balance.
#[derive(Debug, Serialize)]
pub struct MemberBalancesResponse {
    /// One row per member.
    pub member_balances: Vec<MemberBalanceResponse>,
}

impl From<MemberBalances> for MemberBalancesResponse {
    fn from(b: MemberBalances) -> Self {
        Self {
            member_balances: b
                .member_balances
                .into_iter()
                .map(|m| MemberBalanceResponse {
                    user_id: m.user_id,
                    display_name: m.display_name,
                    net_balance: round_for_display(m.net_balance),
                    owes: round_for_display(m.owes),
                    owed: round_for_display(m.owed),
                })
                .collect(),
        }
    }
}

/// The viewer's netted position with one member.
#[derive(Debug, Serialize)]
pub struct NetBalanceResponse {
    /// Member ID.
    pub user_id: UserId,
    /// Member display name.
    pub display_name: String,
    /// Positive when the member owes the viewer.
    pub net_amount: Decimal,
    /// `owed` or `owes`, from the viewer's perspective.
    #[serde(rename = "type")]
    pub kind: NetBalanceKind,
}

/// Response for the viewer's netted positions.
#[derive(Debug, Serialize)]
pub struct NetBalancesResponse {
    /// The viewing member.
    pub viewer_id: UserId,
    /// Positions, largest first.
    pub net_balances: Vec<NetBalanceResponse>,
}

impl From<NetBalances> for NetBalancesResponse {
    fn from(n: NetBalances) -> Self {
        Self {
            viewer_id: n.viewer_id,
            net_balances: n
                .net_balances
                .into_iter()
                .map(|e| NetBalanceResponse {
                    user_id: e.user_id,
                    display_name: e.display_name,
                    net_amount: round_for_display(e.net_amount),
                    kind: e.kind,
                })
                .collect(),
        }
    }
}

/// A suggested payment.
#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    /// Paying member ID.
    pub from_user_id: UserId,
    /// Paying member display name.
    pub from_display_name: String,
    /// Receiving member ID.
    pub to_user_id: UserId,
    /// Receiving member display name.
    pub to_display_name: String,
    /// Amount to pay.
    pub amount: Decimal,
}

/// Response for the group's minimized settlement plan.
#[derive(Debug, Serialize)]
pub struct OptimalSettlementsResponse {
    /// Suggested payments.
    pub transactions: Vec<SuggestionResponse>,
    /// Number of suggested payments.
    pub total_transactions: usize,
    /// Sum of suggested amounts.
    pub total_amount: Decimal,
    /// Number of group members.
    pub member_count: usize,
    /// Upper bound on the number of payments.
    pub max_possible_transactions: usize,
}

impl From<OptimalSettlements> for OptimalSettlementsResponse {
    fn from(o: OptimalSettlements) -> Self {
        Self {
            transactions: o
                .transactions
                .into_iter()
                .map(|t| SuggestionResponse {
                    from_user_id: t.from_user_id,
                    from_display_name: t.from_display_name,
                    to_user_id: t.to_user_id,
                    to_display_name: t.to_display_name,
                    amount: round_for_display(t.amount),
                })
                .collect(),
            total_transactions: o.total_transactions,
            total_amount: round_for_display(o.total_amount),
            member_count: o.member_count,
            max_possible_transactions: o.max_possible_transactions,
        }
    }
}

/// Request body for recording a settlement.
#[derive(Debug, Deserialize)]
pub struct SettleRequest {
    /// The member being paid.
    pub to_user_id: UserId,
    /// Amount paid (decimal number or string).
    pub amount: Decimal,
}

/// A recorded settlement.
#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    /// Settlement ID.
    pub id: SettlementId,
    /// Group ID.
    pub group_id: GroupId,
    /// Paying member.
    pub from_user_id: UserId,
    /// Receiving member.
    pub to_user_id: UserId,
    /// Amount paid.
    pub amount: Decimal,
    /// Lifecycle status.
    pub status: SettlementStatus,
    /// When the settlement was recorded.
    pub settled_at: DateTime<Utc>,
}

impl From<Settlement> for SettlementResponse {
    fn from(s: Settlement) -> Self {
        Self {
            id: s.id,
            group_id: s.group_id,
            from_user_id: s.from_user_id,
            to_user_id: s.to_user_id,
            amount: round_for_display(s.amount),
            status: s.status,
            settled_at: s.settled_at,
        }
    }
}

/// Response for a recorded settlement.
#[derive(Debug, Serialize)]
pub struct SettleResponse {
    /// Confirmation message.
    pub message: &'static str,
    /// The recorded settlement.
    pub settlement: SettlementResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /groups/{group_id}/debts
async fn get_debts(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<GroupId>, PathRejection>,
) -> Result<Json<DebtDetailResponse>, ApiError> {
    let group_id = group_id(path)?;
    let detail = state.ledger.debt_detail(group_id, user.user_id()).await?;
    Ok(Json(detail.into()))
}

/// GET /groups/{group_id}/member-balances
async fn get_member_balances(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<GroupId>, PathRejection>,
) -> Result<Json<MemberBalancesResponse>, ApiError> {
    let group_id = group_id(path)?;
    let balances = state.ledger.member_balances(group_id, user.user_id()).await?;
    Ok(Json(balances.into()))
}

/// GET /groups/{group_id}/net-balances
async fn get_net_balances(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<GroupId>, PathRejection>,
) -> Result<Json<NetBalancesResponse>, ApiError> {
    let group_id = group_id(path)?;
    let nets = state.ledger.net_balances(group_id, user.user_id()).await?;
    Ok(Json(nets.into()))
}

/// GET /groups/{group_id}/optimal-settlements
async fn get_optimal_settlements(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<GroupId>, PathRejection>,
) -> Result<Json<OptimalSettlementsResponse>, ApiError> {
    let group_id = group_id(path)?;
    let plan = state
        .ledger
        .optimal_settlements(group_id, user.user_id())
        .await?;
    debug!(
        group_id = %group_id,
        transactions = plan.total_transactions,
        "Computed optimal settlements"
    );
    Ok(Json(plan.into()))
}

/// POST /groups/{group_id}/settle
async fn settle(
    State(state): State<AppState>,
    user: AuthUser,
    path: Result<Path<GroupId>, PathRejection>,
    body: Result<Json<SettleRequest>, JsonRejection>,
) -> Result<Json<SettleResponse>, ApiError> {
    let group_id = group_id(path)?;
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let settlement = state
        .ledger
        .settle(
            group_id,
            user.user_id(),
            SettleCommand {
                to_user_id: request.to_user_id,
                amount: request.amount,
            },
        )
        .await?;

    info!(
        group_id = %group_id,
        settlement_id = %settlement.id,
        from = %settlement.from_user_id,
        to = %settlement.to_user_id,
        amount = %settlement.amount,
        "Settlement recorded"
    );

    Ok(Json(SettleResponse {
        message: "Settlement completed successfully",
        settlement: settlement.into(),
    }))
}
