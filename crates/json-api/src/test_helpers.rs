//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use gatehouse_app::{
    context::AppContext,
    domain::{
        accounts::{
            MockAccountsService,
            records::{AccountRecord, AccountRole, AccountUuid},
        },
        visitors::{
            MockVisitorsService,
            records::{
                TokenUsage, VisitType, VisitorEntryRecord, VisitorEntryUuid, VisitorTokenRecord,
                VisitorTokenUuid,
            },
            secret::VisitorSecret,
        },
    },
};

use crate::state::State;

pub(crate) const TEST_SECRET: &str = "VT-ABCDEFGHJK";

pub(crate) fn make_account(role: AccountRole) -> AccountRecord {
    AccountRecord {
        uuid: AccountUuid::new(),
        name: match role {
            AccountRole::Resident => "Flat 4B".to_string(),
            AccountRole::Guard => "North Gate".to_string(),
        },
        role,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_token(resident: &AccountRecord) -> VisitorTokenRecord {
    let secret = VisitorSecret::from_presented(TEST_SECRET);

    VisitorTokenRecord {
        uuid: VisitorTokenUuid::new(),
        resident: resident.summary(),
        token_hash: secret.hash(),
        issued_for_name: "Ada Obi".to_string(),
        issued_for_phone: Some("+2348012345678".to_string()),
        visit_type: VisitType::Short,
        duration: 2,
        note: None,
        expires_at: Timestamp::UNIX_EPOCH,
        usage: TokenUsage::Unused {
            temp_token: Some(secret),
        },
        created_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_entry(token: &VisitorTokenRecord, guard: &AccountRecord) -> VisitorEntryRecord {
    VisitorEntryRecord {
        uuid: VisitorEntryUuid::new(),
        token_uuid: token.uuid,
        visitor_name: token.issued_for_name.clone(),
        visitor_phone: token.issued_for_phone.clone(),
        entered_at: Timestamp::UNIX_EPOCH,
        exit: None,
        guard: guard.summary(),
        gate_id: None,
        note: None,
    }
}

fn strict_accounts_mock() -> MockAccountsService {
    let mut accounts = MockAccountsService::new();

    accounts.expect_authenticate_bearer().never();

    accounts
}

fn strict_visitors_mock() -> MockVisitorsService {
    let mut visitors = MockVisitorsService::new();

    visitors.expect_issue_token().never();
    visitors.expect_verify_token().never();
    visitors.expect_grant_entry().never();
    visitors.expect_record_exit().never();
    visitors.expect_checkout_by_token().never();
    visitors.expect_list_tokens().never();
    visitors.expect_get_token().never();
    visitors.expect_list_active_entries().never();

    visitors
}

pub(crate) fn make_state(
    accounts: MockAccountsService,
    visitors: MockVisitorsService,
) -> Arc<State> {
    State::from_app_context(AppContext {
        accounts: Arc::new(accounts),
        visitors: Arc::new(visitors),
    })
}

pub(crate) fn state_with_accounts(accounts: MockAccountsService) -> Arc<State> {
    make_state(accounts, strict_visitors_mock())
}

pub(crate) fn state_with_visitors(visitors: MockVisitorsService) -> Arc<State> {
    make_state(strict_accounts_mock(), visitors)
}

pub(crate) fn visitors_service(
    visitors: MockVisitorsService,
    caller: &AccountRecord,
    route: Router,
) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_visitors(visitors)))
            .hoop(inject(caller.clone()))
            .push(route),
    )
}
