//! Test Helpers

use jiff::Timestamp;

use crate::{
    domain::visitors::{
        IssuedVisitorToken, VisitorsService, VisitorsServiceError,
        data::{EntryGrant, NewVisitorToken},
        records::VisitType,
    },
    test::TestContext,
};

pub(crate) fn at(value: &str) -> Result<Timestamp, jiff::Error> {
    value.parse()
}

pub(crate) fn new_token(ctx: &TestContext) -> NewVisitorToken {
    NewVisitorToken {
        resident: ctx.resident.uuid,
        visitor_name: "Ada Obi".to_string(),
        visitor_phone: Some("+2348012345678".to_string()),
        visit_type: VisitType::Short,
        duration: 2,
        note: None,
    }
}

pub(crate) fn grant_for(ctx: &TestContext) -> EntryGrant {
    EntryGrant {
        guard: ctx.guard.uuid,
        visitor_name: None,
        visitor_phone: None,
        gate_id: None,
        note: None,
    }
}

pub(crate) async fn issue_short(
    ctx: &TestContext,
    hours: u32,
    now: Timestamp,
) -> Result<IssuedVisitorToken, VisitorsServiceError> {
    ctx.visitors
        .issue_token(
            NewVisitorToken {
                duration: hours,
                ..new_token(ctx)
            },
            now,
        )
        .await
}
