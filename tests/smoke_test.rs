//! End-to-end smoke test: on-disk store, create → win → growth, and
//! persistence across reopen.

mod common;

use std::sync::Arc;

use tangocrm_sdk::models::{NewOpportunity, Niche, PeriodType, Status, UpdateOpportunity};
use tangocrm_sdk::{FixedClock, TangoCrm};

#[test]
fn full_pipeline_flow_on_disk() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock(common::frozen_now()));

    let crm = TangoCrm::builder()
        .data_dir(tmp_dir.path())
        .clock(clock.clone())
        .build()
        .unwrap();
    assert!(crm.store().path().is_some());
    assert_eq!(crm.now(), common::frozen_now());

    // Create a freelancer deal mid-pipeline.
    let mut params = NewOpportunity::new("Website rebuild", Niche::Freelancer);
    params.stage = Some("quote-sent".to_string());
    params.value = Some(4000.0);
    params.user_timezone = Some("America/New_York".to_string());
    let write = crm.opportunities().create("user-1", &params).unwrap();
    assert_eq!(write.opportunity.status, Status::Proposal);

    // Win it with a close date inside the current month.
    let patch = UpdateOpportunity {
        stage: Some("contract-signed".to_string()),
        actual_close_date: Some("2026-03-14T09:00:00Z".to_string()),
        ..Default::default()
    };
    let won = crm
        .opportunities()
        .update("user-1", &write.opportunity.id, &patch)
        .unwrap();
    assert_eq!(won.opportunity.status, Status::Won);

    // Month-over-month growth sees it as new revenue.
    let growth = crm
        .revenue()
        .growth_rate("user-1", Niche::Freelancer, PeriodType::Month)
        .unwrap();
    assert_eq!(growth.current_period, 4000.0);
    assert_eq!(growth.growth_rate, 100.0);
    assert!(growth.message.contains("New revenue"));

    // Reopen the same data directory: the record survived.
    drop(crm);
    let reopened = TangoCrm::builder()
        .data_dir(tmp_dir.path())
        .clock(clock)
        .build()
        .unwrap();
    let fetched = reopened
        .opportunities()
        .get("user-1", &write.opportunity.id)
        .unwrap()
        .unwrap();
    assert_eq!(fetched.status, Status::Won);
    assert_eq!(fetched.value, 4000.0);
}
