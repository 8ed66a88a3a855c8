//! Client CRUD integration tests and counterparty-name resolution.

mod common;

use tangocrm_sdk::models::{ClientStatus, CustomFields, NewClient, Niche};
use tangocrm_sdk::TangoCrmError;

const USER: &str = "user-1";

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[test]
fn create_defaults_to_lead() {
    let crm = common::setup_crm();
    let client = crm
        .clients()
        .create(USER, &NewClient::new("Acme Media", Niche::Creator))
        .unwrap();

    assert_eq!(client.status, ClientStatus::Lead);
    assert_eq!(client.niche, Niche::Creator);
    assert_eq!(client.created_at, common::frozen_now());

    let fetched = crm.clients().get(USER, &client.id).unwrap().unwrap();
    assert_eq!(fetched.name, "Acme Media");
}

#[test]
fn create_rejects_blank_names() {
    let crm = common::setup_crm();
    let err = crm
        .clients()
        .create(USER, &NewClient::new("  ", Niche::Creator))
        .unwrap_err();
    assert!(matches!(err, TangoCrmError::InvalidArgument(_)));
}

#[test]
fn get_by_name_is_scoped_to_owner_and_niche() {
    let crm = common::setup_crm();
    crm.clients()
        .create(USER, &NewClient::new("Globex", Niche::Freelancer))
        .unwrap();

    assert!(crm
        .clients()
        .get_by_name(USER, Niche::Freelancer, "Globex")
        .unwrap()
        .is_some());
    assert!(crm
        .clients()
        .get_by_name(USER, Niche::Coach, "Globex")
        .unwrap()
        .is_none());
    assert!(crm
        .clients()
        .get_by_name("user-2", Niche::Freelancer, "Globex")
        .unwrap()
        .is_none());
}

#[test]
fn list_filters_by_niche() {
    let crm = common::setup_crm();
    crm.clients()
        .create(USER, &NewClient::new("Acme", Niche::Creator))
        .unwrap();
    crm.clients()
        .create(USER, &NewClient::new("Initech", Niche::Coach))
        .unwrap();

    assert_eq!(crm.clients().list(USER, None).unwrap().len(), 2);
    let coaches = crm.clients().list(USER, Some(Niche::Coach)).unwrap();
    assert_eq!(coaches.len(), 1);
    assert_eq!(coaches[0].name, "Initech");
}

#[test]
fn set_status_and_delete() {
    let crm = common::setup_crm();
    let client = crm
        .clients()
        .create(USER, &NewClient::new("Hooli", Niche::Podcaster))
        .unwrap();

    crm.clients()
        .set_status(USER, &client.id, ClientStatus::Client)
        .unwrap();
    let updated = crm.clients().get(USER, &client.id).unwrap().unwrap();
    assert_eq!(updated.status, ClientStatus::Client);

    crm.clients().delete(USER, &client.id).unwrap();
    assert!(crm.clients().get(USER, &client.id).unwrap().is_none());

    let err = crm
        .clients()
        .set_status(USER, &client.id, ClientStatus::Lead)
        .unwrap_err();
    assert!(matches!(err, TangoCrmError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Counterparty-name resolution
// ---------------------------------------------------------------------------

#[test]
fn counterparty_resolution_order_per_niche() {
    let mut fields = CustomFields::default();
    fields.set(CustomFields::CONTACT_NAME, "Contact");
    fields.set(CustomFields::BRAND_NAME, "Brand");
    fields.set(CustomFields::COMPANY_NAME, "Company");
    fields.set(CustomFields::GUEST_OR_SPONSOR_NAME, "Guest");
    fields.set(CustomFields::CLIENT_NAME, "Client");

    assert_eq!(fields.counterparty_name(Niche::Podcaster), Some("Guest"));
    assert_eq!(fields.counterparty_name(Niche::Creator), Some("Brand"));
    assert_eq!(fields.counterparty_name(Niche::Coach), Some("Client"));
    assert_eq!(fields.counterparty_name(Niche::Freelancer), Some("Client"));

    assert_eq!(fields.contact_name(), Some("Contact"));
    assert_eq!(fields.brand_name(), Some("Brand"));
    assert_eq!(fields.company_name(), Some("Company"));
    assert_eq!(fields.guest_or_sponsor_name(), Some("Guest"));
    assert_eq!(fields.client_name(), Some("Client"));
}

#[test]
fn resolution_falls_through_blank_and_missing_fields() {
    let mut fields = CustomFields::default();
    assert_eq!(fields.counterparty_name(Niche::Podcaster), None);
    assert!(fields.is_empty());

    fields.set(CustomFields::GUEST_OR_SPONSOR_NAME, "   ");
    fields.set(CustomFields::BRAND_NAME, "Acme");
    // Blank strings do not resolve; the next field in the order wins.
    assert_eq!(fields.counterparty_name(Niche::Podcaster), Some("Acme"));
}
