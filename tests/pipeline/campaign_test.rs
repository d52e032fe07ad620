//! Request decoding and draft construction.

use serde_json::json;

use outreach::campaign::{CampaignRequest, EmailDraft};
use outreach::pipeline::PipelineError;

use super::stubs::campaign_json;

#[test]
fn decode_reads_all_camel_case_fields() {
    let body = campaign_json().to_string();
    let request = CampaignRequest::decode(body.as_bytes()).expect("should decode");
    assert_eq!(request.company_name, "Northwind Freight");
    assert_eq!(request.company_url, "https://northwind.example");
    assert_eq!(request.company_description, "regional logistics carrier");
    assert_eq!(request.receiver_name, "Dana");
    assert_eq!(request.success_stories, "Cut invoice handling time by 70% for a 3PL");
    assert_eq!(request.services_list, "document processing, voice agents");
    assert_eq!(request.vendor_description, "an AI automation consultancy");
    assert_eq!(request.sender_name, "Lee");
}

#[test]
fn decode_rejects_missing_sender_name() {
    let mut body = campaign_json();
    if let Some(map) = body.as_object_mut() {
        map.remove("senderName");
    }
    let result = CampaignRequest::decode(body.to_string().as_bytes());
    match result {
        Err(PipelineError::MalformedRequest(msg)) => assert!(msg.contains("senderName")),
        other => panic!("expected malformed request, got: {other:?}"),
    }
}

#[test]
fn decode_rejects_every_missing_field() {
    for field in [
        "companyName",
        "companyUrl",
        "companyDescription",
        "receiverName",
        "successStories",
        "servicesList",
        "vendorDescription",
        "senderName",
    ] {
        let mut body = campaign_json();
        if let Some(map) = body.as_object_mut() {
            map.remove(field);
        }
        let result = CampaignRequest::decode(body.to_string().as_bytes());
        assert!(
            matches!(result, Err(PipelineError::MalformedRequest(_))),
            "missing {field} should be rejected"
        );
    }
}

#[test]
fn decode_rejects_non_json_and_wrong_types() {
    assert!(matches!(
        CampaignRequest::decode(b"companyName=Acme"),
        Err(PipelineError::MalformedRequest(_))
    ));

    let mut body = campaign_json();
    body["receiverName"] = json!(42);
    assert!(matches!(
        CampaignRequest::decode(body.to_string().as_bytes()),
        Err(PipelineError::MalformedRequest(_))
    ));
}

#[test]
fn decode_ignores_unknown_fields() {
    let mut body = campaign_json();
    body["campaignId"] = json!("c-1");
    assert!(CampaignRequest::decode(body.to_string().as_bytes()).is_ok());
}

#[test]
fn draft_from_nothing_is_extraction_failure() {
    assert!(matches!(
        EmailDraft::from_extracted(None),
        Err(PipelineError::ExtractionFailure)
    ));
}

#[test]
fn draft_requires_both_string_fields() {
    let result = EmailDraft::from_extracted(Some(json!({"email_content": "body"})));
    assert!(matches!(result, Err(PipelineError::MissingField("email_subject"))));

    let extracted = json!({"email_subject": "s", "email_content": 7});
    let result = EmailDraft::from_extracted(Some(extracted));
    assert!(matches!(result, Err(PipelineError::MissingField("email_content"))));

    let result = EmailDraft::from_extracted(Some(json!(["email_content", "email_subject"])));
    assert!(matches!(result, Err(PipelineError::MissingField(_))));
}

#[test]
fn draft_keeps_extra_keys_out() {
    let draft = EmailDraft::from_extracted(Some(json!({
        "email_content": "Hi Dana",
        "email_subject": "Pallets",
        "notes": "ignored"
    })))
    .expect("should build");
    assert_eq!(
        serde_json::to_value(&draft).expect("should serialize"),
        json!({"email_content": "Hi Dana", "email_subject": "Pallets"})
    );
}
