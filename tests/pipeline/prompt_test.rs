//! Prompt template content contract.

use outreach::prompt::{render, ResearchResult, JSON_ONLY_INSTRUCTION};

use super::stubs::campaign;

#[test]
fn prompt_contains_every_value_verbatim() {
    let request = campaign();
    let research =
        ResearchResult::new("Northwind runs 40 depots & struggles with <paper> PODs \"daily\".");
    let prompt = render(&request, &research);
    let text = prompt.as_str();

    for value in [
        &request.company_name,
        &request.company_url,
        &request.company_description,
        &request.receiver_name,
        &request.success_stories,
        &request.services_list,
        &request.vendor_description,
        &request.sender_name,
    ] {
        assert!(text.contains(value.as_str()), "prompt should contain {value:?}");
    }
    assert!(text.contains(research.as_str()));
}

#[test]
fn prompt_ends_with_json_only_instruction() {
    let prompt = render(&campaign(), &ResearchResult::new("r"));
    assert!(prompt.as_str().ends_with(JSON_ONLY_INSTRUCTION));
    assert!(prompt
        .as_str()
        .ends_with("Return only a valid JSON object as requested. Do not add anything else."));
}

#[test]
fn prompt_lists_solution_catalog() {
    let prompt = render(&campaign(), &ResearchResult::new("r"));
    let text = prompt.as_str();
    for solution in [
        "Intelligent document processing:",
        "AI Voice Agents",
        "AI Chatbots:",
        "Digital transformation:",
        "Process Automation:",
        "Knowledge Management:",
    ] {
        assert!(text.contains(solution), "catalog should list {solution}");
    }
}

#[test]
fn prompt_states_framing_and_style_constraints() {
    let prompt = render(&campaign(), &ResearchResult::new("r"));
    let text = prompt.as_str();
    assert!(text.contains("Show Me You Know Me"));
    assert!(text.contains("75% of emails are read using a phone"));
    assert!(text.contains("Do not insert a calendar link"));
    assert!(text.contains("Do not insert asterisks or other markdown formatting"));
    assert!(text.contains("anticipate and handle the most likely objection"));
    assert!(text.contains("\"email_content\""));
    assert!(text.contains("\"email_subject\""));
}

#[test]
fn long_values_are_not_truncated() {
    let research = ResearchResult::new("pain point ".repeat(2_000));
    let prompt = render(&campaign(), &research);
    assert!(prompt.as_str().contains(research.as_str()));
}
