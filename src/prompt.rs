//! Cold-email prompt template.
//!
//! The template text is the contract with the generation model: the
//! extractor downstream assumes the model mostly honours the closing
//! "JSON only" instruction.

use std::fmt;

use crate::campaign::CampaignRequest;

/// Instruction appended after the template body.
pub const JSON_ONLY_INSTRUCTION: &str =
    "Return only a valid JSON object as requested. Do not add anything else.";

/// Free-text company analysis returned by the research API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchResult(String);

impl ResearchResult {
    /// Wrap research text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The research text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A fully rendered prompt. Only [`render`] builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt(String);

impl RenderedPrompt {
    /// The prompt text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render the cold-email prompt for one prospect.
///
/// Values are interpolated verbatim; nothing is escaped or truncated.
pub fn render(request: &CampaignRequest, research: &ResearchResult) -> RenderedPrompt {
    let CampaignRequest {
        company_name,
        company_url,
        company_description,
        receiver_name,
        success_stories,
        services_list,
        vendor_description,
        sender_name,
    } = request;
    let company_info = research.as_str();

    let body = format!(
        r#"
You are a cold email copywriter specialized in B2B personalization using the "Show Me You Know Me" method by Sam McKenna.
Based on the structured research data below (from Perplexity), write a highly personalized and relevant cold email that follows this exact structure:

Important: 75% of emails are read using a phone

Email Subject: Specific, personal, relevant only to this person. No generic hooks. Must feel personal and unique. Use a detail that could trigger interest in the prospect.

Important: The content of the email must be composed by:

    ### First sentence / preview text (Start with direct reference to a human detail from the data. Show empathy and familiarity and ask whether they have some ideas to improve their process but don't know where to start) ###

    ### Value proposition (Clearly state a relevant problem you can solve for this person's role, company or industry.
    # Cross check the pain points for similarities between the data from Perplexity and the pain points below.
    # Determine how you can solve it by using the most relatable and appropriate solution.
    # Still list and show the other solutions too for reference.
    # Here are our solutions with short descriptions and related pain point
    #
    Our Solutions we Offer:
    - Intelligent document processing: Process any incoming document with less than 0.01 USD per page and high accuracy (>90%)
    - AI Voice Agents for customer support, appointment scheduling (at 0.01/2 USD per minute)
    - AI Chatbots: Smart chat with knowledge of your data!
    - Digital transformation: Automate and optimize business processes with AI-driven solutions (Power Automate, RPA, Model Driven Apps)
    - Process Automation: Streamline workflows and reduce manual tasks with AI.
    - Knowledge Management: Create knowledge bases to chat with more than 20k documents about technical documentation of products and projects.
    For all solutions, we offer a free demonstration and consultation to analyze your processes or needs and propose a solution.
    Then anticipate and handle the most likely objection.
    ###

    ### Closing: Be polite. Do not insert a calendar link. Use this sentence instead:
    "Would you have time in the next few days for a short call?"
    Use a human, conversational tone. Use the industry terminology. Do not write like a marketing bot. Your only goal is to get a reply. Do not insert asterisks or other markdown formatting.


These are the prospect data:
    ### Company Name: {company_name}

    ### Company Website: {company_url}

    ### Company Description
    {company_description}

    ### Company data and analysis
    {company_info}.

    ### Receiver Name
    {receiver_name}

    ### About Us
    {vendor_description}

    ### Our Services/Products
    {services_list}

    ### Success Stories
    {success_stories}


Your job is to create a short form cold email using the company analysis (focusing on pain points) for the CEO of the company using the details and specific information making the email more personalized for the CEO.
Example output:

    Hi [RECEIVER_NAME],

    [HOOK SHORT SENTENCE]

    [DESCRIPTION_OF_COMPANY_SPECIFIC_PROBLEMS (1 max 2)]

    [DESCRIPTION OF POSSIBLE SOLUTIONS BASED ON OUR SERVICES]

    [REFERENCE TO PREVIOUS SUCCESS STORIES]

    [CALL TO ACTION TO BOOK CALL]

    Best regards {sender_name}.
### Example output:

    {{
        "email_content": "content of the email",
        "email_subject": "subject"
    }}
"#
    );

    RenderedPrompt(format!("{body}. {JSON_ONLY_INSTRUCTION}"))
}
