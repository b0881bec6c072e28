//! Fixed prompts and inputs used by the demo scenarios.

pub const STOCK_DESCRIPTION: &str = "Turn this text {seed_text} into an stock image description that will be used as an asset for a {profession} trade professional website. Only return the generated description";
pub const CHAINS_SEED: &str = "A man working on a roof";
pub const CHAINS_PROFESSION: &str = "Electrician";
pub const CHAINS_DISALLOWED: &[&str] = &["electrician", "roof", "helmet"];

pub const SECTION_CONTENT: &str =
    "Generate text content for a section '{section}' in a trade professional {profession}'s website";
pub const STREAM_INPUT: (&str, &str) = ("About", "plumber");
pub const BATCH_INPUTS: &[(&str, &str)] = &[("About", "electrician"), ("Contact", "electrician")];

pub const DOCS_PROMPT: &str = "Answer the following question based only on the provided context:

<context>
{context}
</context>

Question: {input}";

pub const DOCS_QUESTIONS: &[&str] = &[
    "Generate a text that could be put in a 'About' section for a website for that business",
    "Generate a text that could be put in a 'Projects' section for a website for that business",
];

pub const CALL_SCRIPT: &str = "Agent: Good morning/afternoon, may I speak with John Doe?
Client: Speaking, how can I help you?
Agent: Hi John, this is Tony Trades calling from trade.org. I hope you're doing well today.
Client: Yes, thank you. What is this regarding?
Agent: I'm reaching out because we offer a specialized website platform for trade professionals like yourself, and I'd like to learn more about your business to see if our services would be a good fit for you. Do you have a few minutes to chat?
Client: Sure, go ahead.
Agent: Great, thank you. To start, could you tell me a bit about your business? What's the name of your company and what type of services do you provide?
Client: Of course. My company is called J&D Plumbing Co, and we specialize in residential and commercial plumbing services.
Agent: Excellent, thank you. And how long have you been in business?
Client: We've been operating for 7 years.
Agent: That's impressive. Could you tell me about some of the projects your company has completed recently?
Client: Sure, we've recently completed projects such as bathroom remodels, pipe installations, and water heater replacements.
Agent: Thank you. How many staff members do you currently have?
Client: We have a team of 10 staff members, including licensed technicians and administrative staff.
Agent: Got it. And do you hold any specific certifications or memberships related to your industry?
Client: Yes, we're certified in plumbing licenses, safety certifications, and various plumbing techniques.
Agent: Perfect. Lastly, could you tell me a bit about your goals or challenges in terms of online presence or marketing for your business?
Client: Well, we're always looking to expand our customer base and increase our visibility online.
Agent: I see. Our platform offers features that can help with that, such as online booking, portfolio showcase, and customer review management. Based on what you've shared, I think our services could be beneficial for your business. Would you be interested in scheduling a demo to see how our platform works?
Client: Yes, that sounds interesting. Can you provide more details about the demo?
Agent: Absolutely, I can walk you through our platform and demonstrate how it can streamline your online presence and help grow your business. How does Thursday at 10am sound for you?
Client: That works for me.
Agent: Perfect, I'll send you a calendar invite with all the details. Thank you for your time, John. I look forward to speaking with you again during the demo.
Client: Thank you, looking forward to it as well. Goodbye.
Agent: Goodbye, have a great day.";

pub const JSON_PROMPT: &str = r#"Output a list of the professions roofer, welder and gardener and a list of common projects they work on in JSON format.
Use a dict with an outer key of "professions_projects" which contains a list of professions.
Each profession should have the key "profession" and "projects""#;

pub const EVENTS_INPUT: &str = "hello";

pub const MEMORY_SYSTEM: &str = "You are a helpful assistant that returns different variations of a specific color";
pub const MEMORY_INPUTS: &[&str] = &["Do color blue", "What is the main color?"];

pub const COMPOSED_FINAL: &str = "{introduction}
{example}
{start}";
pub const COMPOSED_INTRODUCTION: &str =
    "You generate descriptions for stock images for trades professional {profession}'s websites from seeds of text";
pub const COMPOSED_EXAMPLE: &str = "Here's an example of a seed and the generated stock image description:
Seed: {example_seed}
Description: {example_desc}";
pub const COMPOSED_START: &str = "Now, generate a description for this seed
Seed: {input}
Description:";
pub const COMPOSED_INPUTS: &[(&str, &str)] = &[
    ("profession", "Carpenter"),
    ("example_seed", "Building fences"),
    ("example_desc", "A carpenter building a fence in a sunny day, color green predominates"),
    ("input", "Building kitchen cabinets"),
];

pub const DEFAULT_IMAGE_PROFESSION: &str = "mason";
pub const DEFAULT_IMAGE_SECTION: &str = "headerSection";
