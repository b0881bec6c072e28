//! Website section catalog used to seed image descriptions.
//!
//! Contextual sections pick one of several generic descriptions of the
//! trade; literal sections embed the seed text (a business or person name).
//! Anything else falls back to turning the seed into a stock image prompt.
use rand::seq::SliceRandom;

pub const SECTIONS: &[&str] = &[
    "aboutUsSection",
    "ctaSection",
    "faqsSection",
    "footerSection",
    "guaranteeSection",
    "headerSection",
    "heroSection",
    "highlightedFeaturesSection",
    "highlightedServicesSection",
    "ourTeamSection",
    "ourWorkSection",
    "ourProcessSection",
    "qualificationsSection",
    "requestQuoteSection",
    "serviceAreaSection",
    "testimonialsSection",
    "tradeCategoriesSection",
];

pub const DEFAULT_TEMPLATE: &str = "Turn this text '{seed_text}' into an stock image description that will be used as an asset for a {profession} trade professional website. Only return the generated description.";

const LOGO: &str = "Return a logo description for a {profession} trade professional business named {seed_text}. Only return the generated description.";
const HEADSHOT: &str = "Return a stock image description of a professional photography headshot of a person named {seed_text}. Only return the generated description.";
const DELIVERY: &str = "Return a stock image description of a {profession} trade professional delivering a finished project to a client. Only return the generated description.";

pub fn contextual_templates(section: &str) -> Option<&'static [&'static str]> {
    let templates: &'static [&'static str] = match section {
        "aboutUsSection" => &[
            "Return a stock image description of a {profession} trade professional working on a common task of their profession. Only return the generated description.",
            "Return a stock image description of a {profession} trade professional's completed project. Only return the generated description.",
        ],
        "guaranteeSection" => &[
            "Return the name of a material commonly used by {profession} trade professionals. Only return the generated material",
            "Return the name of a tool commonly used by {profession} trade professionals. Only return the generated tool",
        ],
        "faqsSection" => &[
            "Return a stock image description of a {profession} trade professional engaging in a discussion with a client. Only return the generated description.",
            "Return a stock image description of a {profession} trade professional demonstrating the functionality of a project to a client. Only return the generated description.",
        ],
        "heroSection" => &[
            "Return a stock image description of a {profession} trade professional in action. Only return the generated image description.",
            "Return a stock image description of a {profession} trade professional striking a pose. Only return the generated image description.",
        ],
        "highlightedFeaturesSection" => &[DELIVERY],
        _ => return None,
    };
    Some(templates)
}

pub fn literal_templates(section: &str) -> Option<&'static [&'static str]> {
    let templates: &'static [&'static str] = match section {
        "headerSection" | "footerSection" => &[LOGO],
        "ourTeamSection" | "testimonialsSection" => &[HEADSHOT],
        _ => return None,
    };
    Some(templates)
}

pub fn is_known_section(section: &str) -> bool {
    SECTIONS.contains(&section)
}

/// Choose the description template for `section`, at random when the
/// section has several.
pub fn pick_template(section: &str) -> &'static str {
    contextual_templates(section)
        .or_else(|| literal_templates(section))
        .and_then(|templates| templates.choose(&mut rand::thread_rng()).copied())
        .unwrap_or(DEFAULT_TEMPLATE)
}
