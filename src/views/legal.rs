use askama::Template;
use axum::response::{Html, IntoResponse};

pub struct LegalSection {
    pub heading: &'static str,
    pub paragraphs: &'static [&'static str],
}

/// A static legal page; all of them share `legal.html`.
pub struct LegalDocument {
    pub title: &'static str,
    pub updated: &'static str,
    pub intro: &'static str,
    pub sections: &'static [LegalSection],
}

#[derive(Template)]
#[template(path = "legal.html")]
struct LegalTemplate {
    doc: &'static LegalDocument,
}

pub static PRIVACY: LegalDocument = LegalDocument {
    title: "Privacy Policy",
    updated: "2026-01-01",
    intro: "This policy explains what personal data we collect when you visit our website or become a member, and how we use it.",
    sections: &[
        LegalSection {
            heading: "Data we collect",
            paragraphs: &[
                "Contact details you give us when signing up or asking about a membership: name, email address and phone number.",
                "Membership and payment records needed to provide our services.",
            ],
        },
        LegalSection {
            heading: "How we use it",
            paragraphs: &[
                "To manage your membership, answer your questions and send service messages such as password reset emails.",
                "We never sell your data to third parties.",
            ],
        },
        LegalSection {
            heading: "Your rights",
            paragraphs: &[
                "You may request access to, correction of or deletion of your personal data at any time by contacting us.",
            ],
        },
    ],
};

pub static TERMS: LegalDocument = LegalDocument {
    title: "Terms & Conditions",
    updated: "2026-01-01",
    intro: "These terms govern the use of our facilities, memberships and this website.",
    sections: &[
        LegalSection {
            heading: "Memberships",
            paragraphs: &[
                "Memberships are personal and non-transferable. Plan prices and inclusions are those published at the time of purchase.",
                "Monthly plans renew automatically until cancelled in writing.",
            ],
        },
        LegalSection {
            heading: "Use of the facilities",
            paragraphs: &[
                "Members must follow staff instructions and the posted safety rules. Equipment must be returned after use.",
            ],
        },
        LegalSection {
            heading: "Liability",
            paragraphs: &[
                "Training carries inherent risk. Consult a physician before starting any exercise program.",
            ],
        },
    ],
};

fn render(doc: &'static LegalDocument) -> impl IntoResponse {
    Html(LegalTemplate { doc }.render().unwrap_or_default())
}

pub async fn privacy() -> impl IntoResponse {
    render(&PRIVACY)
}

pub async fn terms() -> impl IntoResponse {
    render(&TERMS)
}
