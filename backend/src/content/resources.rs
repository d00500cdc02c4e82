//! Curated parent resources

use once_cell::sync::Lazy;
use serde::Serialize;

/// A hotline, article or organization parents can turn to
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    /// Resource id
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Link or phone number
    pub url: &'static str,
    /// Grouping label
    pub category: &'static str,
}

static RESOURCES: Lazy<Vec<Resource>> = Lazy::new(|| {
    vec![
        Resource {
            id: "r1",
            title: "National Child Abuse Hotline",
            description: "24/7 support for child abuse prevention and reporting",
            url: "1-800-422-4453",
            category: "Hotline",
        },
        Resource {
            id: "r2",
            title: "Talking to Kids About Body Safety",
            description: "Guide for parents on having age-appropriate conversations",
            url: "https://www.parenting.org/body-safety",
            category: "Article",
        },
        Resource {
            id: "r3",
            title: "Darkness to Light",
            description: "Organization dedicated to preventing child sexual abuse",
            url: "https://www.d2l.org",
            category: "Organization",
        },
        Resource {
            id: "r4",
            title: "RAINN - Rape, Abuse & Incest National Network",
            description: "Largest anti-sexual violence organization",
            url: "https://www.rainn.org",
            category: "Organization",
        },
        Resource {
            id: "r5",
            title: "Child Mind Institute",
            description: "Resources on child psychology and safety",
            url: "https://childmind.org",
            category: "Educational",
        },
        Resource {
            id: "r6",
            title: "Request Counseling Session",
            description: "Connect with licensed child safety counselors (Mock)",
            url: "/api/counseling/request",
            category: "Counseling",
        },
    ]
});

/// The resource catalog
pub fn resources() -> &'static [Resource] {
    &RESOURCES
}
