use std::collections::BTreeMap;

use crate::domain::TechnologyInfo;

struct Fingerprint {
    category: &'static str,
    name: &'static str,
    patterns: &'static [&'static str],
}

// Substring signals over the raw markup. Deliberately coarse: one hit is
// enough to list a product, and the output carries a low-confidence caveat
// downstream.
const FINGERPRINTS: [Fingerprint; 18] = [
    Fingerprint {
        category: "cms",
        name: "WordPress",
        patterns: &["wp-content", "wp-includes"],
    },
    Fingerprint {
        category: "cms",
        name: "Drupal",
        patterns: &["/sites/default/files", "drupal-settings-json"],
    },
    Fingerprint {
        category: "cms",
        name: "Squarespace",
        patterns: &["squarespace.com", "static1.squarespace"],
    },
    Fingerprint {
        category: "cms",
        name: "Wix",
        patterns: &["wixstatic.com", "wix-code"],
    },
    Fingerprint {
        category: "ecommerce",
        name: "Shopify",
        patterns: &["cdn.shopify.com", "shopify-section"],
    },
    Fingerprint {
        category: "ecommerce",
        name: "WooCommerce",
        patterns: &["woocommerce"],
    },
    Fingerprint {
        category: "ecommerce",
        name: "Magento",
        patterns: &["mage/cookies", "magento"],
    },
    Fingerprint {
        category: "analytics",
        name: "Google Analytics",
        patterns: &["google-analytics.com", "gtag("],
    },
    Fingerprint {
        category: "analytics",
        name: "Google Tag Manager",
        patterns: &["googletagmanager.com"],
    },
    Fingerprint {
        category: "analytics",
        name: "Hotjar",
        patterns: &["static.hotjar.com", "hotjar"],
    },
    Fingerprint {
        category: "analytics",
        name: "Segment",
        patterns: &["cdn.segment.com"],
    },
    Fingerprint {
        category: "javascript-frameworks",
        name: "React",
        patterns: &["data-reactroot", "react-dom"],
    },
    Fingerprint {
        category: "javascript-frameworks",
        name: "Next.js",
        patterns: &["__next_data__", "/_next/static"],
    },
    Fingerprint {
        category: "javascript-frameworks",
        name: "Vue.js",
        patterns: &["data-v-app", "vue.runtime"],
    },
    Fingerprint {
        category: "javascript-frameworks",
        name: "Angular",
        patterns: &["ng-version"],
    },
    Fingerprint {
        category: "widgets",
        name: "Intercom",
        patterns: &["widget.intercom.io", "intercomsettings"],
    },
    Fingerprint {
        category: "widgets",
        name: "HubSpot",
        patterns: &["js.hs-scripts.com", "hubspot"],
    },
    Fingerprint {
        category: "payment",
        name: "Stripe",
        patterns: &["js.stripe.com"],
    },
];

/// Best-effort technology fingerprint from already-fetched markup. Never
/// fails; an empty page yields an error message inside the record.
pub fn guess_technologies(html: &str) -> TechnologyInfo {
    if html.trim().is_empty() {
        return TechnologyInfo {
            guessed_technologies: None,
            error_message: Some("no HTML available for technology analysis".to_string()),
        };
    }

    let lowered = html.to_lowercase();
    let mut guessed: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for fingerprint in FINGERPRINTS.iter() {
        if fingerprint
            .patterns
            .iter()
            .any(|pattern| lowered.contains(pattern))
        {
            guessed
                .entry(fingerprint.category.to_string())
                .or_default()
                .push(fingerprint.name.to_string());
        }
    }

    log::info!(
        "Technology guess found {} categories",
        guessed.len()
    );

    TechnologyInfo {
        guessed_technologies: if guessed.is_empty() {
            None
        } else {
            Some(guessed)
        },
        error_message: None,
    }
}
