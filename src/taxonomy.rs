//! Closed taxonomies the classifiers must answer from.
//!
//! Responses are matched case-insensitively and mapped back onto the canonical
//! label; anything outside the tree falls back to `other` / `General`.

pub const OTHER_CATEGORY: &str = "other";
pub const GENERAL: &str = "General";

pub const CONVERSATION_STATELESSNESS: &str = "Conversation Statelessness";
pub const CONTEXTUAL_AWARENESS_FAILURE: &str = "Contextual Awareness Failure";

pub struct CategoryNode {
    pub name: &'static str,
    pub sub_categories: &'static [&'static str],
}

pub const CATEGORY_TREE: &[CategoryNode] = &[
    CategoryNode {
        name: "Accounts",
        sub_categories: &[
            "HSBC One",
            "HSBC Premier",
            "HSBC Advance",
            "HSBC Jade",
            "PayMe from HSBC",
            "Savings accounts",
            "Current accounts",
            "Time deposits",
            "Foreign currency accounts",
            "Joint accounts",
            "Children's accounts",
            "Student accounts",
            "Fees and charges",
            "Greater Bay Area Services",
            "HSBC GBA Wealth Management Connect",
        ],
    },
    CategoryNode {
        name: "Ways to bank",
        sub_categories: &[
            "Branch Banking",
            "Online Banking",
            "Chat with us",
            "HSBC Mobile Apps",
            "HSBC HK Mobile Banking app",
            "Mobile account opening",
            "HSBC HK Mobile Banking App - Lite Mode",
            "Mobile Cash Withdrawal",
            "Mobile cheque deposit",
            "Phone banking",
            "30-Day Service Pledge",
        ],
    },
    CategoryNode {
        name: "HSBC credit cards",
        sub_categories: &[
            "Compare credit cards",
            "eStatements",
            "HSBC EveryMile Credit Card",
            "HSBC Premier Mastercard®",
            "HSBC Red Credit Card",
            "HSBC Visa Gold Card for Students",
            "HSBC Pulse UnionPay Dual Currency Diamond Credit Card",
            "HSBC UnionPay Dual Currency Credit Card",
            "HSBC Visa Gold Card",
            "HSBC easy Credit Card / Visa Platinum Credit Card",
            "HSBC Visa Signature Card",
            "HSBC Reward+ Mobile App",
            "Credit Cards Application",
            "Cash Credit Plan",
            "Cash Instalment Plan",
            "Mobile payment and Octopus add value services",
            "Red Hot Rewards",
            "RewardCash Certificate Scheme",
            "Rewards of Your Choice",
            "Miles and travel privileges",
            "Instant RewardCash redemption at merchants",
            "Using your credit card",
            "Credit card limit transfer",
            "Fees and charges",
        ],
    },
    CategoryNode {
        name: "Loans",
        sub_categories: &[
            "Personal Instalment Loan",
            "Personal Tax Loan",
            "Balance Consolidation Program",
            "Personal Instalment Loan Redraw",
            "Revolving Credit Facility",
            "Electric Vehicle Personal Instalment Loan",
            "Fees and charges",
        ],
    },
    CategoryNode {
        name: "Investments",
        sub_categories: &[
            "Open an Investment Account",
            "Stocks",
            "Unit Trusts",
            "Bonds / Certificates of Deposit (CDs)",
            "Structured products",
            "Foreign exchange",
            "Exchange rate calculator",
            "ESG investing",
            "HSBC Investment platform guide",
            "Gold trading",
            "Wealth Insights",
            "Wealth financing",
            "Fees and charges",
            "Top Trade Club",
            "Trade25",
        ],
    },
    CategoryNode {
        name: "Insurance",
        sub_categories: &[
            "About HSBC Life",
            "HSBC Life Benefits+",
            "Life Insurance",
            "AccidentSurance",
            "Motor insurance",
            "TravelSurance",
            "Home and domestic helper insurance",
            "Medical and critical illness insurance",
            "Savings insurance and retirement plans",
            "Investment Performance",
            "Well+ (Well Plus)",
            "Making a claim and getting assistance",
        ],
    },
    CategoryNode {
        name: "Help and support",
        sub_categories: &[
            "About our website",
            "Important notices",
            "Dealing with Bereavement",
            "Credit card support",
            "Contact Us",
            "Cyber security and fraud hub",
            "Frequently asked questions",
            "Forms and Documents Download",
            "Banking support for customers with health issues",
            "Money worries",
            "How a separation could affect your finances",
            "Accessibility",
            "Hyperlink policy",
            "Maintenance schedule",
            "Privacy and security",
            "Regulatory disclosures",
            "Terms of use",
        ],
    },
    CategoryNode {
        name: "International services",
        sub_categories: &[
            "How to open an overseas account",
            "How to open a Hong Kong account",
            "International mortgages",
            "Investing in Hong Kong",
            "Living in Hong Kong",
        ],
    },
    CategoryNode {
        name: "Mortgages",
        sub_categories: &[
            "Home Ownership Scheme",
            "Tenants Purchase Scheme",
            "Deposit-linked Mortgage",
            "Green Mortgage",
            "HighAdvance Mortgage",
            "Investor Mortgage",
            "HIBOR based Mortgage",
            "Property valuation tool",
        ],
    },
    CategoryNode {
        name: "Payments and transfers",
        sub_categories: &[
            "Faster Payment System (FPS)",
            "Local transfers",
            "Global payments",
            "Pay abroad with FPS",
            "Bill Payments",
            "autoPay",
            "Daily payment and transfer limits",
        ],
    },
    CategoryNode {
        name: "Community Banking",
        sub_categories: &[
            "Accessibility for people with disabilities",
            "Age-friendly Banking",
            "Banking with mental health struggles and financial stress",
            "Banking services for minority groups",
            "Our impact",
        ],
    },
    CategoryNode {
        name: "MPF",
        sub_categories: &[
            "MPF Academy",
            "HSBC MPF Awards",
            "Forms and documents",
            "Glossary",
            "MPF management fees",
            "MPF news",
            "MPF for members",
            "MPF for employers",
            "MPF constituent fund information",
            "MPF Personal Accounts",
            "MPF for the self-employed",
            "Tax Deductible Voluntary Contributions account",
            "HSBC Retirement Monitor",
            "Designated branches with MPF services",
            "Cumulative Performance",
            "Retirement planner",
            "Understanding MPF",
            "Useful links",
            "Fees and charges",
        ],
    },
];

pub struct FailureGroup {
    pub name: &'static str,
    pub labels: &'static [(&'static str, &'static str)],
}

pub const FAILURE_TAXONOMY: &[FailureGroup] = &[
    FailureGroup {
        name: "Core Problem Categories",
        labels: &[
            ("Irrelevant Answer", "Response doesn't address the query or introduces unrelated topics."),
            ("Incomplete/Generic Answer", "Response lacks specifics, details, or actionable steps."),
            ("Redirect to Customer Service", "Premature deflection to human agents without attempting resolution."),
            ("Missing Information/Source", "Fails to provide requested data, links, or documentation."),
            ("Broken/Incorrect Links", "Hyperlinks lead to errors, irrelevant pages, or outdated content."),
        ],
    },
    FailureGroup {
        name: "Technical & Functional Failures",
        labels: &[
            (CONVERSATION_STATELESSNESS, "Inability to retain context across interactions."),
            ("Error Messages", "Technical failures (e.g., \"Something went wrong\")."),
            ("Information Retrieval Failure", "Cannot fetch data from valid sources (PDFs, websites, PWS)."),
            ("Link Management Issues", "Duplicated, missing, or irrelevant URLs."),
        ],
    },
    FailureGroup {
        name: "User Experience & Communication Gaps",
        labels: &[
            ("Lack of Comparison/Summary", "Fails to contrast products/plans as requested."),
            ("No Step-by-Step Guidance", "Omits clear instructions for processes."),
            ("Ambiguous/Vague Response", "Answers lack clarity or specificity."),
            ("Incorrect/Factual Errors", "Provides inaccurate data or outdated info."),
            ("Poor Tone/Phrasing", "Unhelpful language (e.g., \"I don't know\", negative framing)."),
        ],
    },
    FailureGroup {
        name: "Advanced Capability Shortfalls",
        labels: &[
            (CONTEXTUAL_AWARENESS_FAILURE, "Misinterpreting follow-ups or user intent."),
            ("Inability to Handle Complex Queries", "Struggles with multi-part or nuanced requests."),
            ("Lack of Personalization", "Ignores user segment (e.g., Premier vs. One)."),
        ],
    },
    FailureGroup {
        name: "Specialized Omissions",
        labels: &[
            ("Product/Service Knowledge Gaps", "Unaware of specific offerings or HSBC domain knowledge."),
            ("Policy/Procedure Ignorance", "Misstates requirements (e.g., ID types, fees)."),
            ("Campaign/Promo Support Failure", "Cannot explain or apply promo codes/offers."),
        ],
    },
];

fn normalize(label: &str) -> String {
    label.trim().trim_end_matches(':').trim().to_lowercase()
}

/// Maps a classifier answer onto the category tree.
pub fn resolve_category(category: &str, sub_category: &str) -> (String, String) {
    let wanted = normalize(category);
    let Some(node) = CATEGORY_TREE.iter().find(|n| normalize(n.name) == wanted) else {
        return (OTHER_CATEGORY.to_string(), GENERAL.to_string());
    };

    let wanted_sub = normalize(sub_category);
    let sub = node
        .sub_categories
        .iter()
        .find(|s| normalize(s) == wanted_sub)
        .copied()
        .unwrap_or(GENERAL);
    (node.name.to_string(), sub.to_string())
}

/// Maps a failure-category answer onto the failure taxonomy.
pub fn resolve_failure_category(label: &str) -> String {
    let wanted = normalize(label);
    FAILURE_TAXONOMY
        .iter()
        .flat_map(|g| g.labels.iter())
        .find(|(name, _)| normalize(name) == wanted)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| GENERAL.to_string())
}

/// Report-time relabelling of failure categories.
pub fn report_failure_label(label: &str) -> &str {
    if label == CONVERSATION_STATELESSNESS {
        CONTEXTUAL_AWARENESS_FAILURE
    } else {
        label
    }
}

/// The category tree as the indented sitemap used in prompts.
pub fn render_category_tree() -> String {
    let mut out = String::new();
    for node in CATEGORY_TREE {
        out.push_str(node.name);
        out.push('\n');
        let last = node.sub_categories.len().saturating_sub(1);
        for (i, sub) in node.sub_categories.iter().enumerate() {
            out.push_str(if i == last { "└── " } else { "├── " });
            out.push_str(sub);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn render_failure_taxonomy() -> String {
    let mut out = String::new();
    for group in FAILURE_TAXONOMY {
        out.push_str(group.name);
        out.push_str(":\n");
        for (name, description) in group.labels {
            out.push_str(&format!("- {}: {}\n", name, description));
        }
        out.push('\n');
    }
    out
}
