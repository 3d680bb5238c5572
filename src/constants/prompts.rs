use crate::models::domain::RoadmapSection;

const IDEA_PLACEHOLDER: &str = "{idea}";

/// Sent back as the tool result when the model pauses for a web search.
pub const TOOL_RESULT_ACKNOWLEDGEMENT: &str = "Search completed. Provide detailed analysis.";

/// How much of the current section HTML is quoted back in a revision prompt.
pub const REVISION_CONTEXT_CHARS: usize = 800;

pub const RESEARCH_PROMPT: &str = "Analyze this Indian market business idea: \"{idea}\"

Provide detailed market research with:

MARKET SIZE
- Total market in India (INR Crores)
- Growth rate and trends
- Key cities and regions

COMPETITION
- List 5-7 competitors
- Their positioning and funding
- Market gaps

CUSTOMERS
- Target segments with income levels
- Demographics and preferences
- Pain points

REGULATIONS
- Required licenses
- Compliance needs
- Setup costs

TRENDS
- Recent developments
- Opportunities
- Risks

Use bullet points and realistic numbers.";

pub const EXECUTIVE_PROMPT: &str = "Create executive summary for Indian market: \"{idea}\"

OVERVIEW
- Value proposition
- Problem solved
- Target customers
- Differentiation

OPPORTUNITY
- Market size (TAM/SAM/SOM)
- Growth potential
- Target cities

MODEL
- Revenue streams
- Pricing strategy
- Key partnerships

METRICS
Show Year 1, 2, 3 targets for customers, revenue, cities, team.";

pub const REVENUE_PROMPT: &str = "Design revenue model for: \"{idea}\"

STREAMS
- Primary and secondary revenue
- Pricing in INR
- Rationale

PRICING
Create table with tiers, prices, features, target customers.

ECONOMICS
- AOV, CAC, LTV in INR
- LTV:CAC ratio
- Margins

PROJECTIONS
Monthly targets for 12 months.";

pub const IMPLEMENTATION_PROMPT: &str = "Create 18-month plan for: \"{idea}\"

PHASE 1 (M1-3): Foundation
- MVP features
- Team and salaries
- Tech stack
- Budget

PHASE 2 (M4-6): Launch
- Target city
- Customer goals
- Marketing
- Budget

PHASE 3 (M7-12): Growth
- Expansion
- Revenue targets
- Team growth
- Budget

PHASE 4 (M13-18): Scale
- Multi-city
- Profitability
- Funding
- Budget";

pub const SCALING_PROMPT: &str = "Scaling strategy for: \"{idea}\"

CHANNELS
- Marketing approach
- Partnerships
- Growth tactics

EXPANSION
- City sequence
- Timeline
- Investment

OPERATIONS
- Team growth
- Tech infrastructure
- Automation

TARGETS
Quarterly goals for customers, revenue, team, cities.";

pub const FINANCIAL_PROMPT: &str = "3-year projections for: \"{idea}\"

STARTUP COSTS
- Tech, legal, marketing
- Total in INR Lakhs

MONTHLY EXPENSES
Year 1, 2, 3 breakdown

REVENUE
Monthly Year 1, Quarterly Year 2-3

METRICS
- Burn rate
- Runway
- Break-even
- EBITDA

FUNDING
- Seed and Series A
- Use of funds
- Dilution";

pub const RISKS_PROMPT: &str = "Risk assessment for: \"{idea}\"

For each category, list 3-4 risks with Impact, Probability, Mitigation, Contingency:

MARKET RISKS
Competition, adoption, CAC

FINANCIAL RISKS
Funding, cash flow, burn

OPERATIONAL RISKS
Hiring, tech, supply chain

REGULATORY RISKS
Policy, compliance, privacy

COMPETITIVE RISKS
Incumbents, entrants, consolidation";

fn template_for(section: RoadmapSection) -> &'static str {
    match section {
        RoadmapSection::Research => RESEARCH_PROMPT,
        RoadmapSection::Executive => EXECUTIVE_PROMPT,
        RoadmapSection::Revenue => REVENUE_PROMPT,
        RoadmapSection::Implementation => IMPLEMENTATION_PROMPT,
        RoadmapSection::Scaling => SCALING_PROMPT,
        RoadmapSection::Financial => FINANCIAL_PROMPT,
        RoadmapSection::Risks => RISKS_PROMPT,
    }
}

pub fn section_prompt(section: RoadmapSection, idea: &str) -> String {
    template_for(section).replace(IDEA_PLACEHOLDER, idea)
}

/// Builds the revision request for one section, quoting at most
/// [`REVISION_CONTEXT_CHARS`] characters of its current HTML.
pub fn revision_prompt(idea: &str, current_html: &str, request: &str) -> String {
    let current: String = current_html.chars().take(REVISION_CONTEXT_CHARS).collect();
    format!(
        "Improve this section for: \"{idea}\"\n\n\
         Current content: {current}\n\n\
         User request: {request}\n\n\
         Provide improved version with bullet points, tables, and realistic INR numbers."
    )
}
